// src/models/notification.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Mapeia o CREATE TYPE notification_type do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Vencimiento,
    PagoPendiente,
    Renovacion,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub policy_id: Uuid,
    pub notification_type: NotificationType,
    #[schema(value_type = String, format = Date)]
    pub notification_date: NaiveDate,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// Notificação + dados da apólice (JOIN)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub notification: Notification,
    pub policy_number: Option<String>,
    pub policy_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl ReadFilter {
    pub fn matches(self, notification: &Notification) -> bool {
        match self {
            ReadFilter::All => true,
            ReadFilter::Unread => !notification.is_read,
            ReadFilter::Read => notification.is_read,
        }
    }
}
