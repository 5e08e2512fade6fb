// src/models/dashboard.rs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{notification::NotificationEntry, policy::PolicyListEntry};

// O resumo da tela inicial
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_policyholders: i64,
    pub total_policies: i64,
    pub active_policies: i64,
    pub unread_notifications: i64,

    // Ativas que vencem dentro da janela (contagem + as 5 mais próximas)
    pub expiring_policies_count: i64,
    pub expiring_policies: Vec<PolicyListEntry>,

    pub recent_notifications: Vec<NotificationEntry>,

    // Prêmio mensal equivalente por moeda (ex: { "ARS": 15000, "USD": 120 })
    #[schema(value_type = Object)]
    pub monthly_premiums: BTreeMap<String, Decimal>,
}
