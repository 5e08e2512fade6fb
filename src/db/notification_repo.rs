// src/db/notification_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::notification::{Notification, NotificationEntry, NotificationType},
};

#[derive(Clone, Default)]
pub struct NotificationRepository;

impl NotificationRepository {
    pub fn new() -> Self {
        Self
    }

    /// Mais recentes primeiro, com o número e o tipo da apólice. `limit = None` traz todas.
    pub async fn list_entries<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<NotificationEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, NotificationEntry>(
            r#"
            SELECT n.*, p.policy_number, p.policy_type
            FROM notifications n
            LEFT JOIN policies p ON p.id = n.policy_id
            WHERE n.agent_id = $1
            ORDER BY n.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(agent_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }

    pub async fn mark_as_read<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Notification>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE WHERE agent_id = $1 AND id = $2 RETURNING *",
        )
        .bind(agent_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(notification)
    }

    pub async fn mark_all_as_read<'e, E>(&self, executor: E, agent_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE agent_id = $1 AND is_read = FALSE")
            .bind(agent_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// IDs das apólices que já têm uma notificação deste tipo.
    pub async fn policies_with_type<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        notification_type: NotificationType,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT policy_id FROM notifications WHERE agent_id = $1 AND notification_type = $2",
        )
        .bind(agent_id)
        .bind(notification_type)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        policy_id: Uuid,
        notification_type: NotificationType,
        notification_date: NaiveDate,
        message: &str,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (agent_id, policy_id, notification_type, notification_date, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(policy_id)
        .bind(notification_type)
        .bind(notification_date)
        .bind(message)
        .fetch_one(executor)
        .await?;

        Ok(notification)
    }
}
