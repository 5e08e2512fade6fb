// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::{common::error::AppError, models::policy::PaymentFrequency};

// Os números crus do painel; a montagem final fica no DashboardService
#[derive(Debug, Default)]
pub struct DashboardCounts {
    pub total_policyholders: i64,
    pub total_policies: i64,
    pub active_policies: i64,
    pub unread_notifications: i64,
    pub expiring_policies: i64,
}

// Prêmio de uma apólice ativa, para o total mensal por moeda
#[derive(Debug, Clone, FromRow)]
pub struct PremiumRow {
    pub premium_amount: Decimal,
    pub currency_code: Option<String>,
    pub payment_frequency: PaymentFrequency,
}

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // 1. Contadores (todos na mesma transação: retrato consistente)
    pub async fn counts(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        expiring_until: NaiveDate,
    ) -> Result<DashboardCounts, AppError> {
        let total_policyholders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM policyholders WHERE agent_id = $1",
        )
        .bind(agent_id)
        .fetch_one(&mut *conn)
        .await?;

        let total_policies = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM policies WHERE agent_id = $1")
            .bind(agent_id)
            .fetch_one(&mut *conn)
            .await?;

        let active_policies = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM policies WHERE agent_id = $1 AND status = 'activa'",
        )
        .bind(agent_id)
        .fetch_one(&mut *conn)
        .await?;

        let unread_notifications = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE agent_id = $1 AND is_read = FALSE",
        )
        .bind(agent_id)
        .fetch_one(&mut *conn)
        .await?;

        let expiring_policies = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM policies WHERE agent_id = $1 AND status = 'activa' AND end_date <= $2",
        )
        .bind(agent_id)
        .bind(expiring_until)
        .fetch_one(&mut *conn)
        .await?;

        Ok(DashboardCounts {
            total_policyholders,
            total_policies,
            active_policies,
            unread_notifications,
            expiring_policies,
        })
    }

    // 2. Prêmios das apólices ativas
    pub async fn active_premiums(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
    ) -> Result<Vec<PremiumRow>, AppError> {
        let rows = sqlx::query_as::<_, PremiumRow>(
            r#"
            SELECT premium_amount, NULLIF(currency_code, '') AS currency_code, payment_frequency
            FROM policies
            WHERE agent_id = $1 AND status = 'activa'
            "#,
        )
        .bind(agent_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }
}
