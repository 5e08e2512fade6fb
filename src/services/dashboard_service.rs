// src/services/dashboard_service.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        dashboard_repo::PremiumRow, DashboardRepository, NotificationRepository, PolicyRepository,
        PolicyholderRepository,
    },
    models::{dashboard::DashboardSummary, policy::DEFAULT_CURRENCY},
    services::{notification_service::expiry_horizon, policy_service::attach_holder_names},
};

const EXPIRING_PREVIEW: usize = 5;
const RECENT_NOTIFICATIONS: i64 = 5;

/// Soma o equivalente mensal dos prêmios, agrupado por moeda.
pub fn monthly_premiums(rows: &[PremiumRow]) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in rows {
        let currency = row
            .currency_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_uppercase();
        *totals.entry(currency).or_default() += row.payment_frequency.monthly_equivalent(row.premium_amount);
    }
    for total in totals.values_mut() {
        *total = total.round_dp(2);
    }
    totals
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    policy_repo: PolicyRepository,
    policyholder_repo: PolicyholderRepository,
    notification_repo: NotificationRepository,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        policy_repo: PolicyRepository,
        policyholder_repo: PolicyholderRepository,
        notification_repo: NotificationRepository,
    ) -> Self {
        Self {
            repo,
            policy_repo,
            policyholder_repo,
            notification_repo,
        }
    }

    pub async fn summary(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<DashboardSummary, AppError> {
        let horizon = expiry_horizon(today, window_days);

        let counts = self.repo.counts(&mut *conn, agent_id, horizon).await?;
        let premiums = self.repo.active_premiums(&mut *conn, agent_id).await?;

        let mut expiring = self.policy_repo.list_expiring(&mut *conn, agent_id, horizon).await?;
        expiring.truncate(EXPIRING_PREVIEW);
        let holders = self.policyholder_repo.list(&mut *conn, agent_id).await?;

        let recent_notifications = self
            .notification_repo
            .list_entries(&mut *conn, agent_id, Some(RECENT_NOTIFICATIONS))
            .await?;

        Ok(DashboardSummary {
            total_policyholders: counts.total_policyholders,
            total_policies: counts.total_policies,
            active_policies: counts.active_policies,
            unread_notifications: counts.unread_notifications,
            expiring_policies_count: counts.expiring_policies,
            expiring_policies: attach_holder_names(expiring, &holders),
            recent_notifications,
            monthly_premiums: monthly_premiums(&premiums),
        })
    }
}
