// src/services/notification_service.rs

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        i18n::{I18nStore, DEFAULT_LOCALE},
    },
    db::{NotificationRepository, PolicyRepository},
    models::{
        notification::{Notification, NotificationEntry, NotificationType, ReadFilter},
        policy::Policy,
    },
};

/// Último dia coberto pela janela de vencimento.
pub fn expiry_horizon(today: NaiveDate, window_days: i64) -> NaiveDate {
    let days = Days::new(window_days.max(0).unsigned_abs());
    today.checked_add_days(days).unwrap_or(NaiveDate::MAX)
}

/// Apólices que vencem na janela e ainda não receberam aviso de vencimento.
pub fn expiry_candidates(expiring: Vec<Policy>, already_notified: &HashSet<Uuid>) -> Vec<Policy> {
    expiring
        .into_iter()
        .filter(|p| !already_notified.contains(&p.id))
        .collect()
}

// As mensagens gravadas ficam no idioma do produto
pub fn expiry_message(store: &I18nStore, policy: &Policy) -> String {
    let end_date = policy.end_date.format("%d/%m/%Y").to_string();
    store.translate_with(
        DEFAULT_LOCALE,
        "notification.expiry",
        &[("policy_number", policy.policy_number.as_str()), ("end_date", end_date.as_str())],
    )
}

#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    policy_repo: PolicyRepository,
}

impl NotificationService {
    pub fn new(notification_repo: NotificationRepository, policy_repo: PolicyRepository) -> Self {
        Self {
            notification_repo,
            policy_repo,
        }
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        filter: ReadFilter,
    ) -> Result<Vec<NotificationEntry>, AppError> {
        let entries = self.notification_repo.list_entries(&mut *conn, agent_id, None).await?;
        Ok(entries
            .into_iter()
            .filter(|e| filter.matches(&e.notification))
            .collect())
    }

    pub async fn mark_read(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<Notification, AppError> {
        self.notification_repo
            .mark_as_read(&mut *conn, agent_id, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("notification".into()))
    }

    pub async fn mark_all_read(&self, conn: &mut PgConnection, agent_id: Uuid) -> Result<u64, AppError> {
        self.notification_repo.mark_all_as_read(&mut *conn, agent_id).await
    }

    /// Cria um aviso de vencimento por apólice ativa dentro da janela, sem repetir.
    pub async fn expiry_scan(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        today: NaiveDate,
        window_days: i64,
        store: &I18nStore,
    ) -> Result<Vec<Notification>, AppError> {
        let expiring = self
            .policy_repo
            .list_expiring(&mut *conn, agent_id, expiry_horizon(today, window_days))
            .await?;
        let notified: HashSet<Uuid> = self
            .notification_repo
            .policies_with_type(&mut *conn, agent_id, NotificationType::Vencimiento)
            .await?
            .into_iter()
            .collect();

        let mut created = Vec::new();
        for policy in expiry_candidates(expiring, &notified) {
            let message = expiry_message(store, &policy);
            let notification = self
                .notification_repo
                .create(&mut *conn, agent_id, policy.id, NotificationType::Vencimiento, today, &message)
                .await?;
            created.push(notification);
        }

        tracing::info!("Varredura de vencimentos: {} avisos novos", created.len());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::policy::{PaymentFrequency, PolicyStatus};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn policy(number: &str, end_date: NaiveDate) -> Policy {
        Policy {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            policy_number: number.into(),
            policyholder_id: Uuid::new_v4(),
            policy_type: "Auto".into(),
            policy_type_id: None,
            insurance_company: "Acme".into(),
            company_id: None,
            coverage_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date,
            premium_amount: Decimal::from(100),
            currency_code: "EUR".into(),
            payment_frequency: PaymentFrequency::Mensual,
            status: PolicyStatus::Activa,
            custom_data: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn horizon_adds_window_days() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(expiry_horizon(today, 30), NaiveDate::from_ymd_opt(2026, 11, 16).unwrap());
        assert_eq!(expiry_horizon(today, -5), today);
    }

    #[test]
    fn already_notified_policies_are_skipped() {
        let end = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let first = policy("POL-1", end);
        let second = policy("POL-2", end);
        let notified: HashSet<Uuid> = [first.id].into_iter().collect();

        let candidates = expiry_candidates(vec![first, second], &notified);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].policy_number, "POL-2");
    }

    #[test]
    fn message_names_policy_and_date_in_spanish() {
        let store = I18nStore::load().unwrap();
        let message = expiry_message(&store, &policy("POL-9", NaiveDate::from_ymd_opt(2026, 11, 5).unwrap()));
        assert_eq!(message, "La póliza POL-9 vence el 05/11/2026.");
    }
}
