// src/db/policy_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::policy::{Policy, PolicyRecord},
};

#[derive(Clone, Default)]
pub struct PolicyRepository;

impl PolicyRepository {
    pub fn new() -> Self {
        Self
    }

    /// Mais recentes primeiro.
    pub async fn list<'e, E>(&self, executor: E, agent_id: Uuid) -> Result<Vec<Policy>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let policies = sqlx::query_as::<_, Policy>(
            "SELECT * FROM policies WHERE agent_id = $1 ORDER BY created_at DESC",
        )
        .bind(agent_id)
        .fetch_all(executor)
        .await?;

        Ok(policies)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Policy>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let policy = sqlx::query_as::<_, Policy>("SELECT * FROM policies WHERE agent_id = $1 AND id = $2")
            .bind(agent_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(policy)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        record: &PolicyRecord,
    ) -> Result<Policy, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Policy>(
            r#"
            INSERT INTO policies (
                agent_id, policy_number, policyholder_id, policy_type, policy_type_id,
                insurance_company, company_id, coverage_type_id, start_date, end_date,
                premium_amount, currency_code, payment_frequency, status, custom_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(&record.policy_number)
        .bind(record.policyholder_id)
        .bind(&record.policy_type)
        .bind(record.policy_type_id)
        .bind(&record.insurance_company)
        .bind(record.company_id)
        .bind(record.coverage_type_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.premium_amount)
        .bind(&record.currency_code)
        .bind(record.payment_frequency)
        .bind(record.status)
        .bind(&record.custom_data)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "policy_number"))
    }

    /// Substitui a linha inteira (o envio é sempre do registro completo).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
        record: &PolicyRecord,
    ) -> Result<Option<Policy>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Policy>(
            r#"
            UPDATE policies
            SET policy_number = $3, policyholder_id = $4, policy_type = $5, policy_type_id = $6,
                insurance_company = $7, company_id = $8, coverage_type_id = $9,
                start_date = $10, end_date = $11, premium_amount = $12, currency_code = $13,
                payment_frequency = $14, status = $15, custom_data = $16
            WHERE agent_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(id)
        .bind(&record.policy_number)
        .bind(record.policyholder_id)
        .bind(&record.policy_type)
        .bind(record.policy_type_id)
        .bind(&record.insurance_company)
        .bind(record.company_id)
        .bind(record.coverage_type_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.premium_amount)
        .bind(&record.currency_code)
        .bind(record.payment_frequency)
        .bind(record.status)
        .bind(&record.custom_data)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "policy_number"))
    }

    pub async fn delete<'e, E>(&self, executor: E, agent_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM policies WHERE agent_id = $1 AND id = $2")
            .bind(agent_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Ativas com vencimento até `until`, da mais próxima para a mais distante.
    pub async fn list_expiring<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        until: NaiveDate,
    ) -> Result<Vec<Policy>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let policies = sqlx::query_as::<_, Policy>(
            r#"
            SELECT * FROM policies
            WHERE agent_id = $1 AND status = 'activa' AND end_date <= $2
            ORDER BY end_date ASC
            "#,
        )
        .bind(agent_id)
        .bind(until)
        .fetch_all(executor)
        .await?;

        Ok(policies)
    }
}
