// src/db/currency_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::currency::{normalize_code, Currency, CurrencyInput},
};

#[derive(Clone, Default)]
pub struct CurrencyRepository;

impl CurrencyRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, agent_id: Uuid) -> Result<Vec<Currency>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let currencies = sqlx::query_as::<_, Currency>(
            "SELECT * FROM currencies WHERE agent_id = $1 ORDER BY code ASC",
        )
        .bind(agent_id)
        .fetch_all(executor)
        .await?;

        Ok(currencies)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        input: &CurrencyInput,
    ) -> Result<Currency, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Currency>(
            r#"
            INSERT INTO currencies (agent_id, code, name, symbol, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(normalize_code(&input.code))
        .bind(input.name.trim())
        .bind(input.symbol.trim())
        .bind(input.is_active)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "currency_code"))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
        input: &CurrencyInput,
    ) -> Result<Option<Currency>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Currency>(
            r#"
            UPDATE currencies SET code = $3, name = $4, symbol = $5, is_active = $6
            WHERE agent_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(id)
        .bind(normalize_code(&input.code))
        .bind(input.name.trim())
        .bind(input.symbol.trim())
        .bind(input.is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "currency_code"))
    }

    pub async fn toggle_active<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Currency>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let currency = sqlx::query_as::<_, Currency>(
            "UPDATE currencies SET is_active = NOT is_active WHERE agent_id = $1 AND id = $2 RETURNING *",
        )
        .bind(agent_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(currency)
    }

    pub async fn delete<'e, E>(&self, executor: E, agent_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM currencies WHERE agent_id = $1 AND id = $2")
            .bind(agent_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
