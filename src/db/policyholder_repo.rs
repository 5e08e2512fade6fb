// src/db/policyholder_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::policyholder::{Policyholder, PolicyholderInput},
};

#[derive(Clone, Default)]
pub struct PolicyholderRepository;

impl PolicyholderRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, agent_id: Uuid) -> Result<Vec<Policyholder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let holders = sqlx::query_as::<_, Policyholder>(
            r#"
            SELECT * FROM policyholders
            WHERE agent_id = $1
            ORDER BY COALESCE(first_name, business_name, '') ASC
            "#,
        )
        .bind(agent_id)
        .fetch_all(executor)
        .await?;

        Ok(holders)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Policyholder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let holder = sqlx::query_as::<_, Policyholder>(
            "SELECT * FROM policyholders WHERE agent_id = $1 AND id = $2",
        )
        .bind(agent_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(holder)
    }

    /// `input` já normalizado (colunas da outra natureza em NULL).
    pub async fn create<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        input: &PolicyholderInput,
    ) -> Result<Policyholder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let holder = sqlx::query_as::<_, Policyholder>(
            r#"
            INSERT INTO policyholders (
                agent_id, entity_type, first_name, last_name, business_name, business_type,
                legal_representative, dni, cuil_cuit, email, phone, address, city, state,
                postal_code, date_of_birth
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(input.entity_type)
        .bind(input.first_name.as_deref())
        .bind(input.last_name.as_deref())
        .bind(input.business_name.as_deref())
        .bind(input.business_type.as_deref())
        .bind(input.legal_representative.as_deref())
        .bind(input.dni.as_deref())
        .bind(input.cuil_cuit.as_deref())
        .bind(input.email.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.city.as_deref())
        .bind(input.state.as_deref())
        .bind(input.postal_code.as_deref())
        .bind(input.date_of_birth)
        .fetch_one(executor)
        .await?;

        Ok(holder)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
        input: &PolicyholderInput,
    ) -> Result<Option<Policyholder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let holder = sqlx::query_as::<_, Policyholder>(
            r#"
            UPDATE policyholders
            SET entity_type = $3, first_name = $4, last_name = $5, business_name = $6,
                business_type = $7, legal_representative = $8, dni = $9, cuil_cuit = $10,
                email = $11, phone = $12, address = $13, city = $14, state = $15,
                postal_code = $16, date_of_birth = $17
            WHERE agent_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(id)
        .bind(input.entity_type)
        .bind(input.first_name.as_deref())
        .bind(input.last_name.as_deref())
        .bind(input.business_name.as_deref())
        .bind(input.business_type.as_deref())
        .bind(input.legal_representative.as_deref())
        .bind(input.dni.as_deref())
        .bind(input.cuil_cuit.as_deref())
        .bind(input.email.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.city.as_deref())
        .bind(input.state.as_deref())
        .bind(input.postal_code.as_deref())
        .bind(input.date_of_birth)
        .fetch_optional(executor)
        .await?;

        Ok(holder)
    }

    /// Apaga também as apólices do asegurado (ON DELETE CASCADE).
    pub async fn delete<'e, E>(&self, executor: E, agent_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM policyholders WHERE agent_id = $1 AND id = $2")
            .bind(agent_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
