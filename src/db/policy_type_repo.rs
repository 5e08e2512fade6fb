// src/db/policy_type_repo.rs

use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        custom_field::CustomFieldDefinition,
        policy_type::{PolicyType, PolicyTypeInput},
    },
};

#[derive(Clone, Default)]
pub struct PolicyTypeRepository;

impl PolicyTypeRepository {
    pub fn new() -> Self {
        Self
    }

    /// Lista na ordem de exibição (sort_order, depois nome).
    pub async fn list<'e, E>(&self, executor: E, agent_id: Uuid) -> Result<Vec<PolicyType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let types = sqlx::query_as::<_, PolicyType>(
            r#"
            SELECT * FROM policy_types
            WHERE agent_id = $1
            ORDER BY sort_order ASC, name ASC
            "#,
        )
        .bind(agent_id)
        .fetch_all(executor)
        .await?;

        Ok(types)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<Option<PolicyType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let policy_type = sqlx::query_as::<_, PolicyType>(
            "SELECT * FROM policy_types WHERE agent_id = $1 AND id = $2",
        )
        .bind(agent_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(policy_type)
    }

    /// `input.custom_fields` já deve vir preenchido (presets aplicados no serviço).
    pub async fn create<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        input: &PolicyTypeInput,
    ) -> Result<PolicyType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let policy_type = sqlx::query_as::<_, PolicyType>(
            r#"
            INSERT INTO policy_types (agent_id, name, icon, description, is_active, sort_order, custom_fields)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(input.name.trim())
        .bind(&input.icon)
        .bind(input.description.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .bind(Json(&input.custom_fields))
        .fetch_one(executor)
        .await?;

        Ok(policy_type)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
        input: &PolicyTypeInput,
    ) -> Result<Option<PolicyType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let policy_type = sqlx::query_as::<_, PolicyType>(
            r#"
            UPDATE policy_types
            SET name = $3, icon = $4, description = $5, is_active = $6,
                sort_order = $7, custom_fields = $8
            WHERE agent_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.icon)
        .bind(input.description.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .bind(Json(&input.custom_fields))
        .fetch_optional(executor)
        .await?;

        Ok(policy_type)
    }

    /// Grava só a lista de campos (add/remove/move).
    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
        fields: &[CustomFieldDefinition],
    ) -> Result<Option<PolicyType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let policy_type = sqlx::query_as::<_, PolicyType>(
            "UPDATE policy_types SET custom_fields = $3 WHERE agent_id = $1 AND id = $2 RETURNING *",
        )
        .bind(agent_id)
        .bind(id)
        .bind(Json(fields))
        .fetch_optional(executor)
        .await?;

        Ok(policy_type)
    }

    pub async fn toggle_active<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<Option<PolicyType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let policy_type = sqlx::query_as::<_, PolicyType>(
            "UPDATE policy_types SET is_active = NOT is_active WHERE agent_id = $1 AND id = $2 RETURNING *",
        )
        .bind(agent_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(policy_type)
    }

    pub async fn set_sort_order<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
        sort_order: i32,
    ) -> Result<Option<PolicyType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let policy_type = sqlx::query_as::<_, PolicyType>(
            "UPDATE policy_types SET sort_order = $3 WHERE agent_id = $1 AND id = $2 RETURNING *",
        )
        .bind(agent_id)
        .bind(id)
        .bind(sort_order)
        .fetch_optional(executor)
        .await?;

        Ok(policy_type)
    }

    /// As apólices que apontam para o tipo ficam com policy_type_id = NULL.
    pub async fn delete<'e, E>(&self, executor: E, agent_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM policy_types WHERE agent_id = $1 AND id = $2")
            .bind(agent_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
