// src/services/policy_type_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PolicyTypeRepository,
    models::{
        custom_field::CustomFieldDefinition,
        policy_type::{PolicyType, PolicyTypeInput},
    },
    services::{
        field_presets::default_fields,
        form_binder::{self, MoveDirection},
    },
};

fn not_found() -> AppError {
    AppError::ResourceNotFound("policy_type".into())
}

#[derive(Clone)]
pub struct PolicyTypeService {
    repo: PolicyTypeRepository,
}

impl PolicyTypeService {
    pub fn new(repo: PolicyTypeRepository) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<PolicyType>, AppError> {
        let types = self.repo.list(&mut *conn, agent_id).await?;
        Ok(match search {
            Some(term) => types.into_iter().filter(|t| t.matches_search(term)).collect(),
            None => types,
        })
    }

    pub async fn get(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<PolicyType, AppError> {
        self.repo
            .find_by_id(&mut *conn, agent_id, id)
            .await?
            .ok_or_else(not_found)
    }

    /// Sem campos informados, o tipo nasce com os campos sugeridos para o nome.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        mut input: PolicyTypeInput,
    ) -> Result<PolicyType, AppError> {
        if input.custom_fields.is_empty() {
            input.custom_fields = default_fields(&input.name);
        }

        let created = self.repo.create(&mut *conn, agent_id, &input).await?;
        tracing::info!(
            "Tipo de apólice '{}' criado com {} campos",
            created.name,
            created.custom_fields.len()
        );
        Ok(created)
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        input: PolicyTypeInput,
    ) -> Result<PolicyType, AppError> {
        self.repo
            .update(&mut *conn, agent_id, id, &input)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&mut *conn, agent_id, id).await? {
            return Err(not_found());
        }
        tracing::info!("Tipo de apólice {} removido", id);
        Ok(())
    }

    pub async fn toggle_status(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<PolicyType, AppError> {
        self.repo
            .toggle_active(&mut *conn, agent_id, id)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn set_sort_order(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        sort_order: i32,
    ) -> Result<PolicyType, AppError> {
        self.repo
            .set_sort_order(&mut *conn, agent_id, id, sort_order)
            .await?
            .ok_or_else(not_found)
    }

    // =========================================================================
    //  AUTORIA DOS CAMPOS (lê, aplica a função pura, grava)
    // =========================================================================

    pub async fn add_field(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        field: CustomFieldDefinition,
    ) -> Result<PolicyType, AppError> {
        let current = self.get(&mut *conn, agent_id, id).await?;
        let fields = form_binder::add_field(&current.custom_fields, field);
        self.save_fields(conn, agent_id, id, &fields).await
    }

    pub async fn remove_field(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        index: usize,
    ) -> Result<PolicyType, AppError> {
        let current = self.get(&mut *conn, agent_id, id).await?;
        let fields = form_binder::remove_field(&current.custom_fields, index);
        if fields.len() == current.custom_fields.len() {
            return Ok(current);
        }
        self.save_fields(conn, agent_id, id, &fields).await
    }

    pub async fn move_field(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        index: usize,
        direction: MoveDirection,
    ) -> Result<PolicyType, AppError> {
        let current = self.get(&mut *conn, agent_id, id).await?;
        let fields = form_binder::move_field(&current.custom_fields, index, direction);
        if fields == current.custom_fields {
            return Ok(current);
        }
        self.save_fields(conn, agent_id, id, &fields).await
    }

    async fn save_fields(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        fields: &[CustomFieldDefinition],
    ) -> Result<PolicyType, AppError> {
        self.repo
            .update_fields(&mut *conn, agent_id, id, fields)
            .await?
            .ok_or_else(not_found)
    }
}
