// src/handlers/policies.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AgentContext, i18n::Locale},
    models::policy::{Policy, PolicyDraft, PolicyFilter, PolicyListEntry},
    services::{
        policy_editor::{EditorAction, EditorState, EditorView},
        policy_service::validate_base,
    },
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditorActionPayload {
    pub state: EditorState,
    pub action: EditorAction,
}

// =============================================================================
//  1. LEITURA
// =============================================================================

// GET /api/policies
#[utoipa::path(
    get,
    path = "/api/policies",
    tag = "Policies",
    params(
        ("search" = Option<String>, Query, description = "Número, companhia ou asegurado"),
        ("policyType" = Option<String>, Query, description = "Nome do tipo ('all' = todos)"),
        ("status" = Option<String>, Query, description = "activa | vencida | cancelada | pendiente")
    ),
    responses((status = 200, description = "Mais recentes primeiro", body = Vec<PolicyListEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_policies(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Query(filter): Query<PolicyFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let policies = app_state
        .policy_service
        .list(&mut tx, agent.0, &filter)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(policies)))
}

// GET /api/policies/{id}
#[utoipa::path(
    get,
    path = "/api/policies/{id}",
    tag = "Policies",
    params(("id" = Uuid, Path, description = "ID da apólice")),
    responses(
        (status = 200, body = Policy),
        (status = 404, description = "Apólice não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_policy(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let policy = app_state
        .policy_service
        .get(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(policy)))
}

// =============================================================================
//  2. EDITOR
// =============================================================================

// GET /api/policies/editor
#[utoipa::path(
    get,
    path = "/api/policies/editor",
    tag = "Policies",
    responses((status = 200, description = "Editor vazio (activa, mensual, EUR)", body = EditorView)),
    security(("api_jwt" = []))
)]
pub async fn new_policy_editor(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let view = app_state
        .policy_service
        .new_editor(&mut tx, agent.0)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(view)))
}

// GET /api/policies/{id}/editor
#[utoipa::path(
    get,
    path = "/api/policies/{id}/editor",
    tag = "Policies",
    params(("id" = Uuid, Path, description = "ID da apólice")),
    responses(
        (status = 200, description = "Editor com o rascunho da apólice gravada", body = EditorView),
        (status = 404, description = "Apólice não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn policy_editor(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let view = app_state
        .policy_service
        .editor_for(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/policies/editor
#[utoipa::path(
    post,
    path = "/api/policies/editor",
    tag = "Policies",
    request_body = EditorActionPayload,
    responses((status = 200, description = "Estado depois da ação", body = EditorView)),
    security(("api_jwt" = []))
)]
pub async fn apply_editor_action(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Json(payload): Json<EditorActionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let view = app_state
        .policy_service
        .apply_action(&mut tx, agent.0, payload.state, payload.action)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(view)))
}

// =============================================================================
//  3. ENVIO
// =============================================================================

// POST /api/policies
#[utoipa::path(
    post,
    path = "/api/policies",
    tag = "Policies",
    request_body = PolicyDraft,
    responses(
        (status = 201, description = "Apólice gravada", body = Policy),
        (status = 400, description = "Campos base inválidos"),
        (status = 409, description = "Número de apólice já existe"),
        (status = 422, description = "Campos personalizados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_policy(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Json(draft): Json<PolicyDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    validate_base(&draft).map_err(fail)?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let policy = app_state
        .policy_service
        .create(&mut tx, agent.0, &draft)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::CREATED, Json(policy)))
}

// PUT /api/policies/{id}
#[utoipa::path(
    put,
    path = "/api/policies/{id}",
    tag = "Policies",
    request_body = PolicyDraft,
    params(("id" = Uuid, Path, description = "ID da apólice")),
    responses(
        (status = 200, body = Policy),
        (status = 400, description = "Campos base inválidos"),
        (status = 404, description = "Apólice não encontrada"),
        (status = 409, description = "Número de apólice já existe"),
        (status = 422, description = "Campos personalizados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_policy(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
    Json(draft): Json<PolicyDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    validate_base(&draft).map_err(fail)?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let policy = app_state
        .policy_service
        .update(&mut tx, agent.0, id, &draft)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(policy)))
}

// DELETE /api/policies/{id}
#[utoipa::path(
    delete,
    path = "/api/policies/{id}",
    tag = "Policies",
    params(("id" = Uuid, Path, description = "ID da apólice")),
    responses(
        (status = 204, description = "Apólice removida"),
        (status = 404, description = "Apólice não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_policy(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    app_state
        .policy_service
        .delete(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}
