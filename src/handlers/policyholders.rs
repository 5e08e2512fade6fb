// src/handlers/policyholders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AgentContext, i18n::Locale},
    models::policyholder::{BirthdayEntry, Policyholder, PolicyholderFilter, PolicyholderInput},
};

// GET /api/policyholders
#[utoipa::path(
    get,
    path = "/api/policyholders",
    tag = "Policyholders",
    params(
        ("search" = Option<String>, Query, description = "Nome, e-mail, DNI ou CUIL/CUIT"),
        ("entityType" = Option<String>, Query, description = "fisico | juridico")
    ),
    responses((status = 200, description = "Ordenados por nome ou razão social", body = Vec<Policyholder>)),
    security(("api_jwt" = []))
)]
pub async fn list_policyholders(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Query(filter): Query<PolicyholderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let holders = app_state
        .policyholder_service
        .list(&mut tx, agent.0, &filter)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(holders)))
}

// GET /api/policyholders/birthdays
#[utoipa::path(
    get,
    path = "/api/policyholders/birthdays",
    tag = "Policyholders",
    responses((status = 200, description = "Aniversários de hoje até 7 dias", body = Vec<BirthdayEntry>)),
    security(("api_jwt" = []))
)]
pub async fn upcoming_birthdays(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let birthdays = app_state
        .policyholder_service
        .birthdays(&mut tx, agent.0, Utc::now().date_naive())
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(birthdays)))
}

// POST /api/policyholders
#[utoipa::path(
    post,
    path = "/api/policyholders",
    tag = "Policyholders",
    request_body = PolicyholderInput,
    responses(
        (status = 201, body = Policyholder),
        (status = 400, description = "Dados inválidos (nome/sobrenome ou razão social obrigatórios)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_policyholder(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Json(payload): Json<PolicyholderInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let holder = app_state
        .policyholder_service
        .create(&mut tx, agent.0, payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::CREATED, Json(holder)))
}

// GET /api/policyholders/{id}
#[utoipa::path(
    get,
    path = "/api/policyholders/{id}",
    tag = "Policyholders",
    params(("id" = Uuid, Path, description = "ID do asegurado")),
    responses(
        (status = 200, body = Policyholder),
        (status = 404, description = "Asegurado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_policyholder(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let holder = app_state
        .policyholder_service
        .get(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(holder)))
}

// PUT /api/policyholders/{id}
#[utoipa::path(
    put,
    path = "/api/policyholders/{id}",
    tag = "Policyholders",
    request_body = PolicyholderInput,
    params(("id" = Uuid, Path, description = "ID do asegurado")),
    responses(
        (status = 200, body = Policyholder),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Asegurado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_policyholder(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<PolicyholderInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let holder = app_state
        .policyholder_service
        .update(&mut tx, agent.0, id, payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(holder)))
}

// DELETE /api/policyholders/{id}
#[utoipa::path(
    delete,
    path = "/api/policyholders/{id}",
    tag = "Policyholders",
    params(("id" = Uuid, Path, description = "ID do asegurado")),
    responses(
        (status = 204, description = "Asegurado e apólices removidos"),
        (status = 404, description = "Asegurado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_policyholder(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    app_state
        .policyholder_service
        .delete(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}
