// src/handlers/currencies.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AgentContext, i18n::Locale},
    models::currency::{Currency, CurrencyInput, CurrencyPreset},
};

#[derive(Debug, Deserialize)]
pub struct CurrencySearch {
    pub search: Option<String>,
}

// GET /api/currencies
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "Currencies",
    params(("search" = Option<String>, Query, description = "Código ou nome")),
    responses((status = 200, body = Vec<Currency>)),
    security(("api_jwt" = []))
)]
pub async fn list_currencies(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Query(query): Query<CurrencySearch>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let currencies = app_state
        .catalog_service
        .list_currencies(&mut tx, agent.0, query.search.as_deref())
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(currencies)))
}

// GET /api/currencies/presets
#[utoipa::path(
    get,
    path = "/api/currencies/presets",
    tag = "Currencies",
    responses((status = 200, description = "As 15 moedas mais comuns", body = Vec<CurrencyPreset>)),
    security(("api_jwt" = []))
)]
pub async fn list_currency_presets(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.catalog_service.currency_presets())
}

// POST /api/currencies
#[utoipa::path(
    post,
    path = "/api/currencies",
    tag = "Currencies",
    request_body = CurrencyInput,
    responses(
        (status = 201, body = Currency),
        (status = 400, description = "Código precisa ter 3 letras"),
        (status = 409, description = "Código já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_currency(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Json(payload): Json<CurrencyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    payload.validate().map_err(|e| fail(AppError::ValidationError(e)))?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let currency = app_state
        .catalog_service
        .create_currency(&mut tx, agent.0, &payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::CREATED, Json(currency)))
}

// PUT /api/currencies/{id}
#[utoipa::path(
    put,
    path = "/api/currencies/{id}",
    tag = "Currencies",
    request_body = CurrencyInput,
    params(("id" = Uuid, Path, description = "ID da moeda")),
    responses(
        (status = 200, body = Currency),
        (status = 404, description = "Moeda não encontrada"),
        (status = 409, description = "Código já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_currency(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<CurrencyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    payload.validate().map_err(|e| fail(AppError::ValidationError(e)))?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let currency = app_state
        .catalog_service
        .update_currency(&mut tx, agent.0, id, &payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(currency)))
}

// PATCH /api/currencies/{id}/status
#[utoipa::path(
    patch,
    path = "/api/currencies/{id}/status",
    tag = "Currencies",
    params(("id" = Uuid, Path, description = "ID da moeda")),
    responses((status = 200, description = "is_active invertido", body = Currency)),
    security(("api_jwt" = []))
)]
pub async fn toggle_currency_status(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let currency = app_state
        .catalog_service
        .toggle_currency(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(currency)))
}

// DELETE /api/currencies/{id}
#[utoipa::path(
    delete,
    path = "/api/currencies/{id}",
    tag = "Currencies",
    params(("id" = Uuid, Path, description = "ID da moeda")),
    responses(
        (status = 204, description = "Moeda removida"),
        (status = 404, description = "Moeda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_currency(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    app_state
        .catalog_service
        .delete_currency(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}
