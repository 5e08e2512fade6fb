// src/handlers/companies.rs

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
    models::company::{CompanyInput, CompanyListEntry, CoverageType, CoverageTypeInput, InsuranceCompany},
};

#[derive(Debug, Deserialize)]
pub struct CompanySearch {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageQuery {
    pub company_id: Option<Uuid>,
    pub policy_type: Option<String>,
}

// =============================================================================
//  ÁREA 1: COMPANHIAS
// =============================================================================

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    params(("search" = Option<String>, Query, description = "Nome ou descrição")),
    responses((status = 200, description = "Companhias com a contagem de coberturas", body = Vec<CompanyListEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Query(query): Query<CompanySearch>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let companies = app_state
        .catalog_service
        .list_companies(&mut tx, agent.0, query.search.as_deref())
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(companies)))
}

// POST /api/companies
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body = CompanyInput,
    responses(
        (status = 201, body = InsuranceCompany),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Já existe uma companhia com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Json(payload): Json<CompanyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    payload.validate().map_err(|e| fail(AppError::ValidationError(e)))?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let company = app_state
        .catalog_service
        .create_company(&mut tx, agent.0, &payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::CREATED, Json(company)))
}

// GET /api/companies/{id}
#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da companhia")),
    responses(
        (status = 200, body = InsuranceCompany),
        (status = 404, description = "Companhia não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let company = app_state
        .catalog_service
        .get_company(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(company)))
}

// PUT /api/companies/{id}
#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    tag = "Companies",
    request_body = CompanyInput,
    params(("id" = Uuid, Path, description = "ID da companhia")),
    responses(
        (status = 200, body = InsuranceCompany),
        (status = 404, description = "Companhia não encontrada"),
        (status = 409, description = "Já existe uma companhia com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    payload.validate().map_err(|e| fail(AppError::ValidationError(e)))?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let company = app_state
        .catalog_service
        .update_company(&mut tx, agent.0, id, &payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(company)))
}

// PATCH /api/companies/{id}/status
#[utoipa::path(
    patch,
    path = "/api/companies/{id}/status",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da companhia")),
    responses((status = 200, description = "is_active invertido", body = InsuranceCompany)),
    security(("api_jwt" = []))
)]
pub async fn toggle_company_status(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let company = app_state
        .catalog_service
        .toggle_company(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(company)))
}

// DELETE /api/companies/{id}
#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da companhia")),
    responses(
        (status = 204, description = "Companhia e coberturas removidas"),
        (status = 404, description = "Companhia não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    app_state
        .catalog_service
        .delete_company(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: COBERTURAS
// =============================================================================

// GET /api/coverage-types
#[utoipa::path(
    get,
    path = "/api/coverage-types",
    tag = "Companies",
    params(
        ("companyId" = Option<Uuid>, Query, description = "Só as desta companhia"),
        ("policyType" = Option<String>, Query, description = "Nome do tipo de apólice (sem diferenciar maiúsculas)")
    ),
    responses((status = 200, body = Vec<CoverageType>)),
    security(("api_jwt" = []))
)]
pub async fn list_coverage_types(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Query(query): Query<CoverageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let coverages = app_state
        .catalog_service
        .list_coverage_types(&mut tx, agent.0, query.company_id, query.policy_type.as_deref())
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(coverages)))
}

// POST /api/coverage-types
#[utoipa::path(
    post,
    path = "/api/coverage-types",
    tag = "Companies",
    request_body = CoverageTypeInput,
    responses(
        (status = 201, body = CoverageType),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Companhia não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_coverage_type(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Json(payload): Json<CoverageTypeInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    payload.validate().map_err(|e| fail(AppError::ValidationError(e)))?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let coverage = app_state
        .catalog_service
        .create_coverage_type(&mut tx, agent.0, &payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::CREATED, Json(coverage)))
}

// PUT /api/coverage-types/{id}
#[utoipa::path(
    put,
    path = "/api/coverage-types/{id}",
    tag = "Companies",
    request_body = CoverageTypeInput,
    params(("id" = Uuid, Path, description = "ID da cobertura")),
    responses(
        (status = 200, body = CoverageType),
        (status = 404, description = "Cobertura ou companhia não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_coverage_type(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<CoverageTypeInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    payload.validate().map_err(|e| fail(AppError::ValidationError(e)))?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let coverage = app_state
        .catalog_service
        .update_coverage_type(&mut tx, agent.0, id, &payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(coverage)))
}

// DELETE /api/coverage-types/{id}
#[utoipa::path(
    delete,
    path = "/api/coverage-types/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da cobertura")),
    responses(
        (status = 204, description = "Cobertura removida"),
        (status = 404, description = "Cobertura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_coverage_type(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    app_state
        .catalog_service
        .delete_coverage_type(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}
