// src/handlers/policy_types.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AgentContext, i18n::Locale},
    models::{
        custom_field::CustomFieldDefinition,
        policy_type::{PolicyType, PolicyTypeInput, COMMON_ICONS},
    },
    services::{field_presets::default_fields, form_binder::MoveDirection},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PresetQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SortOrderPayload {
    #[schema(example = 2)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveFieldPayload {
    pub direction: MoveDirection,
}

// =============================================================================
//  1. CRUD DO TIPO
// =============================================================================

// GET /api/policy-types
#[utoipa::path(
    get,
    path = "/api/policy-types",
    tag = "Policy Types",
    params(("search" = Option<String>, Query, description = "Busca por nome ou descrição")),
    responses((status = 200, description = "Tipos do agente, na ordem de exibição", body = Vec<PolicyType>)),
    security(("api_jwt" = []))
)]
pub async fn list_policy_types(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let types = app_state
        .policy_type_service
        .list(&mut tx, agent.0, query.search.as_deref())
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(types)))
}

// GET /api/policy-types/presets
#[utoipa::path(
    get,
    path = "/api/policy-types/presets",
    tag = "Policy Types",
    params(("name" = String, Query, description = "Nome do tipo (ex: Auto, Hogar)")),
    responses((status = 200, description = "Campos sugeridos para o nome", body = Vec<CustomFieldDefinition>)),
    security(("api_jwt" = []))
)]
pub async fn get_field_presets(Query(query): Query<PresetQuery>) -> impl IntoResponse {
    Json(default_fields(&query.name))
}

// GET /api/policy-types/icons
#[utoipa::path(
    get,
    path = "/api/policy-types/icons",
    tag = "Policy Types",
    responses((status = 200, description = "Ícones sugeridos para o cadastro", body = Vec<String>)),
    security(("api_jwt" = []))
)]
pub async fn list_common_icons() -> impl IntoResponse {
    Json(COMMON_ICONS)
}

// POST /api/policy-types
#[utoipa::path(
    post,
    path = "/api/policy-types",
    tag = "Policy Types",
    request_body = PolicyTypeInput,
    responses(
        (status = 201, description = "Tipo criado (com os campos sugeridos se vier sem campos)", body = PolicyType),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_policy_type(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Json(payload): Json<PolicyTypeInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    payload.validate().map_err(|e| fail(AppError::ValidationError(e)))?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let created = app_state
        .policy_type_service
        .create(&mut tx, agent.0, payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/policy-types/{id}
#[utoipa::path(
    get,
    path = "/api/policy-types/{id}",
    tag = "Policy Types",
    params(("id" = Uuid, Path, description = "ID do tipo")),
    responses(
        (status = 200, body = PolicyType),
        (status = 404, description = "Tipo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_policy_type(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let policy_type = app_state
        .policy_type_service
        .get(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(policy_type)))
}

// PUT /api/policy-types/{id}
#[utoipa::path(
    put,
    path = "/api/policy-types/{id}",
    tag = "Policy Types",
    request_body = PolicyTypeInput,
    params(("id" = Uuid, Path, description = "ID do tipo")),
    responses(
        (status = 200, body = PolicyType),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Tipo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_policy_type(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<PolicyTypeInput>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    payload.validate().map_err(|e| fail(AppError::ValidationError(e)))?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let updated = app_state
        .policy_type_service
        .update(&mut tx, agent.0, id, payload)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(updated)))
}

// DELETE /api/policy-types/{id}
#[utoipa::path(
    delete,
    path = "/api/policy-types/{id}",
    tag = "Policy Types",
    params(("id" = Uuid, Path, description = "ID do tipo")),
    responses(
        (status = 204, description = "Tipo removido; as apólices mantêm o nome"),
        (status = 404, description = "Tipo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_policy_type(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    app_state
        .policy_type_service
        .delete(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/policy-types/{id}/status
#[utoipa::path(
    patch,
    path = "/api/policy-types/{id}/status",
    tag = "Policy Types",
    params(("id" = Uuid, Path, description = "ID do tipo")),
    responses((status = 200, description = "is_active invertido", body = PolicyType)),
    security(("api_jwt" = []))
)]
pub async fn toggle_policy_type_status(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let updated = app_state
        .policy_type_service
        .toggle_status(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(updated)))
}

// PATCH /api/policy-types/{id}/sort-order
#[utoipa::path(
    patch,
    path = "/api/policy-types/{id}/sort-order",
    tag = "Policy Types",
    request_body = SortOrderPayload,
    params(("id" = Uuid, Path, description = "ID do tipo")),
    responses((status = 200, body = PolicyType)),
    security(("api_jwt" = []))
)]
pub async fn set_policy_type_sort_order(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<SortOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let updated = app_state
        .policy_type_service
        .set_sort_order(&mut tx, agent.0, id, payload.sort_order)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(updated)))
}

// =============================================================================
//  2. AUTORIA DOS CAMPOS
// =============================================================================

// POST /api/policy-types/{id}/fields
#[utoipa::path(
    post,
    path = "/api/policy-types/{id}/fields",
    tag = "Policy Types",
    request_body = CustomFieldDefinition,
    params(("id" = Uuid, Path, description = "ID do tipo")),
    responses(
        (status = 201, description = "Campo adicionado ao final", body = PolicyType),
        (status = 400, description = "Nome ou rótulo vazio")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_custom_field(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
    Json(field): Json<CustomFieldDefinition>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    field.validate().map_err(|e| fail(AppError::ValidationError(e)))?;

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let updated = app_state
        .policy_type_service
        .add_field(&mut tx, agent.0, id, field)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::CREATED, Json(updated)))
}

// DELETE /api/policy-types/{id}/fields/{index}
#[utoipa::path(
    delete,
    path = "/api/policy-types/{id}/fields/{index}",
    tag = "Policy Types",
    params(
        ("id" = Uuid, Path, description = "ID do tipo"),
        ("index" = usize, Path, description = "Posição do campo (0 = primeiro)")
    ),
    responses((status = 200, description = "Lista de campos sem o índice (fora do intervalo: sem mudança)", body = PolicyType)),
    security(("api_jwt" = []))
)]
pub async fn remove_custom_field(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let updated = app_state
        .policy_type_service
        .remove_field(&mut tx, agent.0, id, index)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(updated)))
}

// POST /api/policy-types/{id}/fields/{index}/move
#[utoipa::path(
    post,
    path = "/api/policy-types/{id}/fields/{index}/move",
    tag = "Policy Types",
    request_body = MoveFieldPayload,
    params(
        ("id" = Uuid, Path, description = "ID do tipo"),
        ("index" = usize, Path, description = "Posição do campo")
    ),
    responses((status = 200, description = "Campos reordenados (nas pontas: sem mudança)", body = PolicyType)),
    security(("api_jwt" = []))
)]
pub async fn move_custom_field(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<MoveFieldPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let updated = app_state
        .policy_type_service
        .move_field(&mut tx, agent.0, id, index, payload.direction)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(updated)))
}
