// src/handlers/notifications.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AgentContext, i18n::Locale},
    models::notification::{Notification, NotificationEntry, ReadFilter},
};

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub filter: ReadFilter,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAllResponse {
    pub updated: u64,
}

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    params(("filter" = Option<String>, Query, description = "all | unread | read")),
    responses((status = 200, description = "Mais recentes primeiro", body = Vec<NotificationEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let entries = app_state
        .notification_service
        .list(&mut tx, agent.0, query.filter)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(entries)))
}

// PATCH /api/notifications/{id}/read
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "ID da notificação")),
    responses(
        (status = 200, body = Notification),
        (status = 404, description = "Notificação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let notification = app_state
        .notification_service
        .mark_read(&mut tx, agent.0, id)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(notification)))
}

// POST /api/notifications/read-all
#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    responses((status = 200, description = "Quantas foram marcadas", body = MarkAllResponse)),
    security(("api_jwt" = []))
)]
pub async fn mark_all_notifications_read(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let updated = app_state
        .notification_service
        .mark_all_read(&mut tx, agent.0)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(MarkAllResponse { updated })))
}

// POST /api/notifications/expiry-scan
#[utoipa::path(
    post,
    path = "/api/notifications/expiry-scan",
    tag = "Notifications",
    responses((status = 201, description = "Avisos de vencimento criados nesta varredura", body = Vec<Notification>)),
    security(("api_jwt" = []))
)]
pub async fn run_expiry_scan(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let created = app_state
        .notification_service
        .expiry_scan(
            &mut tx,
            agent.0,
            Utc::now().date_naive(),
            app_state.expiry_window_days,
            &app_state.i18n_store,
        )
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::CREATED, Json(created)))
}
