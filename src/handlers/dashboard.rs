// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AgentContext, i18n::Locale},
    models::dashboard::DashboardSummary,
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais, vencimentos próximos, últimas notificações e prêmios mensais", body = DashboardSummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    agent: AgentContext,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &agent).await.map_err(fail)?;
    let summary = app_state
        .dashboard_service
        .summary(&mut tx, agent.0, Utc::now().date_naive(), app_state.expiry_window_days)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(|e| fail(e.into()))?;

    Ok((StatusCode::OK, Json(summary)))
}
