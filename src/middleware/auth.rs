// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// O agente dono da requisição. Todas as linhas que ele lê/escreve levam este agent_id.
#[derive(Debug, Clone, Copy)]
pub struct AgentContext(pub Uuid);

// O "porteiro": sem Bearer válido, nada passa
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let reject = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| reject(AppError::InvalidToken))?;
    let agent_id = app_state
        .auth_service
        .validate_token(bearer.token())
        .map_err(reject)?;

    // Insere o agente nos "extensions" da requisição
    request.extensions_mut().insert(AgentContext(agent_id));
    Ok(next.run(request).await)
}

// Extrator para obter o agente autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AgentContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AgentContext>() {
            Some(agent) => Ok(*agent),
            // Rota montada sem o auth_guard: erro de programação, não do cliente
            None => {
                tracing::error!("AgentContext ausente: rota sem auth_guard?");
                Err(ApiError {
                    status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    error: "AgentContext ausente".to_string(),
                    details: None,
                })
            }
        }
    }
}
