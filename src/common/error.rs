// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::custom_field::FieldIssue,
};

// Erro interno: é o que repositórios, serviços e middlewares devolvem.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Campos personalizados que não passaram no schema do tipo de apólice
    #[error("Campos personalizados inválidos: {0:?}")]
    CustomFieldValidation(Vec<FieldIssue>),

    // Guarda o "código" do conflito (ex: "policy_number"), usado na tradução
    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Guarda o "recurso" (ex: "policy"), usado na tradução
    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

// O erro que vai para o cliente HTTP, já traduzido.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    /// Converte o erro interno em resposta traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();

        match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            // A mensagem do validator é um código (ex: "required")
                            let code = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(store.translate(lang, &format!("validation.{}", code)))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: store.translate(lang, "error.validation"),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::CustomFieldValidation(issues) => {
                let details: Vec<Value> = issues
                    .iter()
                    .map(|issue| {
                        let min = issue.min.map(|v| v.to_string()).unwrap_or_default();
                        let max = issue.max.map(|v| v.to_string()).unwrap_or_default();
                        let message = store.translate_with(
                            lang,
                            &format!("custom_field.{}", issue.code.as_str()),
                            &[("label", issue.label.as_str()), ("min", min.as_str()), ("max", max.as_str())],
                        );
                        json!({
                            "field": issue.field,
                            "label": issue.label,
                            "code": issue.code.as_str(),
                            "message": message,
                        })
                    })
                    .collect();
                ApiError {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    error: store.translate(lang, "error.custom_fields"),
                    details: Some(Value::Array(details)),
                }
            }
            AppError::UniqueConstraintViolation(code) => ApiError {
                status: StatusCode::CONFLICT,
                error: translate_or(store, lang, &format!("conflict.{}", code), "conflict.generic"),
                details: None,
            },
            AppError::ResourceNotFound(resource) => ApiError {
                status: StatusCode::NOT_FOUND,
                error: translate_or(store, lang, &format!("not_found.{}", resource), "not_found.generic"),
                details: None,
            },
            AppError::InvalidToken => ApiError {
                status: StatusCode::UNAUTHORIZED,
                error: store.translate(lang, "error.invalid_token"),
                details: None,
            },
            // Banco e erros inesperados viram 500; o detalhe só vai para o log.
            e => {
                tracing::error!("🔥 Erro Interno do Servidor: {}", e);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: store.translate(lang, "error.internal"),
                    details: None,
                }
            }
        }
    }
}

fn translate_or(store: &I18nStore, lang: &str, key: &str, fallback: &str) -> String {
    let message = store.translate(lang, key);
    if message == key {
        store.translate(lang, fallback)
    } else {
        message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Converte erros do sqlx, trocando violação de unicidade por um conflito com código.
pub fn map_unique_violation(e: sqlx::Error, code: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(code.to_string());
        }
    }
    AppError::DatabaseError(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::custom_field::IssueCode;

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn custom_field_issues_name_the_field_by_label() {
        let err = AppError::CustomFieldValidation(vec![FieldIssue {
            field: "patente".into(),
            label: "Patente".into(),
            code: IssueCode::Required,
            min: None,
            max: None,
        }]);

        let api = err.to_api_error(&Locale("es".into()), &store());
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);

        let details = api.details.unwrap();
        assert_eq!(details[0]["field"], "patente");
        assert_eq!(details[0]["code"], "required");
        assert_eq!(details[0]["message"], "El campo «Patente» es obligatorio.");
    }

    #[test]
    fn unknown_conflict_code_uses_generic_message() {
        let api = AppError::UniqueConstraintViolation("whatever".into())
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.error, "The record already exists.");
    }

    #[test]
    fn not_found_is_translated_per_resource() {
        let api = AppError::ResourceNotFound("policy".into())
            .to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Apólice não encontrada.");
    }

    #[test]
    fn database_errors_hide_details() {
        let api = AppError::DatabaseError(sqlx::Error::RowNotFound)
            .to_api_error(&Locale("es".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Ocurrió un error inesperado.");
    }
}
