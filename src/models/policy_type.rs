// src/models/policy_type.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::custom_field::CustomFieldDefinition;

pub const DEFAULT_ICON: &str = "📋";

// Ícones sugeridos no cadastro de tipos
pub const COMMON_ICONS: [&str; 20] = [
    "📋", "❤️", "🚗", "🏍️", "🚲", "🏠", "🏥", "✈️", "🐕", "⚖️",
    "💼", "🔧", "🌟", "🛡️", "💰", "🎯", "📊", "🔒", "🌍", "⭐",
];

// ---
// Tipo de Póliza (A categoria + o schema dos campos personalizados)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyType {
    pub id: Uuid,
    pub agent_id: Uuid,

    #[schema(example = "Auto")]
    pub name: String,

    #[schema(example = "🚗")]
    pub icon: String,

    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,

    // JSONB no banco; a ordem do vetor é a ordem de exibição
    #[sqlx(json)]
    pub custom_fields: Vec<CustomFieldDefinition>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PolicyType {
    /// Busca por nome ou descrição, sem diferenciar maiúsculas.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_true() -> bool {
    true
}

/// Dados editáveis de um tipo (criação e substituição completa).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyTypeInput {
    #[validate(length(min = 1, max = 100, message = "required"))]
    #[schema(example = "Auto")]
    pub name: String,

    #[serde(default = "default_icon")]
    pub icon: String,

    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i32,

    // Vazio ou ausente na criação = campos sugeridos para o nome
    #[serde(default)]
    #[validate(nested)]
    pub custom_fields: Vec<CustomFieldDefinition>,
}
