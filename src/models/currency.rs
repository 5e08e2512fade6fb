// src/models/currency.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: Uuid,
    pub agent_id: Uuid,

    // Sempre em maiúsculas (ISO 4217)
    #[schema(example = "ARS")]
    pub code: String,
    #[schema(example = "Peso Argentino")]
    pub name: String,
    #[schema(example = "$")]
    pub symbol: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Currency {
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.code.to_lowercase().contains(&term)
            || self.name.to_lowercase().contains(&term)
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct CurrencyPreset {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

const fn preset(code: &'static str, name: &'static str, symbol: &'static str) -> CurrencyPreset {
    CurrencyPreset { code, name, symbol }
}

// Moedas mais usadas, oferecidas como atalho no cadastro
pub const COMMON_CURRENCIES: [CurrencyPreset; 15] = [
    preset("EUR", "Euro", "€"),
    preset("USD", "Dólar Estadounidense", "$"),
    preset("ARS", "Peso Argentino", "$"),
    preset("CLP", "Peso Chileno", "$"),
    preset("COP", "Peso Colombiano", "$"),
    preset("MXN", "Peso Mexicano", "$"),
    preset("PEN", "Sol Peruano", "S/"),
    preset("UYU", "Peso Uruguayo", "$"),
    preset("BOB", "Boliviano", "Bs"),
    preset("BRL", "Real Brasileño", "R$"),
    preset("GBP", "Libra Esterlina", "£"),
    preset("JPY", "Yen Japonés", "¥"),
    preset("CAD", "Dólar Canadiense", "C$"),
    preset("CHF", "Franco Suizo", "CHF"),
    preset("CNY", "Yuan Chino", "¥"),
];

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyInput {
    #[validate(length(equal = 3, message = "invalid_currency_code"))]
    #[schema(example = "USD")]
    pub code: String,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(length(min = 1, message = "required"))]
    pub symbol: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Código normalizado para gravação.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_codes_are_unique_and_uppercase() {
        let mut codes: Vec<&str> = COMMON_CURRENCIES.iter().map(|c| c.code).collect();
        assert!(codes.iter().all(|c| *c == normalize_code(c)));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), COMMON_CURRENCIES.len());
    }

    #[test]
    fn codes_are_uppercased() {
        assert_eq!(normalize_code(" usd "), "USD");
    }
}
