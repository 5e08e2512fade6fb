// src/models/company.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ---
// 1. Compañía aseguradora
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceCompany {
    pub id: Uuid,
    pub agent_id: Uuid,

    #[schema(example = "Acme Seguros")]
    pub name: String,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsuranceCompany {
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }
}

// Linha da listagem: a companhia + quantas coberturas ela tem
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListEntry {
    #[serde(flatten)]
    pub company: InsuranceCompany,
    pub coverage_count: usize,
}

// ---
// 2. Tipo de cobertura (produto de uma companhia para um tipo de apólice)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoverageType {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub company_id: Uuid,

    #[schema(example = "Todo Riesgo")]
    pub name: String,
    pub description: Option<String>,

    // Nome do tipo de apólice ao qual se aplica (comparado sem diferenciar maiúsculas)
    #[schema(example = "Auto")]
    pub policy_type: String,

    // Valores padrão sugeridos ao escolher a cobertura
    pub base_premium: Option<Decimal>,
    pub currency_code: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CoverageType {
    pub fn applies_to(&self, policy_type_name: &str) -> bool {
        self.policy_type.trim().to_lowercase() == policy_type_name.trim().to_lowercase()
    }
}

fn default_true() -> bool {
    true
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("negative_amount".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Acme Seguros")]
    pub name: String,
    pub description: Option<String>,
    #[validate(email(message = "email"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoverageTypeInput {
    pub company_id: Uuid,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Auto")]
    pub policy_type: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub base_premium: Option<Decimal>,
    pub currency_code: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn coverage_matches_policy_type_ignoring_case() {
        let coverage = CoverageType {
            id: Uuid::new_v4(),
            agent_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Todo Riesgo".into(),
            description: None,
            policy_type: "auto".into(),
            base_premium: None,
            currency_code: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(coverage.applies_to(" AUTO"));
        assert!(!coverage.applies_to("Moto"));
    }

    #[test]
    fn negative_base_premium_is_rejected() {
        let input: CoverageTypeInput = serde_json::from_value(serde_json::json!({
            "companyId": Uuid::new_v4(),
            "name": "Básica",
            "policyType": "Auto",
            "basePremium": -5
        }))
        .unwrap();
        assert!(input.is_active);
        assert!(input.validate().unwrap_err().field_errors().contains_key("base_premium"));
    }
}
