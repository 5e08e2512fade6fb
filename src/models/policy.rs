// src/models/policy.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const DEFAULT_CURRENCY: &str = "EUR";

// --- ENUMS ---

// Mapeia o CREATE TYPE payment_frequency do banco
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "payment_frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    #[default]
    Mensual,
    Trimestral,
    Semestral,
    Anual,
}

impl PaymentFrequency {
    /// Quantos meses cada pagamento cobre.
    pub fn months_covered(self) -> u32 {
        match self {
            PaymentFrequency::Mensual => 1,
            PaymentFrequency::Trimestral => 3,
            PaymentFrequency::Semestral => 6,
            PaymentFrequency::Anual => 12,
        }
    }

    /// Equivalente mensal de um prêmio pago nesta frequência.
    pub fn monthly_equivalent(self, amount: Decimal) -> Decimal {
        amount / Decimal::from(self.months_covered())
    }
}

// Mapeia o CREATE TYPE policy_status do banco
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "policy_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    #[default]
    Activa,
    Vencida,
    Cancelada,
    Pendiente,
}

// --- PÓLIZA (A linha gravada) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: Uuid,
    pub agent_id: Uuid,

    #[schema(example = "POL-2026-0001")]
    pub policy_number: String,
    pub policyholder_id: Uuid,

    // Nome desnormalizado (legado) + referência opcional
    pub policy_type: String,
    pub policy_type_id: Option<Uuid>,

    // Nome da companhia: vem da companhia selecionada ou é digitado à mão
    pub insurance_company: String,
    pub company_id: Option<Uuid>,
    pub coverage_type_id: Option<Uuid>,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    pub premium_amount: Decimal,
    pub currency_code: String,
    pub payment_frequency: PaymentFrequency,
    pub status: PolicyStatus,

    // CAMPOS PERSONALIZADOS: { "marca": "Ford", "año": 2020 }
    #[schema(value_type = Object)]
    pub custom_data: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da listagem: a apólice + o nome formatado do asegurado
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyListEntry {
    #[serde(flatten)]
    pub policy: Policy,

    #[schema(example = "Juan PÉREZ")]
    pub policyholder_name: String,
}

/// Filtros da listagem de apólices (aplicados sobre as linhas já carregadas).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyFilter {
    pub search: Option<String>,
    pub policy_type: Option<String>,
    pub status: Option<PolicyStatus>,
}

impl PolicyFilter {
    pub fn matches(&self, entry: &PolicyListEntry) -> bool {
        let policy = &entry.policy;

        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = policy.policy_number.to_lowercase().contains(&term)
                || policy.insurance_company.to_lowercase().contains(&term)
                || entry.policyholder_name.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if let Some(kind) = self.policy_type.as_deref().filter(|k| !k.is_empty() && *k != "all") {
            if !policy.policy_type.eq_ignore_ascii_case(kind) {
                return false;
            }
        }

        if let Some(status) = self.status {
            if policy.status != status {
                return false;
            }
        }

        true
    }
}

// --- RASCUNHO (O formulário em memória) ---

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("negative_amount".into());
        return Err(err);
    }
    Ok(())
}

// Só espaços conta como vazio: o número é gravado sem eles
fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("length");
        err.message = Some("required".into());
        return Err(err);
    }
    Ok(())
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// O rascunho de uma apólice: o que o editor manipula e o que o envio grava.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDraft {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "POL-2026-0001")]
    pub policy_number: String,

    #[validate(required(message = "required"))]
    pub policyholder_id: Option<Uuid>,

    pub policy_type_id: Option<Uuid>,
    #[serde(default)]
    pub policy_type: String,

    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub insurance_company: String,

    pub coverage_type_id: Option<Uuid>,

    #[validate(required(message = "required"))]
    #[schema(value_type = Option<String>, format = Date, example = "2026-01-01")]
    pub start_date: Option<NaiveDate>,

    #[validate(required(message = "required"))]
    #[schema(value_type = Option<String>, format = Date, example = "2027-01-01")]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub premium_amount: Decimal,

    #[serde(default = "default_currency")]
    pub currency_code: String,

    #[serde(default)]
    pub payment_frequency: PaymentFrequency,

    #[serde(default)]
    pub status: PolicyStatus,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub custom_data: Map<String, Value>,
}

impl Default for PolicyDraft {
    fn default() -> Self {
        Self {
            policy_number: String::new(),
            policyholder_id: None,
            policy_type_id: None,
            policy_type: String::new(),
            company_id: None,
            insurance_company: String::new(),
            coverage_type_id: None,
            start_date: None,
            end_date: None,
            premium_amount: Decimal::ZERO,
            currency_code: default_currency(),
            payment_frequency: PaymentFrequency::default(),
            status: PolicyStatus::default(),
            custom_data: Map::new(),
        }
    }
}

impl PolicyDraft {
    /// Rascunho para editar uma apólice já gravada.
    pub fn from_policy(policy: &Policy) -> Self {
        Self {
            policy_number: policy.policy_number.clone(),
            policyholder_id: Some(policy.policyholder_id),
            policy_type_id: policy.policy_type_id,
            policy_type: policy.policy_type.clone(),
            company_id: policy.company_id,
            insurance_company: policy.insurance_company.clone(),
            coverage_type_id: policy.coverage_type_id,
            start_date: Some(policy.start_date),
            end_date: Some(policy.end_date),
            premium_amount: policy.premium_amount,
            currency_code: policy.currency_code.clone(),
            payment_frequency: policy.payment_frequency,
            status: policy.status,
            custom_data: policy.custom_data.as_object().cloned().unwrap_or_default(),
        }
    }

    /// Regra entre campos: o vencimento não pode ser antes do início.
    pub fn validate_consistency(&self) -> Result<(), ValidationError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                let mut err = ValidationError::new("range");
                err.message = Some("invalid_period".into());
                return Err(err);
            }
        }
        Ok(())
    }

    /// Moeda normalizada para gravação (maiúsculas, EUR se vazia).
    pub fn normalized_currency(&self) -> String {
        let code = self.currency_code.trim().to_uppercase();
        if code.is_empty() { default_currency() } else { code }
    }
}

// --- REGISTRO (O que vai para o banco) ---

/// Rascunho já validado e normalizado, pronto para INSERT/UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyRecord {
    pub policy_number: String,
    pub policyholder_id: Uuid,
    pub policy_type: String,
    pub policy_type_id: Option<Uuid>,
    pub insurance_company: String,
    pub company_id: Option<Uuid>,
    pub coverage_type_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub premium_amount: Decimal,
    pub currency_code: String,
    pub payment_frequency: PaymentFrequency,
    pub status: PolicyStatus,
    pub custom_data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn monthly_equivalent_per_frequency() {
        assert_eq!(PaymentFrequency::Mensual.monthly_equivalent(dec(120)), dec(120));
        assert_eq!(PaymentFrequency::Trimestral.monthly_equivalent(dec(120)), dec(40));
        assert_eq!(PaymentFrequency::Semestral.monthly_equivalent(dec(120)), dec(20));
        assert_eq!(PaymentFrequency::Anual.monthly_equivalent(dec(120)), dec(10));
    }

    #[test]
    fn draft_defaults_match_new_policy_form() {
        let draft: PolicyDraft = serde_json::from_str("{}").unwrap();
        assert_eq!(draft, PolicyDraft::default());
        assert_eq!(draft.currency_code, "EUR");
        assert_eq!(draft.status, PolicyStatus::Activa);
        assert_eq!(draft.payment_frequency, PaymentFrequency::Mensual);
    }

    #[test]
    fn missing_base_fields_fail_validation() {
        let draft = PolicyDraft::default();
        let errors = draft.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("policy_number"));
        assert!(fields.contains_key("policyholder_id"));
        assert!(fields.contains_key("start_date"));
    }

    #[test]
    fn blank_policy_number_counts_as_missing() {
        let draft = PolicyDraft {
            policy_number: "   ".into(),
            ..PolicyDraft::default()
        };
        let errors = draft.validate().unwrap_err();
        let number_errors = &errors.field_errors()["policy_number"];
        assert_eq!(number_errors[0].message.as_deref(), Some("required"));
    }

    #[test]
    fn end_before_start_is_inconsistent() {
        let draft = PolicyDraft {
            start_date: NaiveDate::from_ymd_opt(2026, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 4, 1),
            ..PolicyDraft::default()
        };
        assert!(draft.validate_consistency().is_err());
    }

    #[test]
    fn negative_premium_is_rejected() {
        let draft = PolicyDraft {
            premium_amount: dec(-1),
            ..PolicyDraft::default()
        };
        let errors = draft.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("premium_amount"));
    }

    #[test]
    fn status_filter_and_search_combine() {
        let entry = PolicyListEntry {
            policy: sample_policy(),
            policyholder_name: "Juan PÉREZ".into(),
        };
        let by_holder = PolicyFilter { search: Some("pérez".into()), ..Default::default() };
        assert!(by_holder.matches(&entry));

        let wrong_status = PolicyFilter { status: Some(PolicyStatus::Vencida), ..Default::default() };
        assert!(!wrong_status.matches(&entry));

        let by_type = PolicyFilter { policy_type: Some("AUTO".into()), ..Default::default() };
        assert!(by_type.matches(&entry));
    }

    fn sample_policy() -> Policy {
        Policy {
            id: Uuid::new_v4(),
            agent_id: Uuid::new_v4(),
            policy_number: "POL-1".into(),
            policyholder_id: Uuid::new_v4(),
            policy_type: "Auto".into(),
            policy_type_id: None,
            insurance_company: "Acme".into(),
            company_id: None,
            coverage_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
            premium_amount: dec(100),
            currency_code: "EUR".into(),
            payment_frequency: PaymentFrequency::Mensual,
            status: PolicyStatus::Activa,
            custom_data: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
