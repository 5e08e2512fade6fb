// src/models/custom_field.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Os tipos de controle que um campo personalizado pode ter.
// Guardado dentro do JSONB de policy_types.custom_fields, por isso não é um tipo do Postgres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Select,
    Textarea,
    Email,
    Tel,
}

// --- DEFINIÇÃO (O Molde) ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "^[A-Z]{2,3}[0-9]{3}[A-Z]{0,2}$")]
    pub pattern: Option<String>,
}

/// Um campo dinâmico de um tipo de apólice.
///
/// A ordem dentro de `PolicyType::custom_fields` é a ordem de exibição.
/// `name` é a chave usada em `Policy::custom_data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldDefinition {
    // Se o cliente não mandar, geramos um novo. No banco o id é sempre preenchido
    // (trigger de policy_types), então a releitura devolve o mesmo.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "patente")]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Patente")]
    pub label: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    // Só faz sentido para `select`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl CustomFieldDefinition {
    pub fn new(name: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            label: label.to_string(),
            field_type,
            required: false,
            options: None,
            placeholder: None,
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        let validation = self.validation.get_or_insert_with(FieldValidation::default);
        validation.min = min;
        validation.max = max;
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        let validation = self.validation.get_or_insert_with(FieldValidation::default);
        validation.pattern = Some(pattern.to_string());
        self
    }

    pub fn min(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.max)
    }

    pub fn pattern(&self) -> Option<&str> {
        self.validation.as_ref().and_then(|v| v.pattern.as_deref())
    }
}

// --- VALOR (O Dado) ---

/// Valor de um campo personalizado já interpretado pelo tipo do campo.
///
/// No banco continua sendo JSON; a conversão acontece na borda
/// (lê com `parse`, grava com `to_json`).
#[derive(Debug, Clone, PartialEq)]
pub enum CustomValue {
    Text(String),
    Number(Number),
    Date(NaiveDate),
}

impl CustomValue {
    /// Interpreta um valor JSON segundo o campo. `Ok(None)` = vazio.
    pub fn parse(field: &CustomFieldDefinition, raw: &Value) -> Result<Option<Self>, IssueCode> {
        match raw {
            Value::Null => return Ok(None),
            Value::String(s) if s.trim().is_empty() => return Ok(None),
            _ => {}
        }

        match field.field_type {
            FieldType::Number => match raw {
                Value::Number(n) => Ok(Some(CustomValue::Number(n.clone()))),
                Value::String(s) => parse_number(s)
                    .map(|n| Some(CustomValue::Number(n)))
                    .ok_or(IssueCode::InvalidNumber),
                _ => Err(IssueCode::InvalidNumber),
            },
            FieldType::Date => match raw {
                Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map(|d| Some(CustomValue::Date(d)))
                    .map_err(|_| IssueCode::InvalidDate),
                _ => Err(IssueCode::InvalidDate),
            },
            // Campos de texto aceitam números já gravados sem convertê-los
            _ => match raw {
                Value::String(s) => Ok(Some(CustomValue::Text(s.clone()))),
                Value::Number(n) => Ok(Some(CustomValue::Number(n.clone()))),
                _ => Err(IssueCode::InvalidText),
            },
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CustomValue::Text(s) => Value::String(s.clone()),
            CustomValue::Number(n) => Value::Number(n.clone()),
            CustomValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// O texto que vai dentro do controle do formulário.
    pub fn display(&self) -> String {
        match self {
            CustomValue::Text(s) => s.clone(),
            CustomValue::Number(n) => n.to_string(),
            CustomValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CustomValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

/// Converte texto em número JSON. Inteiros continuam inteiros ("2020" -> 2020).
/// NaN e infinito são rejeitados.
pub fn parse_number(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::from(i));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

// --- ERROS DE VALIDAÇÃO ---

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidNumber,
    InvalidDate,
    InvalidOption,
    BelowMin,
    AboveMax,
    PatternMismatch,
    InvalidEmail,
    InvalidText,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::Required => "required",
            IssueCode::InvalidNumber => "invalid_number",
            IssueCode::InvalidDate => "invalid_date",
            IssueCode::InvalidOption => "invalid_option",
            IssueCode::BelowMin => "below_min",
            IssueCode::AboveMax => "above_max",
            IssueCode::PatternMismatch => "pattern_mismatch",
            IssueCode::InvalidEmail => "invalid_email",
            IssueCode::InvalidText => "invalid_text",
        }
    }
}

/// Um problema encontrado num campo personalizado na hora do envio.
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    pub field: String,
    pub label: String,
    pub code: IssueCode,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldIssue {
    pub fn new(field: &CustomFieldDefinition, code: IssueCode) -> Self {
        Self {
            field: field.name.clone(),
            label: field.label.clone(),
            code,
            min: field.min(),
            max: field.max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number_field() -> CustomFieldDefinition {
        CustomFieldDefinition::new("año", "Año", FieldType::Number)
    }

    #[test]
    fn integer_text_becomes_integer_number() {
        let value = CustomValue::parse(&number_field(), &json!("2020")).unwrap().unwrap();
        assert_eq!(value.to_json(), json!(2020));
    }

    #[test]
    fn garbage_number_is_rejected_instead_of_nan() {
        assert_eq!(
            CustomValue::parse(&number_field(), &json!("dos mil")),
            Err(IssueCode::InvalidNumber)
        );
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(" 12.5 "), Number::from_f64(12.5));
    }

    #[test]
    fn generated_id_is_kept_once_written() {
        let incoming = json!({"name": "patente", "label": "Patente", "type": "text"});
        let field: CustomFieldDefinition = serde_json::from_value(incoming).unwrap();
        assert!(!field.id.is_nil());

        // O que vai para o JSONB sempre leva o id
        let stored = serde_json::to_value(&field).unwrap();
        assert_eq!(stored["id"], json!(field.id.to_string()));
        let reread: CustomFieldDefinition = serde_json::from_value(stored).unwrap();
        assert_eq!(reread, field);
    }

    #[test]
    fn blank_values_are_empty() {
        assert_eq!(CustomValue::parse(&number_field(), &json!("  ")), Ok(None));
        assert_eq!(CustomValue::parse(&number_field(), &Value::Null), Ok(None));
    }

    #[test]
    fn dates_must_be_iso() {
        let field = CustomFieldDefinition::new("fecha_salida", "Fecha de salida", FieldType::Date);
        let value = CustomValue::parse(&field, &json!("2026-03-01")).unwrap().unwrap();
        assert_eq!(value.to_json(), json!("2026-03-01"));
        assert_eq!(
            CustomValue::parse(&field, &json!("01/03/2026")),
            Err(IssueCode::InvalidDate)
        );
    }

    #[test]
    fn text_fields_keep_stored_numbers() {
        let field = CustomFieldDefinition::new("a", "A", FieldType::Text);
        let value = CustomValue::parse(&field, &json!(1)).unwrap().unwrap();
        assert_eq!(value.to_json(), json!(1));
        assert_eq!(CustomValue::parse(&field, &json!(true)), Err(IssueCode::InvalidText));
    }

    #[test]
    fn definition_wire_format_uses_type_key() {
        let field = CustomFieldDefinition::new("combustible", "Combustible", FieldType::Select)
            .with_options(&["Nafta", "Diesel"]);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["options"], json!(["Nafta", "Diesel"]));
        assert!(json.get("validation").is_none());

        // Campos vindos do cliente sem id recebem um novo
        let parsed: CustomFieldDefinition =
            serde_json::from_value(json!({"name": "x", "label": "X", "type": "tel"})).unwrap();
        assert_eq!(parsed.field_type, FieldType::Tel);
        assert!(!parsed.required);
        assert!(!parsed.id.is_nil());
    }
}
