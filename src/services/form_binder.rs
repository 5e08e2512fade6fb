// src/services/form_binder.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    custom_field::{parse_number, CustomFieldDefinition, CustomValue, FieldIssue, FieldType, IssueCode},
    policy::PolicyDraft,
};

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("regex de e-mail fixa")
});

// =============================================================================
//  1. RENDERIZAÇÃO (campo -> controle)
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Select,
    Textarea,
    Number,
    Date,
    // text, email e tel: uma linha só, muda apenas o inputType
    Text,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// O descritor de um controle de formulário, pronto para o front-end desenhar.
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldControl {
    pub field_id: Uuid,
    pub name: String,
    pub label: String,
    pub kind: ControlKind,
    #[schema(example = "text")]
    pub input_type: String,
    pub required: bool,
    pub placeholder: Option<String>,

    // Sempre texto; "" quando não há valor
    pub value: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

pub fn render_field(field: &CustomFieldDefinition, current: Option<&Value>) -> FieldControl {
    let (kind, input_type) = match field.field_type {
        FieldType::Select => (ControlKind::Select, "select"),
        FieldType::Textarea => (ControlKind::Textarea, "textarea"),
        FieldType::Number => (ControlKind::Number, "number"),
        FieldType::Date => (ControlKind::Date, "date"),
        FieldType::Text => (ControlKind::Text, "text"),
        FieldType::Email => (ControlKind::Text, "email"),
        FieldType::Tel => (ControlKind::Text, "tel"),
    };

    let options: Vec<SelectOption> = match kind {
        ControlKind::Select => std::iter::once(SelectOption {
            value: String::new(),
            label: "Seleccionar...".to_string(),
        })
        .chain(field.options.iter().flatten().map(|o| SelectOption {
            value: o.clone(),
            label: o.clone(),
        }))
        .collect(),
        _ => Vec::new(),
    };

    let (min, max) = match kind {
        ControlKind::Number => (field.min(), field.max()),
        _ => (None, None),
    };

    FieldControl {
        field_id: field.id,
        name: field.name.clone(),
        label: field.label.clone(),
        kind,
        input_type: input_type.to_string(),
        required: field.required,
        placeholder: field.placeholder.clone(),
        value: current.map(display_value).unwrap_or_default(),
        options,
        min,
        max,
        pattern: match kind {
            ControlKind::Text => field.pattern().map(str::to_string),
            _ => None,
        },
    }
}

/// Um controle por campo, na ordem do schema. Chaves órfãs não aparecem.
pub fn render_form(fields: &[CustomFieldDefinition], custom_data: &Map<String, Value>) -> Vec<FieldControl> {
    fields
        .iter()
        .map(|field| render_field(field, custom_data.get(&field.name)))
        .collect()
}

fn display_value(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
//  2. EDIÇÃO (entrada do usuário -> rascunho)
// =============================================================================

/// Converte o texto digitado no valor guardado. Número inválido vira "" (nunca NaN).
pub fn apply_input(field: &CustomFieldDefinition, raw: &str) -> Value {
    match field.field_type {
        FieldType::Number => parse_number(raw)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(String::new())),
        _ => Value::String(raw.to_string()),
    }
}

/// Devolve um rascunho novo com `custom_data[name] = value`; o original fica intacto.
pub fn update_field(draft: &PolicyDraft, name: &str, value: Value) -> PolicyDraft {
    let mut custom_data = draft.custom_data.clone();
    custom_data.insert(name.to_string(), value);
    PolicyDraft {
        custom_data,
        ..draft.clone()
    }
}

// =============================================================================
//  3. ENVIO (validação + normalização)
// =============================================================================

/// Confere `custom_data` contra o schema e devolve a versão normalizada:
/// números como números JSON, datas ISO, vazios removidos, chaves órfãs mantidas.
pub fn validate_submission(
    fields: &[CustomFieldDefinition],
    custom_data: &Map<String, Value>,
) -> Result<Map<String, Value>, Vec<FieldIssue>> {
    let mut normalized = custom_data.clone();
    let mut issues = Vec::new();

    for field in fields {
        let raw = custom_data.get(&field.name).unwrap_or(&Value::Null);

        match CustomValue::parse(field, raw) {
            Ok(None) => {
                if field.required {
                    issues.push(FieldIssue::new(field, IssueCode::Required));
                }
                normalized.remove(&field.name);
            }
            Ok(Some(value)) => match check_constraints(field, &value) {
                Some(code) => issues.push(FieldIssue::new(field, code)),
                None => {
                    normalized.insert(field.name.clone(), value.to_json());
                }
            },
            Err(code) => issues.push(FieldIssue::new(field, code)),
        }
    }

    if issues.is_empty() {
        Ok(normalized)
    } else {
        Err(issues)
    }
}

fn check_constraints(field: &CustomFieldDefinition, value: &CustomValue) -> Option<IssueCode> {
    match field.field_type {
        FieldType::Number => {
            let n = value.as_f64()?;
            if field.min().is_some_and(|min| n < min) {
                return Some(IssueCode::BelowMin);
            }
            if field.max().is_some_and(|max| n > max) {
                return Some(IssueCode::AboveMax);
            }
            None
        }
        FieldType::Select => {
            let options = field.options.as_deref().unwrap_or_default();
            let chosen = value.display();
            (!options.is_empty() && !options.iter().any(|o| *o == chosen)).then_some(IssueCode::InvalidOption)
        }
        FieldType::Email if !EMAIL_SHAPE.is_match(value.display().trim()) => Some(IssueCode::InvalidEmail),
        FieldType::Text | FieldType::Email | FieldType::Tel => {
            let pattern = field.pattern()?;
            match Regex::new(&format!("^(?:{})$", pattern)) {
                Ok(re) => (!re.is_match(&value.display())).then_some(IssueCode::PatternMismatch),
                Err(e) => {
                    tracing::warn!("Padrão inválido no campo '{}' ignorado: {}", field.name, e);
                    None
                }
            }
        }
        _ => None,
    }
}

// =============================================================================
//  4. AUTORIA DA LISTA DE CAMPOS
// =============================================================================

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

pub fn add_field(fields: &[CustomFieldDefinition], field: CustomFieldDefinition) -> Vec<CustomFieldDefinition> {
    let mut next = fields.to_vec();
    next.push(field);
    next
}

/// Índice fora da lista: nada muda.
pub fn remove_field(fields: &[CustomFieldDefinition], index: usize) -> Vec<CustomFieldDefinition> {
    let mut next = fields.to_vec();
    if index < next.len() {
        next.remove(index);
    }
    next
}

/// Primeiro para cima ou último para baixo: nada muda.
pub fn move_field(
    fields: &[CustomFieldDefinition],
    index: usize,
    direction: MoveDirection,
) -> Vec<CustomFieldDefinition> {
    let mut next = fields.to_vec();
    let target = match direction {
        MoveDirection::Up => index.checked_sub(1),
        MoveDirection::Down => index.checked_add(1),
    };
    if let Some(target) = target.filter(|t| *t < next.len() && index < next.len()) {
        next.swap(index, target);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::field_presets::default_fields;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn auto_fields() -> Vec<CustomFieldDefinition> {
        default_fields("Auto")
    }

    #[test]
    fn select_control_has_empty_option_first() {
        let fields = auto_fields();
        let combustible = fields.iter().find(|f| f.name == "combustible").unwrap();
        let control = render_field(combustible, None);

        assert_eq!(control.kind, ControlKind::Select);
        assert_eq!(control.value, "");
        assert_eq!(control.options[0].value, "");
        assert_eq!(control.options[0].label, "Seleccionar...");
        assert_eq!(control.options.len(), 6);
    }

    #[test]
    fn number_control_carries_bounds_and_text_value() {
        let fields = auto_fields();
        let controls = render_form(&fields, &data(json!({"año": 2020, "huérfano": "x"})));

        assert_eq!(controls.len(), 8);
        let year = &controls[2];
        assert_eq!(year.kind, ControlKind::Number);
        assert_eq!(year.value, "2020");
        assert_eq!(year.min, Some(1900.0));
        assert_eq!(year.max, Some(2100.0));
        assert!(controls.iter().all(|c| c.name != "huérfano"));
    }

    #[test]
    fn email_and_tel_are_single_line_with_pattern() {
        let email = CustomFieldDefinition::new("mail", "Mail", FieldType::Email).with_pattern(".+@acme\\.com");
        let tel = CustomFieldDefinition::new("tel", "Tel", FieldType::Tel);

        let control = render_field(&email, Some(&json!("a@acme.com")));
        assert_eq!(control.kind, ControlKind::Text);
        assert_eq!(control.input_type, "email");
        assert_eq!(control.pattern.as_deref(), Some(".+@acme\\.com"));
        assert_eq!(render_field(&tel, None).input_type, "tel");
    }

    #[test]
    fn number_input_never_produces_nan() {
        let year = CustomFieldDefinition::new("año", "Año", FieldType::Number);
        assert_eq!(apply_input(&year, "2020"), json!(2020));
        assert_eq!(apply_input(&year, "12.5"), json!(12.5));
        assert_eq!(apply_input(&year, "abc"), json!(""));
        assert_eq!(apply_input(&year, "NaN"), json!(""));
    }

    #[test]
    fn update_field_leaves_the_original_untouched() {
        let draft = PolicyDraft {
            policy_number: "POL-9".into(),
            custom_data: data(json!({"marca": "Ford"})),
            ..PolicyDraft::default()
        };

        let once = update_field(&draft, "modelo", json!("Focus"));
        let twice = update_field(&once, "modelo", json!("Focus"));

        assert_eq!(draft.custom_data, data(json!({"marca": "Ford"})));
        assert_eq!(once.custom_data, data(json!({"marca": "Ford", "modelo": "Focus"})));
        assert_eq!(once, twice);
        assert_eq!(once.policy_number, "POL-9");
    }

    #[test]
    fn round_trip_without_edits_is_lossless() {
        let fields = vec![
            CustomFieldDefinition::new("a", "A", FieldType::Number),
            CustomFieldDefinition::new("b", "B", FieldType::Text),
        ];
        let stored = data(json!({"a": 1, "b": "x"}));

        let _ = render_form(&fields, &stored);
        let saved = validate_submission(&fields, &stored).unwrap();
        assert_eq!(Value::Object(saved), json!({"a": 1, "b": "x"}));
    }

    #[test]
    fn year_typed_as_text_is_stored_as_number() {
        let input = data(json!({
            "marca": "Ford", "modelo": "Focus", "año": "2020", "patente": "AB123CD"
        }));
        let saved = validate_submission(&auto_fields(), &input).unwrap();
        assert_eq!(saved["año"], json!(2020));
    }

    #[test]
    fn missing_required_field_is_reported_by_label() {
        let input = data(json!({"marca": "Ford", "modelo": "Focus", "año": 2020, "patente": "  "}));
        let issues = validate_submission(&auto_fields(), &input).unwrap_err();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "patente");
        assert_eq!(issues[0].label, "Patente");
        assert_eq!(issues[0].code, IssueCode::Required);
    }

    #[test]
    fn constraints_are_checked_on_submit() {
        let fields = vec![
            CustomFieldDefinition::new("año", "Año", FieldType::Number).with_bounds(Some(1900.0), Some(2100.0)),
            CustomFieldDefinition::new("tipo", "Tipo", FieldType::Select).with_options(&["Casa", "PH"]),
            CustomFieldDefinition::new("mail", "Mail", FieldType::Email),
            CustomFieldDefinition::new("patente", "Patente", FieldType::Text).with_pattern("[A-Z]{2}[0-9]{3}[A-Z]{2}"),
        ];
        let input = data(json!({"año": 1800, "tipo": "Castillo", "mail": "no-mail", "patente": "XAB123CD"}));

        let codes: Vec<IssueCode> = validate_submission(&fields, &input)
            .unwrap_err()
            .into_iter()
            .map(|i| i.code)
            .collect();
        assert_eq!(
            codes,
            vec![IssueCode::BelowMin, IssueCode::InvalidOption, IssueCode::InvalidEmail, IssueCode::PatternMismatch]
        );
    }

    #[test]
    fn empty_values_are_dropped_and_orphans_kept() {
        let fields = vec![
            CustomFieldDefinition::new("color", "Color", FieldType::Text),
            CustomFieldDefinition::new("salida", "Salida", FieldType::Date),
        ];
        let input = data(json!({"color": "", "salida": "2026-03-01", "viejo": 7}));

        let saved = validate_submission(&fields, &input).unwrap();
        assert_eq!(Value::Object(saved), json!({"salida": "2026-03-01", "viejo": 7}));
    }

    #[test]
    fn broken_pattern_does_not_block_submission() {
        let fields = vec![CustomFieldDefinition::new("x", "X", FieldType::Text).with_pattern("([")];
        assert!(validate_submission(&fields, &data(json!({"x": "algo"}))).is_ok());
    }

    #[test]
    fn field_list_authoring() {
        let fields = default_fields("Caución");
        let extra = CustomFieldDefinition::new("notas", "Notas", FieldType::Textarea);

        let added = add_field(&fields, extra.clone());
        assert_eq!(added.len(), 3);
        assert_eq!(added[2], extra);

        assert_eq!(remove_field(&added, 0).len(), 2);
        assert_eq!(remove_field(&added, 10), added);

        assert_eq!(move_field(&added, 0, MoveDirection::Up), added);
        assert_eq!(move_field(&added, 2, MoveDirection::Down), added);
        assert_eq!(move_field(&added, 5, MoveDirection::Up), added);

        let moved = move_field(&added, 2, MoveDirection::Up);
        assert_eq!(moved[1].name, "notas");
        assert_eq!(moved[2].name, "valor_asegurado");
    }
}
