// src/services/policy_editor.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{
        company::{CoverageType, InsuranceCompany},
        custom_field::CustomFieldDefinition,
        policy::{PaymentFrequency, Policy, PolicyDraft, PolicyStatus},
        policy_type::PolicyType,
    },
    services::form_binder::{self, FieldControl},
};

/// O estado do editor de apólices: o rascunho + os campos personalizados ativos.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    // None = apólice nova
    #[serde(default)]
    pub policy_id: Option<Uuid>,

    #[serde(default)]
    pub draft: PolicyDraft,

    // Cópia do schema do tipo selecionado, na ordem de exibição
    #[serde(default)]
    pub active_fields: Vec<CustomFieldDefinition>,
}

impl EditorState {
    /// Editor aberto sobre uma apólice gravada. Se o tipo foi apagado, não há campos ativos.
    pub fn for_policy(policy: &Policy, policy_type: Option<&PolicyType>) -> Self {
        if policy.policy_type_id.is_some() && policy_type.is_none() {
            tracing::warn!(
                "Apólice {} aponta para um tipo que não existe mais; campos personalizados ocultos",
                policy.id
            );
        }

        Self {
            policy_id: Some(policy.id),
            draft: PolicyDraft::from_policy(policy),
            active_fields: policy_type.map(|t| t.custom_fields.clone()).unwrap_or_default(),
        }
    }
}

// Campos "fixos" do formulário; só os presentes são alterados
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseFieldsPatch {
    pub policy_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub premium_amount: Option<Decimal>,
    pub currency_code: Option<String>,
    pub payment_frequency: Option<PaymentFrequency>,
    pub status: Option<PolicyStatus>,
}

/// Uma interação do usuário com o formulário.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorAction {
    SelectPolicyType { id: Option<Uuid> },
    SelectCompany { id: Option<Uuid> },
    SelectCoverageType { id: Option<Uuid> },
    SelectPolicyholder { id: Option<Uuid> },
    SetManualCompany { name: String },
    // Texto cru digitado num campo personalizado
    SetCustomField { name: String, value: String },
    SetBaseFields(BaseFieldsPatch),
}

/// Os catálogos do agente que as seleções consultam.
#[derive(Debug, Clone, Default)]
pub struct EditorCatalog {
    pub policy_types: Vec<PolicyType>,
    pub companies: Vec<InsuranceCompany>,
    pub coverage_types: Vec<CoverageType>,
}

// =============================================================================
//  O REDUTOR: (estado, ação) -> estado
// =============================================================================

pub fn reduce(state: &EditorState, action: EditorAction, catalog: &EditorCatalog) -> EditorState {
    let mut next = state.clone();
    let draft = &mut next.draft;

    match action {
        EditorAction::SelectPolicyType { id } => {
            // Troca destrutiva: valores do tipo anterior são descartados, não mesclados
            let selected = id.and_then(|id| catalog.policy_types.iter().find(|t| t.id == id));
            draft.coverage_type_id = None;
            draft.custom_data = Map::new();
            match selected {
                Some(policy_type) => {
                    draft.policy_type_id = Some(policy_type.id);
                    draft.policy_type = policy_type.name.clone();
                    next.active_fields = policy_type.custom_fields.clone();
                }
                None => {
                    draft.policy_type_id = None;
                    draft.policy_type = String::new();
                    next.active_fields = Vec::new();
                }
            }
        }
        EditorAction::SelectCompany { id } => {
            let selected = id.and_then(|id| catalog.companies.iter().find(|c| c.id == id));
            // Coberturas pertencem a uma companhia
            draft.coverage_type_id = None;
            match selected {
                Some(company) => {
                    draft.company_id = Some(company.id);
                    draft.insurance_company = company.name.clone();
                }
                None => {
                    draft.company_id = None;
                    draft.insurance_company = String::new();
                }
            }
        }
        EditorAction::SelectCoverageType { id } => {
            match id.and_then(|id| catalog.coverage_types.iter().find(|c| c.id == id)) {
                Some(coverage) => {
                    draft.coverage_type_id = Some(coverage.id);
                    // Sugestões da cobertura; o usuário pode sobrescrever depois
                    if let Some(premium) = coverage.base_premium {
                        draft.premium_amount = premium;
                    }
                    if let Some(code) = coverage.currency_code.as_deref().filter(|c| !c.is_empty()) {
                        draft.currency_code = code.to_string();
                    }
                }
                None => draft.coverage_type_id = None,
            }
        }
        EditorAction::SelectPolicyholder { id } => draft.policyholder_id = id,
        EditorAction::SetManualCompany { name } => draft.insurance_company = name,
        EditorAction::SetCustomField { name, value } => {
            let stored = match next.active_fields.iter().find(|f| f.name == name) {
                Some(field) => form_binder::apply_input(field, &value),
                None => Value::String(value),
            };
            next.draft = form_binder::update_field(&next.draft, &name, stored);
        }
        EditorAction::SetBaseFields(patch) => {
            if let Some(v) = patch.policy_number {
                draft.policy_number = v;
            }
            if let Some(v) = patch.start_date {
                draft.start_date = Some(v);
            }
            if let Some(v) = patch.end_date {
                draft.end_date = Some(v);
            }
            if let Some(v) = patch.premium_amount {
                draft.premium_amount = v;
            }
            if let Some(v) = patch.currency_code {
                draft.currency_code = v;
            }
            if let Some(v) = patch.payment_frequency {
                draft.payment_frequency = v;
            }
            if let Some(v) = patch.status {
                draft.status = v;
            }
        }
    }

    next
}

/// Coberturas oferecidas: da companhia escolhida (ou todas) e do tipo escolhido (por nome).
pub fn available_coverage_types(state: &EditorState, catalog: &EditorCatalog) -> Vec<CoverageType> {
    let draft = &state.draft;
    if draft.policy_type.trim().is_empty() {
        return Vec::new();
    }

    catalog
        .coverage_types
        .iter()
        .filter(|c| draft.company_id.is_none_or(|company_id| c.company_id == company_id))
        .filter(|c| c.applies_to(&draft.policy_type))
        .cloned()
        .collect()
}

/// Sem companhia selecionada, o formulário mostra o campo de nome manual.
pub fn shows_manual_company(state: &EditorState) -> bool {
    state.draft.company_id.is_none()
}

/// O que o front-end recebe depois de cada ação.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub state: EditorState,
    pub controls: Vec<FieldControl>,
    // Vazio = o seletor de cobertura não aparece
    pub coverage_types: Vec<CoverageType>,
    pub show_manual_company: bool,
}

impl EditorView {
    pub fn build(state: EditorState, catalog: &EditorCatalog) -> Self {
        let controls = form_binder::render_form(&state.active_fields, &state.draft.custom_data);
        let coverage_types = available_coverage_types(&state, catalog);
        let show_manual_company = shows_manual_company(&state);
        Self {
            state,
            controls,
            coverage_types,
            show_manual_company,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::field_presets::default_fields;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn policy_type(name: &str, fields: Vec<CustomFieldDefinition>) -> PolicyType {
        PolicyType {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            name: name.into(),
            icon: "📋".into(),
            description: None,
            is_active: true,
            sort_order: 0,
            custom_fields: fields,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn company(name: &str) -> InsuranceCompany {
        InsuranceCompany {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            name: name.into(),
            description: None,
            contact_email: None,
            contact_phone: None,
            website: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn coverage(company_id: Uuid, name: &str, policy_type: &str, premium: Option<i64>, currency: Option<&str>) -> CoverageType {
        CoverageType {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            company_id,
            name: name.into(),
            description: None,
            policy_type: policy_type.into(),
            base_premium: premium.map(Decimal::from),
            currency_code: currency.map(str::to_string),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct Fixture {
        catalog: EditorCatalog,
        auto: Uuid,
        hogar: Uuid,
        acme: Uuid,
        other: Uuid,
        comprehensive: Uuid,
    }

    fn fixture() -> Fixture {
        let auto = policy_type("Auto", default_fields("Auto"));
        let hogar = policy_type("Hogar", default_fields("Hogar"));
        let acme = company("Acme");
        let other = company("Otra");
        let comprehensive = coverage(acme.id, "Comprehensive", "auto", Some(120), Some("USD"));
        let basic = coverage(other.id, "Básica", "Auto", None, None);
        let home = coverage(acme.id, "Incendio", "Hogar", Some(50), Some("ARS"));

        Fixture {
            auto: auto.id,
            hogar: hogar.id,
            acme: acme.id,
            other: other.id,
            comprehensive: comprehensive.id,
            catalog: EditorCatalog {
                policy_types: vec![auto, hogar],
                companies: vec![acme, other],
                coverage_types: vec![comprehensive, basic, home],
            },
        }
    }

    fn run(state: EditorState, actions: Vec<EditorAction>, catalog: &EditorCatalog) -> EditorState {
        actions.into_iter().fold(state, |s, a| reduce(&s, a, catalog))
    }

    #[test]
    fn selecting_a_type_replaces_fields_and_clears_values() {
        let fx = fixture();
        let state = run(
            EditorState::default(),
            vec![
                EditorAction::SelectPolicyType { id: Some(fx.auto) },
                EditorAction::SetCustomField { name: "marca".into(), value: "Ford".into() },
                EditorAction::SelectPolicyType { id: Some(fx.hogar) },
            ],
            &fx.catalog,
        );

        assert_eq!(state.draft.policy_type, "Hogar");
        assert!(state.draft.custom_data.is_empty());
        assert_eq!(state.active_fields, fx.catalog.policy_types[1].custom_fields);
    }

    #[test]
    fn clearing_the_type_clears_fields() {
        let fx = fixture();
        let state = run(
            EditorState::default(),
            vec![
                EditorAction::SelectPolicyType { id: Some(fx.auto) },
                EditorAction::SelectPolicyType { id: None },
            ],
            &fx.catalog,
        );
        assert_eq!(state.draft.policy_type_id, None);
        assert!(state.active_fields.is_empty());
    }

    #[test]
    fn coverage_fills_premium_and_currency() {
        let fx = fixture();
        let state = run(
            EditorState::default(),
            vec![
                EditorAction::SelectPolicyType { id: Some(fx.auto) },
                EditorAction::SelectCompany { id: Some(fx.acme) },
                EditorAction::SelectCoverageType { id: Some(fx.comprehensive) },
            ],
            &fx.catalog,
        );

        assert_eq!(state.draft.insurance_company, "Acme");
        assert_eq!(state.draft.coverage_type_id, Some(fx.comprehensive));
        assert_eq!(state.draft.premium_amount, Decimal::from(120));
        assert_eq!(state.draft.currency_code, "USD");
    }

    #[test]
    fn changing_company_or_type_clears_coverage() {
        let fx = fixture();
        let with_coverage = run(
            EditorState::default(),
            vec![
                EditorAction::SelectPolicyType { id: Some(fx.auto) },
                EditorAction::SelectCompany { id: Some(fx.acme) },
                EditorAction::SelectCoverageType { id: Some(fx.comprehensive) },
            ],
            &fx.catalog,
        );

        let other_company = reduce(&with_coverage, EditorAction::SelectCompany { id: Some(fx.other) }, &fx.catalog);
        assert_eq!(other_company.draft.coverage_type_id, None);

        let other_type = reduce(&with_coverage, EditorAction::SelectPolicyType { id: Some(fx.hogar) }, &fx.catalog);
        assert_eq!(other_type.draft.coverage_type_id, None);
        // Valores da cobertura continuam como o usuário deixou
        assert_eq!(other_type.draft.premium_amount, Decimal::from(120));
    }

    #[test]
    fn coverage_choices_intersect_company_and_type() {
        let fx = fixture();
        let auto_only = run(
            EditorState::default(),
            vec![EditorAction::SelectPolicyType { id: Some(fx.auto) }],
            &fx.catalog,
        );
        let names = |s: &EditorState| -> Vec<String> {
            available_coverage_types(s, &fx.catalog).into_iter().map(|c| c.name).collect()
        };

        // Sem companhia: todas as de Auto
        assert_eq!(names(&auto_only), vec!["Comprehensive", "Básica"]);

        let acme_auto = reduce(&auto_only, EditorAction::SelectCompany { id: Some(fx.acme) }, &fx.catalog);
        assert_eq!(names(&acme_auto), vec!["Comprehensive"]);

        // Sem tipo: nenhum seletor de cobertura
        assert!(names(&EditorState::default()).is_empty());
    }

    #[test]
    fn manual_company_only_without_selection() {
        let fx = fixture();
        let manual = reduce(
            &EditorState::default(),
            EditorAction::SetManualCompany { name: "La Caja".into() },
            &fx.catalog,
        );
        assert!(shows_manual_company(&manual));
        assert_eq!(manual.draft.insurance_company, "La Caja");

        let selected = reduce(&manual, EditorAction::SelectCompany { id: Some(fx.acme) }, &fx.catalog);
        assert!(!shows_manual_company(&selected));
        assert_eq!(selected.draft.insurance_company, "Acme");
    }

    #[test]
    fn custom_input_is_typed_by_the_active_field() {
        let fx = fixture();
        let state = run(
            EditorState::default(),
            vec![
                EditorAction::SelectPolicyType { id: Some(fx.auto) },
                EditorAction::SetCustomField { name: "año".into(), value: "2020".into() },
                EditorAction::SetCustomField { name: "extra".into(), value: "7".into() },
            ],
            &fx.catalog,
        );
        assert_eq!(state.draft.custom_data["año"], json!(2020));
        assert_eq!(state.draft.custom_data["extra"], json!("7"));
    }

    #[test]
    fn actions_deserialize_from_tagged_json() {
        let action: EditorAction = serde_json::from_value(json!({
            "type": "set_base_fields",
            "policyNumber": "POL-1",
            "premiumAmount": 99.5,
            "paymentFrequency": "anual"
        }))
        .unwrap();

        let state = reduce(&EditorState::default(), action, &EditorCatalog::default());
        assert_eq!(state.draft.policy_number, "POL-1");
        assert_eq!(state.draft.payment_frequency, PaymentFrequency::Anual);
        assert_eq!(state.draft.premium_amount, Decimal::new(995, 1));
    }

    #[test]
    fn view_renders_only_active_fields() {
        let fx = fixture();
        let mut state = reduce(
            &EditorState::default(),
            EditorAction::SelectPolicyType { id: Some(fx.hogar) },
            &fx.catalog,
        );
        state.draft.custom_data.insert("huérfano".into(), json!("x"));

        let view = EditorView::build(state, &fx.catalog);
        assert_eq!(view.controls.len(), 6);
        assert!(view.show_manual_company);
        assert_eq!(view.controls[1].kind, form_binder::ControlKind::Select);
        assert!(view.controls.iter().all(|c| c.name != "huérfano"));
    }
}
