// src/services/policy_service.rs

use std::collections::HashMap;

use sqlx::PgConnection;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{CompanyRepository, PolicyRepository, PolicyTypeRepository, PolicyholderRepository},
    models::{
        company::{CoverageType, InsuranceCompany},
        policy::{Policy, PolicyDraft, PolicyFilter, PolicyListEntry, PolicyRecord},
        policy_type::PolicyType,
        policyholder::{holder_display_name, Policyholder},
    },
    services::{
        form_binder,
        policy_editor::{self, EditorAction, EditorCatalog, EditorState, EditorView},
    },
};

fn not_found(resource: &str) -> AppError {
    AppError::ResourceNotFound(resource.to_string())
}

/// Junta cada apólice ao nome formatado do seu asegurado.
pub fn attach_holder_names(policies: Vec<Policy>, holders: &[Policyholder]) -> Vec<PolicyListEntry> {
    let by_id: HashMap<Uuid, &Policyholder> = holders.iter().map(|h| (h.id, h)).collect();
    policies
        .into_iter()
        .map(|policy| {
            let policyholder_name = holder_display_name(by_id.get(&policy.policyholder_id).copied());
            PolicyListEntry { policy, policyholder_name }
        })
        .collect()
}

/// Campos base: obrigatórios, prêmio não negativo, vencimento depois do início.
pub fn validate_base(draft: &PolicyDraft) -> Result<(), AppError> {
    let mut errors = draft.validate().err().unwrap_or_else(ValidationErrors::new);
    if let Err(e) = draft.validate_consistency() {
        errors.add("end_date", e);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

/// A cobertura escolhida tem que existir para o agente e pertencer à companhia selecionada.
///
/// `coverage` é a linha carregada para `draft.coverage_type_id`, se houver.
pub fn check_coverage(draft: &PolicyDraft, coverage: Option<&CoverageType>) -> Result<Option<Uuid>, AppError> {
    let Some(coverage_id) = draft.coverage_type_id else {
        return Ok(None);
    };
    let coverage = coverage
        .filter(|c| c.id == coverage_id)
        .ok_or_else(|| not_found("coverage_type"))?;

    if draft.company_id != Some(coverage.company_id) {
        let mut err = ValidationError::new("coverage_company");
        err.message = Some("coverage_company_mismatch".into());
        let mut errors = ValidationErrors::new();
        errors.add("coverage_type_id", err);
        return Err(AppError::ValidationError(errors));
    }
    Ok(Some(coverage.id))
}

/// Valida o rascunho inteiro e monta o registro a gravar. Nada aqui toca o banco.
///
/// `policy_type`, `company` e `coverage` são as linhas referenciadas pelo rascunho (já carregadas).
pub fn build_record(
    draft: &PolicyDraft,
    policy_type: Option<&PolicyType>,
    company: Option<&InsuranceCompany>,
    coverage: Option<&CoverageType>,
) -> Result<PolicyRecord, AppError> {
    validate_base(draft)?;
    let coverage_type_id = check_coverage(draft, coverage)?;

    // Campos personalizados contra o schema atual do tipo
    let fields = policy_type.map(|t| t.custom_fields.as_slice()).unwrap_or_default();
    let custom_data = form_binder::validate_submission(fields, &draft.custom_data)
        .map_err(AppError::CustomFieldValidation)?;

    // Garantidos pelo validate() acima
    let (Some(policyholder_id), Some(start_date), Some(end_date)) =
        (draft.policyholder_id, draft.start_date, draft.end_date)
    else {
        return Err(AppError::InternalServerError(anyhow::anyhow!(
            "rascunho validado sem asegurado ou datas"
        )));
    };

    Ok(PolicyRecord {
        policy_number: draft.policy_number.trim().to_string(),
        policyholder_id,
        policy_type: policy_type
            .map(|t| t.name.clone())
            .unwrap_or_else(|| draft.policy_type.trim().to_string()),
        policy_type_id: policy_type.map(|t| t.id),
        insurance_company: company
            .map(|c| c.name.clone())
            .unwrap_or_else(|| draft.insurance_company.trim().to_string()),
        company_id: company.map(|c| c.id),
        coverage_type_id,
        start_date,
        end_date,
        premium_amount: draft.premium_amount,
        currency_code: draft.normalized_currency(),
        payment_frequency: draft.payment_frequency,
        status: draft.status,
        custom_data: serde_json::Value::Object(custom_data),
    })
}

#[derive(Clone)]
pub struct PolicyService {
    policy_repo: PolicyRepository,
    policy_type_repo: PolicyTypeRepository,
    policyholder_repo: PolicyholderRepository,
    company_repo: CompanyRepository,
}

impl PolicyService {
    pub fn new(
        policy_repo: PolicyRepository,
        policy_type_repo: PolicyTypeRepository,
        policyholder_repo: PolicyholderRepository,
        company_repo: CompanyRepository,
    ) -> Self {
        Self {
            policy_repo,
            policy_type_repo,
            policyholder_repo,
            company_repo,
        }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        filter: &PolicyFilter,
    ) -> Result<Vec<PolicyListEntry>, AppError> {
        let policies = self.policy_repo.list(&mut *conn, agent_id).await?;
        let holders = self.policyholder_repo.list(&mut *conn, agent_id).await?;

        Ok(attach_holder_names(policies, &holders)
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect())
    }

    pub async fn get(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<Policy, AppError> {
        self.policy_repo
            .find_by_id(&mut *conn, agent_id, id)
            .await?
            .ok_or_else(|| not_found("policy"))
    }

    // =========================================================================
    //  EDITOR
    // =========================================================================

    pub async fn load_catalog(&self, conn: &mut PgConnection, agent_id: Uuid) -> Result<EditorCatalog, AppError> {
        Ok(EditorCatalog {
            policy_types: self.policy_type_repo.list(&mut *conn, agent_id).await?,
            companies: self.company_repo.list_companies(&mut *conn, agent_id).await?,
            coverage_types: self.company_repo.list_coverage_types(&mut *conn, agent_id).await?,
        })
    }

    pub async fn new_editor(&self, conn: &mut PgConnection, agent_id: Uuid) -> Result<EditorView, AppError> {
        let catalog = self.load_catalog(conn, agent_id).await?;
        Ok(EditorView::build(EditorState::default(), &catalog))
    }

    /// Editor sobre uma apólice gravada; os campos ativos vêm do schema atual do tipo.
    pub async fn editor_for(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<EditorView, AppError> {
        let policy = self.get(&mut *conn, agent_id, id).await?;
        let catalog = self.load_catalog(conn, agent_id).await?;
        let policy_type = policy
            .policy_type_id
            .and_then(|type_id| catalog.policy_types.iter().find(|t| t.id == type_id));

        let state = EditorState::for_policy(&policy, policy_type);
        Ok(EditorView::build(state, &catalog))
    }

    pub async fn apply_action(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        state: EditorState,
        action: EditorAction,
    ) -> Result<EditorView, AppError> {
        let catalog = self.load_catalog(conn, agent_id).await?;
        let next = policy_editor::reduce(&state, action, &catalog);
        Ok(EditorView::build(next, &catalog))
    }

    // =========================================================================
    //  ENVIO (registro inteiro, numa transação só)
    // =========================================================================

    pub async fn create(&self, conn: &mut PgConnection, agent_id: Uuid, draft: &PolicyDraft) -> Result<Policy, AppError> {
        let record = self.prepare(conn, agent_id, draft).await?;
        let policy = self.policy_repo.insert(&mut *conn, agent_id, &record).await?;
        tracing::info!("Apólice {} criada ({})", policy.policy_number, policy.id);
        Ok(policy)
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        draft: &PolicyDraft,
    ) -> Result<Policy, AppError> {
        let record = self.prepare(conn, agent_id, draft).await?;
        let policy = self
            .policy_repo
            .update(&mut *conn, agent_id, id, &record)
            .await?
            .ok_or_else(|| not_found("policy"))?;
        tracing::info!("Apólice {} atualizada", policy.policy_number);
        Ok(policy)
    }

    pub async fn delete(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.policy_repo.delete(&mut *conn, agent_id, id).await? {
            return Err(not_found("policy"));
        }
        tracing::info!("Apólice {} removida", id);
        Ok(())
    }

    /// Carrega as referências do rascunho e valida tudo antes de qualquer escrita.
    async fn prepare(&self, conn: &mut PgConnection, agent_id: Uuid, draft: &PolicyDraft) -> Result<PolicyRecord, AppError> {
        // Erro de formulário não custa ida ao banco
        validate_base(draft)?;

        if let Some(holder_id) = draft.policyholder_id {
            if self.policyholder_repo.find_by_id(&mut *conn, agent_id, holder_id).await?.is_none() {
                return Err(not_found("policyholder"));
            }
        }

        let policy_type = match draft.policy_type_id {
            Some(type_id) => Some(
                self.policy_type_repo
                    .find_by_id(&mut *conn, agent_id, type_id)
                    .await?
                    .ok_or_else(|| not_found("policy_type"))?,
            ),
            None => None,
        };

        let company = match draft.company_id {
            Some(company_id) => Some(
                self.company_repo
                    .find_company(&mut *conn, agent_id, company_id)
                    .await?
                    .ok_or_else(|| not_found("company"))?,
            ),
            None => None,
        };

        let coverage = match draft.coverage_type_id {
            Some(coverage_id) => Some(
                self.company_repo
                    .find_coverage_type(&mut *conn, agent_id, coverage_id)
                    .await?
                    .ok_or_else(|| not_found("coverage_type"))?,
            ),
            None => None,
        };

        build_record(draft, policy_type.as_ref(), company.as_ref(), coverage.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::i18n::I18nStore,
        middleware::i18n::Locale,
        models::policy::PolicyStatus,
        services::field_presets::default_fields,
    };
    use axum::http::StatusCode;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    fn auto_type() -> PolicyType {
        PolicyType {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            name: "Auto".into(),
            icon: "🚗".into(),
            description: None,
            is_active: true,
            sort_order: 0,
            custom_fields: default_fields("Auto"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn acme() -> InsuranceCompany {
        InsuranceCompany {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            name: "Acme".into(),
            description: None,
            contact_email: None,
            contact_phone: None,
            website: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn coverage_of(company: &InsuranceCompany) -> CoverageType {
        CoverageType {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            company_id: company.id,
            name: "Todo Riesgo".into(),
            description: None,
            policy_type: "Auto".into(),
            base_premium: None,
            currency_code: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn valid_draft(custom_data: serde_json::Value) -> PolicyDraft {
        PolicyDraft {
            policy_number: " POL-2026-7 ".into(),
            policyholder_id: Some(Uuid::new_v4()),
            policy_type: "auto viejo".into(),
            insurance_company: "Escrita a mano".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2027, 1, 1),
            premium_amount: Decimal::from(100),
            currency_code: "usd".into(),
            custom_data: custom_data.as_object().cloned().unwrap(),
            ..PolicyDraft::default()
        }
    }

    #[test]
    fn record_takes_names_from_selected_rows() {
        let policy_type = auto_type();
        let company = acme();
        let draft = valid_draft(json!({
            "marca": "Ford", "modelo": "Focus", "año": "2020", "patente": "AB123CD", "viejo": true
        }));

        let record = build_record(&draft, Some(&policy_type), Some(&company), None).unwrap();
        assert_eq!(record.policy_number, "POL-2026-7");
        assert_eq!(record.policy_type, "Auto");
        assert_eq!(record.policy_type_id, Some(policy_type.id));
        assert_eq!(record.insurance_company, "Acme");
        assert_eq!(record.currency_code, "USD");
        assert_eq!(record.status, PolicyStatus::Activa);
        assert_eq!(record.custom_data["año"], json!(2020));
        assert_eq!(record.custom_data["viejo"], json!(true));
    }

    #[test]
    fn manual_company_and_legacy_type_are_kept_without_selection() {
        let record = build_record(&valid_draft(json!({})), None, None, None).unwrap();
        assert_eq!(record.insurance_company, "Escrita a mano");
        assert_eq!(record.policy_type, "auto viejo");
        assert_eq!(record.company_id, None);
    }

    #[test]
    fn empty_required_field_blocks_submit_with_label() {
        let draft = valid_draft(json!({"marca": "Ford", "modelo": "Focus", "año": 2020}));
        let err = build_record(&draft, Some(&auto_type()), None, None).unwrap_err();

        let api = err.to_api_error(&Locale("es".into()), &I18nStore::load().unwrap());
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        let details = api.details.unwrap();
        assert_eq!(details[0]["field"], "patente");
        assert!(details[0]["message"].as_str().unwrap().contains("Patente"));
    }

    #[test]
    fn base_fields_fail_before_custom_fields() {
        let mut draft = valid_draft(json!({}));
        draft.end_date = NaiveDate::from_ymd_opt(2025, 1, 1);

        match build_record(&draft, Some(&auto_type()), None, None) {
            Err(AppError::ValidationError(errors)) => {
                assert!(errors.field_errors().contains_key("end_date"));
            }
            other => panic!("esperava erro de validação, veio {:?}", other.map(|r| r.policy_number)),
        }
    }

    #[test]
    fn coverage_of_selected_company_is_recorded() {
        let company = acme();
        let coverage = coverage_of(&company);
        let mut draft = valid_draft(json!({}));
        draft.company_id = Some(company.id);
        draft.coverage_type_id = Some(coverage.id);

        let record = build_record(&draft, None, Some(&company), Some(&coverage)).unwrap();
        assert_eq!(record.coverage_type_id, Some(coverage.id));
    }

    #[test]
    fn unknown_coverage_is_not_found() {
        let company = acme();
        let mut draft = valid_draft(json!({}));
        draft.company_id = Some(company.id);
        draft.coverage_type_id = Some(Uuid::new_v4());

        match build_record(&draft, None, Some(&company), None) {
            Err(AppError::ResourceNotFound(resource)) => assert_eq!(resource, "coverage_type"),
            other => panic!("esperava cobertura inexistente, veio {:?}", other.map(|r| r.coverage_type_id)),
        }
    }

    #[test]
    fn coverage_from_another_company_is_rejected() {
        let company = acme();
        let other_company = acme();
        let coverage = coverage_of(&other_company);
        let mut draft = valid_draft(json!({}));
        draft.company_id = Some(company.id);
        draft.coverage_type_id = Some(coverage.id);

        match build_record(&draft, None, Some(&company), Some(&coverage)) {
            Err(AppError::ValidationError(errors)) => {
                assert!(errors.field_errors().contains_key("coverage_type_id"));
            }
            other => panic!("esperava erro de cobertura, veio {:?}", other.map(|r| r.coverage_type_id)),
        }

        // Sem companhia selecionada também não vale
        draft.company_id = None;
        assert!(check_coverage(&draft, Some(&coverage)).is_err());
    }

    #[test]
    fn blank_policy_number_is_not_recorded() {
        let mut draft = valid_draft(json!({}));
        draft.policy_number = "   ".into();

        match build_record(&draft, None, None, None) {
            Err(AppError::ValidationError(errors)) => {
                assert!(errors.field_errors().contains_key("policy_number"));
            }
            other => panic!("esperava número obrigatório, veio {:?}", other.map(|r| r.policy_number)),
        }
    }

    #[test]
    fn list_entries_carry_holder_names() {
        let record = build_record(&valid_draft(json!({})), None, None, None).unwrap();
        let policy = Policy {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            policy_number: record.policy_number,
            policyholder_id: Uuid::new_v4(),
            policy_type: record.policy_type,
            policy_type_id: None,
            insurance_company: record.insurance_company,
            company_id: None,
            coverage_type_id: None,
            start_date: record.start_date,
            end_date: record.end_date,
            premium_amount: record.premium_amount,
            currency_code: record.currency_code,
            payment_frequency: record.payment_frequency,
            status: record.status,
            custom_data: record.custom_data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let entries = attach_holder_names(vec![policy], &[]);
        assert_eq!(entries[0].policyholder_name, "Sin asegurado");
    }
}
