// src/services/catalog_service.rs

use std::collections::HashMap;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, CurrencyRepository},
    models::{
        company::{CompanyInput, CompanyListEntry, CoverageType, CoverageTypeInput, InsuranceCompany},
        currency::{Currency, CurrencyInput, CurrencyPreset, COMMON_CURRENCIES},
    },
};

fn not_found(resource: &str) -> AppError {
    AppError::ResourceNotFound(resource.to_string())
}

/// Companhias filtradas pela busca, cada uma com quantas coberturas tem.
pub fn company_entries(
    companies: Vec<InsuranceCompany>,
    coverages: &[CoverageType],
    search: Option<&str>,
) -> Vec<CompanyListEntry> {
    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    for coverage in coverages {
        *counts.entry(coverage.company_id).or_default() += 1;
    }

    companies
        .into_iter()
        .filter(|c| search.map_or(true, |term| c.matches_search(term)))
        .map(|company| {
            let coverage_count = counts.get(&company.id).copied().unwrap_or(0);
            CompanyListEntry { company, coverage_count }
        })
        .collect()
}

/// Coberturas de uma companhia e/ou de um tipo de apólice (nome sem diferenciar maiúsculas).
pub fn filter_coverages(
    coverages: Vec<CoverageType>,
    company_id: Option<Uuid>,
    policy_type: Option<&str>,
) -> Vec<CoverageType> {
    coverages
        .into_iter()
        .filter(|c| company_id.map_or(true, |id| c.company_id == id))
        .filter(|c| {
            policy_type
                .filter(|name| !name.trim().is_empty())
                .map_or(true, |name| c.applies_to(name))
        })
        .collect()
}

/// Companhias, coberturas e moedas: os catálogos que alimentam o editor de apólices.
#[derive(Clone)]
pub struct CatalogService {
    company_repo: CompanyRepository,
    currency_repo: CurrencyRepository,
}

impl CatalogService {
    pub fn new(company_repo: CompanyRepository, currency_repo: CurrencyRepository) -> Self {
        Self {
            company_repo,
            currency_repo,
        }
    }

    // =========================================================================
    //  COMPANHIAS
    // =========================================================================

    pub async fn list_companies(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<CompanyListEntry>, AppError> {
        let companies = self.company_repo.list_companies(&mut *conn, agent_id).await?;
        let coverages = self.company_repo.list_coverage_types(&mut *conn, agent_id).await?;
        Ok(company_entries(companies, &coverages, search))
    }

    pub async fn get_company(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<InsuranceCompany, AppError> {
        self.company_repo
            .find_company(&mut *conn, agent_id, id)
            .await?
            .ok_or_else(|| not_found("company"))
    }

    pub async fn create_company(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        input: &CompanyInput,
    ) -> Result<InsuranceCompany, AppError> {
        let company = self.company_repo.create_company(&mut *conn, agent_id, input).await?;
        tracing::info!("Companhia '{}' cadastrada", company.name);
        Ok(company)
    }

    pub async fn update_company(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        input: &CompanyInput,
    ) -> Result<InsuranceCompany, AppError> {
        self.company_repo
            .update_company(&mut *conn, agent_id, id, input)
            .await?
            .ok_or_else(|| not_found("company"))
    }

    pub async fn toggle_company(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<InsuranceCompany, AppError> {
        self.company_repo
            .toggle_company_active(&mut *conn, agent_id, id)
            .await?
            .ok_or_else(|| not_found("company"))
    }

    /// As coberturas caem junto (ON DELETE CASCADE); as apólices ficam com o nome.
    pub async fn delete_company(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.company_repo.delete_company(&mut *conn, agent_id, id).await? {
            return Err(not_found("company"));
        }
        tracing::info!("Companhia {} removida", id);
        Ok(())
    }

    // =========================================================================
    //  COBERTURAS
    // =========================================================================

    pub async fn list_coverage_types(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        company_id: Option<Uuid>,
        policy_type: Option<&str>,
    ) -> Result<Vec<CoverageType>, AppError> {
        let coverages = self.company_repo.list_coverage_types(&mut *conn, agent_id).await?;
        Ok(filter_coverages(coverages, company_id, policy_type))
    }

    pub async fn create_coverage_type(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        input: &CoverageTypeInput,
    ) -> Result<CoverageType, AppError> {
        // A companhia precisa ser do mesmo agente
        self.get_company(&mut *conn, agent_id, input.company_id).await?;
        self.company_repo.create_coverage_type(&mut *conn, agent_id, input).await
    }

    pub async fn update_coverage_type(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        input: &CoverageTypeInput,
    ) -> Result<CoverageType, AppError> {
        self.get_company(&mut *conn, agent_id, input.company_id).await?;
        self.company_repo
            .update_coverage_type(&mut *conn, agent_id, id, input)
            .await?
            .ok_or_else(|| not_found("coverage_type"))
    }

    pub async fn delete_coverage_type(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError> {
        if !self.company_repo.delete_coverage_type(&mut *conn, agent_id, id).await? {
            return Err(not_found("coverage_type"));
        }
        Ok(())
    }

    // =========================================================================
    //  MOEDAS
    // =========================================================================

    pub async fn list_currencies(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Currency>, AppError> {
        let currencies = self.currency_repo.list(&mut *conn, agent_id).await?;
        Ok(match search {
            Some(term) => currencies.into_iter().filter(|c| c.matches_search(term)).collect(),
            None => currencies,
        })
    }

    pub async fn create_currency(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        input: &CurrencyInput,
    ) -> Result<Currency, AppError> {
        let currency = self.currency_repo.create(&mut *conn, agent_id, input).await?;
        tracing::info!("Moeda {} cadastrada", currency.code);
        Ok(currency)
    }

    pub async fn update_currency(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        input: &CurrencyInput,
    ) -> Result<Currency, AppError> {
        self.currency_repo
            .update(&mut *conn, agent_id, id, input)
            .await?
            .ok_or_else(|| not_found("currency"))
    }

    pub async fn toggle_currency(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<Currency, AppError> {
        self.currency_repo
            .toggle_active(&mut *conn, agent_id, id)
            .await?
            .ok_or_else(|| not_found("currency"))
    }

    pub async fn delete_currency(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.currency_repo.delete(&mut *conn, agent_id, id).await? {
            return Err(not_found("currency"));
        }
        Ok(())
    }

    pub fn currency_presets(&self) -> &'static [CurrencyPreset] {
        &COMMON_CURRENCIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn company(name: &str, description: Option<&str>) -> InsuranceCompany {
        InsuranceCompany {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            name: name.into(),
            description: description.map(str::to_string),
            contact_email: None,
            contact_phone: None,
            website: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn coverage(company_id: Uuid, name: &str, policy_type: &str) -> CoverageType {
        CoverageType {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            company_id,
            name: name.into(),
            description: None,
            policy_type: policy_type.into(),
            base_premium: None,
            currency_code: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn company_entries_count_coverages_and_filter_by_search() {
        let acme = company("Acme Seguros", None);
        let sur = company("La Sur", Some("Especialista en hogar"));
        let coverages = vec![
            coverage(acme.id, "Todo Riesgo", "Auto"),
            coverage(acme.id, "Terceros", "Auto"),
            coverage(sur.id, "Incendio", "Hogar"),
        ];

        let all = company_entries(vec![acme.clone(), sur.clone()], &coverages, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].coverage_count, 2);
        assert_eq!(all[1].coverage_count, 1);

        let hits = company_entries(vec![acme, sur], &coverages, Some("HOGAR"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].company.name, "La Sur");
    }

    #[test]
    fn company_without_coverages_counts_zero() {
        let entries = company_entries(vec![company("Nueva", None)], &[], None);
        assert_eq!(entries[0].coverage_count, 0);
    }

    #[test]
    fn coverages_filter_by_company_and_type_name() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let coverages = vec![
            coverage(a, "Todo Riesgo", "Auto"),
            coverage(a, "Incendio", "Hogar"),
            coverage(b, "Terceros", "auto "),
        ];

        let auto = filter_coverages(coverages.clone(), None, Some("AUTO"));
        assert_eq!(auto.len(), 2);

        let only_a = filter_coverages(coverages.clone(), Some(a), Some("auto"));
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].name, "Todo Riesgo");

        // Nome vazio não filtra
        assert_eq!(filter_coverages(coverages, Some(a), Some("  ")).len(), 2);
    }
}
