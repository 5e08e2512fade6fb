// src/db/company_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::company::{CompanyInput, CoverageType, CoverageTypeInput, InsuranceCompany},
};

// Companhias e suas coberturas: a cobertura não existe sem a companhia
#[derive(Clone, Default)]
pub struct CompanyRepository;

impl CompanyRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  COMPANHIAS
    // =========================================================================

    pub async fn list_companies<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
    ) -> Result<Vec<InsuranceCompany>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let companies = sqlx::query_as::<_, InsuranceCompany>(
            "SELECT * FROM insurance_companies WHERE agent_id = $1 ORDER BY name ASC",
        )
        .bind(agent_id)
        .fetch_all(executor)
        .await?;

        Ok(companies)
    }

    pub async fn find_company<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<Option<InsuranceCompany>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, InsuranceCompany>(
            "SELECT * FROM insurance_companies WHERE agent_id = $1 AND id = $2",
        )
        .bind(agent_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(company)
    }

    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        input: &CompanyInput,
    ) -> Result<InsuranceCompany, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InsuranceCompany>(
            r#"
            INSERT INTO insurance_companies
                (agent_id, name, description, contact_email, contact_phone, website, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.contact_email.as_deref())
        .bind(input.contact_phone.as_deref())
        .bind(input.website.as_deref())
        .bind(input.is_active)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "company_name"))
    }

    pub async fn update_company<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
        input: &CompanyInput,
    ) -> Result<Option<InsuranceCompany>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InsuranceCompany>(
            r#"
            UPDATE insurance_companies
            SET name = $3, description = $4, contact_email = $5, contact_phone = $6,
                website = $7, is_active = $8
            WHERE agent_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(id)
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.contact_email.as_deref())
        .bind(input.contact_phone.as_deref())
        .bind(input.website.as_deref())
        .bind(input.is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "company_name"))
    }

    pub async fn toggle_company_active<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<Option<InsuranceCompany>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, InsuranceCompany>(
            r#"
            UPDATE insurance_companies SET is_active = NOT is_active
            WHERE agent_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(company)
    }

    /// Leva junto as coberturas (CASCADE); as apólices ficam com company_id = NULL.
    pub async fn delete_company<'e, E>(&self, executor: E, agent_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM insurance_companies WHERE agent_id = $1 AND id = $2")
            .bind(agent_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  COBERTURAS
    // =========================================================================

    pub async fn list_coverage_types<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
    ) -> Result<Vec<CoverageType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let coverages = sqlx::query_as::<_, CoverageType>(
            "SELECT * FROM coverage_types WHERE agent_id = $1 ORDER BY name ASC",
        )
        .bind(agent_id)
        .fetch_all(executor)
        .await?;

        Ok(coverages)
    }

    pub async fn find_coverage_type<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CoverageType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let coverage = sqlx::query_as::<_, CoverageType>(
            "SELECT * FROM coverage_types WHERE agent_id = $1 AND id = $2",
        )
        .bind(agent_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(coverage)
    }

    pub async fn create_coverage_type<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        input: &CoverageTypeInput,
    ) -> Result<CoverageType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let coverage = sqlx::query_as::<_, CoverageType>(
            r#"
            INSERT INTO coverage_types
                (agent_id, company_id, name, description, policy_type, base_premium, currency_code, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(input.company_id)
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.policy_type.trim())
        .bind(input.base_premium)
        .bind(input.currency_code.as_deref())
        .bind(input.is_active)
        .fetch_one(executor)
        .await?;

        Ok(coverage)
    }

    pub async fn update_coverage_type<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
        input: &CoverageTypeInput,
    ) -> Result<Option<CoverageType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let coverage = sqlx::query_as::<_, CoverageType>(
            r#"
            UPDATE coverage_types
            SET company_id = $3, name = $4, description = $5, policy_type = $6,
                base_premium = $7, currency_code = $8, is_active = $9
            WHERE agent_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(id)
        .bind(input.company_id)
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.policy_type.trim())
        .bind(input.base_premium)
        .bind(input.currency_code.as_deref())
        .bind(input.is_active)
        .fetch_optional(executor)
        .await?;

        Ok(coverage)
    }

    pub async fn delete_coverage_type<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM coverage_types WHERE agent_id = $1 AND id = $2")
            .bind(agent_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
