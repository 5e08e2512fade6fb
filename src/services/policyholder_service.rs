// src/services/policyholder_service.rs

use chrono::NaiveDate;
use sqlx::PgConnection;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    common::error::AppError,
    db::PolicyholderRepository,
    models::policyholder::{
        upcoming_birthdays, BirthdayEntry, Policyholder, PolicyholderFilter, PolicyholderInput,
    },
};

fn not_found() -> AppError {
    AppError::ResourceNotFound("policyholder".into())
}

/// Normaliza a entrada e aplica as regras de formato e de identidade juntas.
pub fn prepare_input(input: PolicyholderInput) -> Result<PolicyholderInput, AppError> {
    let input = input.normalized();

    let mut errors = input.validate().err().unwrap_or_else(ValidationErrors::new);
    input.add_identity_errors(&mut errors);

    if errors.is_empty() {
        Ok(input)
    } else {
        Err(AppError::ValidationError(errors))
    }
}

/// Aplica o filtro e ordena por nome (ou razão social).
pub fn filter_and_sort(holders: Vec<Policyholder>, filter: &PolicyholderFilter) -> Vec<Policyholder> {
    let mut holders: Vec<Policyholder> = holders.into_iter().filter(|h| filter.matches(h)).collect();
    holders.sort_by_cached_key(Policyholder::sort_key);
    holders
}

#[derive(Clone)]
pub struct PolicyholderService {
    repo: PolicyholderRepository,
}

impl PolicyholderService {
    pub fn new(repo: PolicyholderRepository) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        filter: &PolicyholderFilter,
    ) -> Result<Vec<Policyholder>, AppError> {
        let holders = self.repo.list(&mut *conn, agent_id).await?;
        Ok(filter_and_sort(holders, filter))
    }

    pub async fn get(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<Policyholder, AppError> {
        self.repo
            .find_by_id(&mut *conn, agent_id, id)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        input: PolicyholderInput,
    ) -> Result<Policyholder, AppError> {
        let input = prepare_input(input)?;
        let holder = self.repo.create(&mut *conn, agent_id, &input).await?;
        tracing::info!("Asegurado {} cadastrado ({:?})", holder.id, holder.entity_type);
        Ok(holder)
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        id: Uuid,
        input: PolicyholderInput,
    ) -> Result<Policyholder, AppError> {
        let input = prepare_input(input)?;
        self.repo
            .update(&mut *conn, agent_id, id, &input)
            .await?
            .ok_or_else(not_found)
    }

    /// Remove o asegurado e, em cascata, as apólices dele.
    pub async fn delete(&self, conn: &mut PgConnection, agent_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&mut *conn, agent_id, id).await? {
            return Err(not_found());
        }
        tracing::info!("Asegurado {} removido", id);
        Ok(())
    }

    pub async fn birthdays(
        &self,
        conn: &mut PgConnection,
        agent_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<BirthdayEntry>, AppError> {
        let holders = self.repo.list(&mut *conn, agent_id).await?;
        Ok(upcoming_birthdays(&holders, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::policyholder::EntityKind;
    use chrono::Utc;

    fn holder(kind: EntityKind, first: Option<&str>, business: Option<&str>) -> Policyholder {
        Policyholder {
            id: Uuid::new_v4(),
            agent_id: Uuid::nil(),
            entity_type: kind,
            first_name: first.map(str::to_string),
            last_name: first.map(|_| "Pérez".to_string()),
            business_name: business.map(str::to_string),
            business_type: None,
            legal_representative: None,
            dni: None,
            cuil_cuit: None,
            email: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            postal_code: None,
            date_of_birth: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn person_without_last_name_is_rejected_with_format_errors_together() {
        let input = PolicyholderInput {
            first_name: Some("Juan".into()),
            last_name: Some("   ".into()),
            email: Some("no-es-un-email".into()),
            ..PolicyholderInput::default()
        };

        match prepare_input(input) {
            Err(AppError::ValidationError(errors)) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("email"));
                assert!(fields.contains_key("last_name"));
            }
            other => panic!("esperava erro de validação, veio {:?}", other.map(|i| i.first_name)),
        }
    }

    #[test]
    fn business_input_drops_person_columns() {
        let input = PolicyholderInput {
            entity_type: EntityKind::Juridico,
            first_name: Some("Juan".into()),
            business_name: Some(" Acme SA ".into()),
            ..PolicyholderInput::default()
        };

        let prepared = prepare_input(input).unwrap();
        assert_eq!(prepared.first_name, None);
        assert_eq!(prepared.business_name.as_deref(), Some("Acme SA"));
    }

    #[test]
    fn list_filters_by_kind_and_sorts_by_name() {
        let holders = vec![
            holder(EntityKind::Fisico, Some("zoe"), None),
            holder(EntityKind::Juridico, None, Some("Acme")),
            holder(EntityKind::Fisico, Some("Ana"), None),
        ];

        let all = filter_and_sort(holders.clone(), &PolicyholderFilter::default());
        let names: Vec<String> = all.iter().map(Policyholder::display_name).collect();
        assert_eq!(names, vec!["ACME", "Ana PÉREZ", "Zoe PÉREZ"]);

        let people = filter_and_sort(
            holders,
            &PolicyholderFilter {
                search: None,
                entity_type: Some(EntityKind::Fisico),
            },
        );
        assert_eq!(people.len(), 2);
    }
}
