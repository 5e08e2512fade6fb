// src/models/policyholder.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

// Janela do aviso de aniversários (hoje + 7 dias)
pub const BIRTHDAY_WINDOW_DAYS: i64 = 7;

// Mapeia o CREATE TYPE policyholder_entity_type do banco
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "policyholder_entity_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    // Pessoa física
    #[default]
    Fisico,
    // Pessoa jurídica (empresa)
    Juridico,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Policyholder {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub entity_type: EntityKind,

    // Pessoa física
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    // Pessoa jurídica
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub legal_representative: Option<String>,

    pub dni: Option<String>,
    pub cuil_cuit: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "1985-07-14")]
    pub date_of_birth: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Policyholder {
    /// Nome para exibição: "Juan PÉREZ" para pessoas, razão social em maiúsculas para empresas.
    pub fn display_name(&self) -> String {
        match self.entity_type {
            EntityKind::Fisico => {
                let first = capitalize(self.first_name.as_deref().unwrap_or_default());
                let last = self.last_name.as_deref().unwrap_or_default().to_uppercase();
                format!("{} {}", first, last).trim().to_string()
            }
            EntityKind::Juridico => match self.business_name.as_deref().filter(|n| !n.is_empty()) {
                Some(name) => name.to_uppercase(),
                None => "Sin nombre".to_string(),
            },
        }
    }

    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let raw_name = match self.entity_type {
            EntityKind::Fisico => format!(
                "{} {}",
                self.first_name.as_deref().unwrap_or_default(),
                self.last_name.as_deref().unwrap_or_default()
            ),
            EntityKind::Juridico => self.business_name.clone().unwrap_or_default(),
        };
        [
            Some(raw_name.as_str()),
            self.email.as_deref(),
            self.dni.as_deref(),
            self.cuil_cuit.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&term))
    }

    // Chave de ordenação da listagem
    pub fn sort_key(&self) -> String {
        match self.entity_type {
            EntityKind::Fisico => self.first_name.clone().unwrap_or_default().to_lowercase(),
            EntityKind::Juridico => self.business_name.clone().unwrap_or_default().to_lowercase(),
        }
    }
}

/// Filtros da listagem de asegurados.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyholderFilter {
    pub search: Option<String>,
    pub entity_type: Option<EntityKind>,
}

impl PolicyholderFilter {
    pub fn matches(&self, holder: &Policyholder) -> bool {
        self.entity_type.map_or(true, |kind| holder.entity_type == kind)
            && self.search.as_deref().map_or(true, |term| holder.matches_search(term))
    }
}

/// Nome formatado de um asegurado opcional (apólices órfãs mostram "Sin asegurado").
pub fn holder_display_name(holder: Option<&Policyholder>) -> String {
    holder
        .map(Policyholder::display_name)
        .unwrap_or_else(|| "Sin asegurado".to_string())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

// --- ANIVERSÁRIOS ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BirthdayEntry {
    pub policyholder_id: Uuid,
    pub name: String,
    #[schema(value_type = String, format = Date)]
    pub date_of_birth: NaiveDate,
    pub days_until: i64,
    pub phone: Option<String>,
    pub whatsapp_url: Option<String>,
}

/// Dias até o próximo aniversário (0 = hoje). 29/02 vira 28/02 em anos não bissextos.
pub fn days_until_birthday(date_of_birth: NaiveDate, today: NaiveDate) -> i64 {
    let this_year = birthday_in(date_of_birth, today.year());
    let next = if this_year < today {
        birthday_in(date_of_birth, today.year() + 1)
    } else {
        this_year
    };
    (next - today).num_days()
}

fn birthday_in(date_of_birth: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, date_of_birth.month(), date_of_birth.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date_of_birth.month(), 28))
        .unwrap_or(date_of_birth)
}

/// Pessoas físicas com aniversário entre hoje e os próximos 7 dias, do mais próximo ao mais distante.
pub fn upcoming_birthdays(holders: &[Policyholder], today: NaiveDate) -> Vec<BirthdayEntry> {
    let mut entries: Vec<BirthdayEntry> = holders
        .iter()
        .filter(|h| h.entity_type == EntityKind::Fisico)
        .filter_map(|h| {
            let dob = h.date_of_birth?;
            let days_until = days_until_birthday(dob, today);
            (days_until <= BIRTHDAY_WINDOW_DAYS).then(|| BirthdayEntry {
                policyholder_id: h.id,
                name: h.display_name(),
                date_of_birth: dob,
                days_until,
                phone: h.phone.clone(),
                whatsapp_url: h.phone.as_deref().and_then(whatsapp_url),
            })
        })
        .collect();
    entries.sort_by_key(|e| e.days_until);
    entries
}

// --- WHATSAPP ---

/// Só dígitos; números de 10 dígitos sem o 54 recebem o código da Argentina.
pub fn whatsapp_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    if digits.len() == 10 && !digits.starts_with("54") {
        return Some(format!("54{}", digits));
    }
    Some(digits)
}

pub fn whatsapp_url(phone: &str) -> Option<String> {
    whatsapp_phone(phone).map(|p| format!("https://wa.me/{}", p))
}

// --- ENTRADA (criação/edição) ---

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyholderInput {
    #[serde(default)]
    pub entity_type: EntityKind,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub legal_representative: Option<String>,
    pub dni: Option<String>,
    pub cuil_cuit: Option<String>,

    #[validate(email(message = "email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<NaiveDate>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl PolicyholderInput {
    /// Strings vazias viram NULL e as colunas da outra natureza são limpas.
    pub fn normalized(self) -> Self {
        let mut input = Self {
            entity_type: self.entity_type,
            first_name: blank_to_none(self.first_name),
            last_name: blank_to_none(self.last_name),
            business_name: blank_to_none(self.business_name),
            business_type: blank_to_none(self.business_type),
            legal_representative: blank_to_none(self.legal_representative),
            dni: blank_to_none(self.dni),
            cuil_cuit: blank_to_none(self.cuil_cuit),
            email: blank_to_none(self.email),
            phone: blank_to_none(self.phone),
            address: blank_to_none(self.address),
            city: blank_to_none(self.city),
            state: blank_to_none(self.state),
            postal_code: blank_to_none(self.postal_code),
            date_of_birth: self.date_of_birth,
        };

        match input.entity_type {
            EntityKind::Fisico => {
                input.business_name = None;
                input.business_type = None;
                input.legal_representative = None;
            }
            EntityKind::Juridico => {
                input.first_name = None;
                input.last_name = None;
                input.dni = None;
                input.date_of_birth = None;
            }
        }
        input
    }

    /// Pessoa exige nome e sobrenome; empresa exige razão social.
    pub fn validate_identity(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.add_identity_errors(&mut errors);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Acrescenta os erros de identidade a um conjunto já existente.
    pub fn add_identity_errors(&self, errors: &mut ValidationErrors) {
        let required: &[(&'static str, &Option<String>)] = match self.entity_type {
            EntityKind::Fisico => &[("first_name", &self.first_name), ("last_name", &self.last_name)],
            EntityKind::Juridico => &[("business_name", &self.business_name)],
        };

        for (field, value) in required {
            if value.is_none() {
                let mut err = ValidationError::new("required");
                err.message = Some("required".into());
                errors.add(*field, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(first: &str, last: &str, dob: Option<NaiveDate>) -> Policyholder {
        Policyholder {
            id: Uuid::new_v4(),
            agent_id: Uuid::new_v4(),
            entity_type: EntityKind::Fisico,
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            business_name: None,
            business_type: None,
            legal_representative: None,
            dni: Some("30111222".into()),
            cuil_cuit: None,
            email: None,
            phone: Some("(11) 5555-1234".into()),
            address: None,
            city: None,
            state: None,
            postal_code: None,
            date_of_birth: dob,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_person_and_business_names() {
        assert_eq!(person("jUAN", "pérez", None).display_name(), "Juan PÉREZ");

        let mut company = person("", "", None);
        company.entity_type = EntityKind::Juridico;
        assert_eq!(company.display_name(), "Sin nombre");
        company.business_name = Some("Acme s.a.".into());
        assert_eq!(company.display_name(), "ACME S.A.");

        assert_eq!(holder_display_name(None), "Sin asegurado");
    }

    #[test]
    fn search_covers_name_and_documents() {
        let holder = person("Ana", "Gómez", None);
        assert!(holder.matches_search("ana gó"));
        assert!(holder.matches_search("30111"));
        assert!(!holder.matches_search("carlos"));
    }

    #[test]
    fn birthday_countdown_wraps_to_next_year() {
        let today = date(2026, 12, 30);
        assert_eq!(days_until_birthday(date(1990, 12, 30), today), 0);
        assert_eq!(days_until_birthday(date(1990, 1, 2), today), 3);
        assert_eq!(days_until_birthday(date(1992, 2, 29), date(2027, 2, 27)), 1);
    }

    #[test]
    fn only_persons_within_a_week_are_listed() {
        let today = date(2026, 6, 1);
        let mut business = person("", "", Some(date(1980, 6, 2)));
        business.entity_type = EntityKind::Juridico;

        let holders = vec![
            person("Late", "Guy", Some(date(1980, 6, 9))),
            person("Soon", "Guy", Some(date(1980, 6, 3))),
            person("Far", "Guy", Some(date(1980, 7, 1))),
            person("No", "Date", None),
            business,
        ];

        let entries = upcoming_birthdays(&holders, today);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Soon GUY"]);
        assert_eq!(entries[0].whatsapp_url.as_deref(), Some("https://wa.me/541155551234"));
    }

    #[test]
    fn business_input_drops_person_columns() {
        let input = PolicyholderInput {
            entity_type: EntityKind::Juridico,
            first_name: Some("Juan".into()),
            dni: Some("123".into()),
            business_name: Some("  Acme SA ".into()),
            email: Some("   ".into()),
            date_of_birth: Some(date(1990, 1, 1)),
            ..Default::default()
        }
        .normalized();

        assert_eq!(input.first_name, None);
        assert_eq!(input.dni, None);
        assert_eq!(input.date_of_birth, None);
        assert_eq!(input.email, None);
        assert_eq!(input.business_name.as_deref(), Some("Acme SA"));
        assert!(input.validate_identity().is_ok());
    }

    #[test]
    fn person_needs_first_and_last_name() {
        let input = PolicyholderInput {
            first_name: Some("Ana".into()),
            ..Default::default()
        }
        .normalized();
        let errors = input.validate_identity().unwrap_err();
        assert!(errors.field_errors().contains_key("last_name"));
    }

    #[test]
    fn whatsapp_numbers_are_normalised() {
        assert_eq!(whatsapp_phone("11 5555-1234").as_deref(), Some("541155551234"));
        assert_eq!(whatsapp_phone("+54 9 11 5555 1234").as_deref(), Some("5491155551234"));
        assert_eq!(whatsapp_phone("sin teléfono"), None);
    }
}
