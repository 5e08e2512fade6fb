// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LOCALE;

// Idiomas com catálogo em locales/
const SUPPORTED_LOCALES: [&str; 3] = ["es", "en", "pt"];

// O extrator de idioma
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    /// Primeiro idioma suportado do Accept-Language ("pt-BR" -> "pt"); senão espanhol.
    pub fn from_header(header_str: Option<&str>) -> Self {
        let lang = header_str
            .map(accept_language::parse)
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.split('-').next().unwrap_or(&tag).to_lowercase())
            .find(|lang| SUPPORTED_LOCALES.contains(&lang.as_str()))
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::from_header(header_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_header(Some("pt-BR,pt;q=0.9")).0, "pt");
        assert_eq!(Locale::from_header(Some("fr-FR, en;q=0.5")).0, "en");
    }

    #[test]
    fn falls_back_to_spanish() {
        assert_eq!(Locale::from_header(None).0, "es");
        assert_eq!(Locale::from_header(Some("de")).0, "es");
    }
}
