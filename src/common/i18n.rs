// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

// Idioma do produto: toda busca sem tradução cai aqui.
pub const DEFAULT_LOCALE: &str = "es";

// Os catálogos vão embutidos no binário
const CATALOGS: [(&str, &str); 3] = [
    ("es", include_str!("../../locales/es.json")),
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Catálogo de mensagens traduzidas, indexado por idioma e depois por chave
/// (ex: `"custom_field.required"`).
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut messages = HashMap::new();
        for (lang, raw) in CATALOGS {
            let catalog: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens '{}' inválido", lang))?;
            messages.insert(lang.to_string(), catalog);
        }
        Ok(Self { messages })
    }

    /// Traduz uma chave. Ordem de fallback: idioma pedido -> espanhol -> a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LOCALE, key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Igual a `translate`, substituindo `{nome}` pelos argumentos.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.messages
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_every_embedded_catalog() {
        let store = I18nStore::load().unwrap();
        for lang in ["es", "en", "pt"] {
            assert!(store.messages.contains_key(lang), "falta o catálogo {}", lang);
        }
        assert!(!store.messages.contains_key("fr"));
    }

    #[test]
    fn falls_back_to_spanish_then_to_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(
            store.translate("fr", "not_found.policy"),
            "Póliza no encontrada."
        );
        assert_eq!(store.translate("en", "no.such.key"), "no.such.key");
    }

    #[test]
    fn substitutes_named_arguments() {
        let store = I18nStore::load().unwrap();
        let message = store.translate_with("en", "custom_field.below_min", &[("label", "Año"), ("min", "1900")]);
        assert_eq!(message, "The field \"Año\" must be at least 1900.");
    }
}
