use crate::core::AnkifillError;

pub const DEFAULT_ANKI_CONNECT_URL: &str = "http://localhost:8765";
const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_MODEL: &str = "deepseek-chat";

/// All settings for one run, read once at startup and passed by reference into
/// each client. Nothing else in the crate touches the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub anki_connect_url: String,
    pub deck_name: String,
    pub note_type: String,
}

impl Config {
    /// Loads `.env` from the working directory if present, then the process
    /// environment. Fails listing every missing required variable at once.
    pub fn from_env() -> Result<Self, AnkifillError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AnkifillError> {
        let mut missing: Vec<&str> = Vec::new();

        let mut require = |name: &'static str| -> String {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => value,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let api_key = require("API_KEY");
        let deck_name = require("DECK_NAME");
        let note_type = require("NOTE_TYPE");

        let base_url = optional(&lookup, "BASE_URL", DEFAULT_BASE_URL);
        let model = optional(&lookup, "AI_MODEL", DEFAULT_MODEL);
        let anki_connect_url = optional(&lookup, "ANKI_CONNECT_URL", DEFAULT_ANKI_CONNECT_URL);

        if !missing.is_empty() {
            return Err(AnkifillError::MissingConfig(missing.join(", ")));
        }

        Ok(Config { api_key, base_url, model, anki_connect_url, deck_name, note_type })
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<Config, AnkifillError> {
        let vars = env(pairs);
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn applies_defaults_for_optional_values() {
        let config = load(&[
            ("API_KEY", "sk-test"),
            ("DECK_NAME", "IELTS Vocab"),
            ("NOTE_TYPE", "Vocab Card"),
        ])
        .unwrap();

        assert_eq!(config.anki_connect_url, DEFAULT_ANKI_CONNECT_URL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.deck_name, "IELTS Vocab");
    }

    #[test]
    fn reports_every_missing_required_value() {
        let err = load(&[("DECK_NAME", "IELTS Vocab")]).unwrap_err();

        match err {
            AnkifillError::MissingConfig(names) => {
                assert!(names.contains("API_KEY"));
                assert!(names.contains("NOTE_TYPE"));
                assert!(!names.contains("DECK_NAME"));
            }
            other => panic!("expected MissingConfig, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let err = load(&[
            ("API_KEY", "   "),
            ("DECK_NAME", "IELTS Vocab"),
            ("NOTE_TYPE", "Vocab Card"),
        ])
        .unwrap_err();

        match err {
            AnkifillError::MissingConfig(names) => assert_eq!(names, "API_KEY"),
            other => panic!("expected MissingConfig, got {other:?}"),
        }
    }

    #[test]
    fn overrides_win_over_defaults() {
        let config = load(&[
            ("API_KEY", "sk-test"),
            ("DECK_NAME", "IELTS Vocab"),
            ("NOTE_TYPE", "Vocab Card"),
            ("ANKI_CONNECT_URL", "http://localhost:8899"),
            ("AI_MODEL", "deepseek-reasoner"),
        ])
        .unwrap();

        assert_eq!(config.anki_connect_url, "http://localhost:8899");
        assert_eq!(config.model, "deepseek-reasoner");
    }
}
