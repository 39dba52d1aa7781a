use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpendError};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base: default_api_base(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    /// The key from the environment wins over the one in settings.json.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let bad = |what: &str| SpendError::Settings(format!("{key} expects {what}, got '{value}'"));
        match key {
            "api_key" => {
                self.api_key = if value.is_empty() { None } else { Some(value.to_string()) };
            }
            "model" => self.model = value.to_string(),
            "api_base" => self.api_base = value.trim_end_matches('/').to_string(),
            "max_tokens" => self.max_tokens = value.parse().map_err(|_| bad("a positive integer"))?,
            "temperature" => {
                let t: f32 = value.parse().map_err(|_| bad("a number"))?;
                if !(0.0..=2.0).contains(&t) {
                    return Err(bad("a number between 0 and 2"));
                }
                self.temperature = t;
            }
            "timeout_secs" => {
                self.timeout_secs = value.parse().map_err(|_| bad("a whole number of seconds"))?
            }
            _ => {
                return Err(SpendError::Settings(format!(
                    "Unknown setting '{key}' (expected one of: api_key, model, api_base, max_tokens, temperature, timeout_secs)"
                )))
            }
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("spendlens")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o".to_string(),
            timeout_secs: 5,
            ..Default::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.api_key.is_none());
        assert_eq!(s.model, "gpt-4o-mini");
        assert_eq!(s.max_tokens, 1000);
        assert!((s.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(s.timeout_secs, 60);
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"model": "gpt-4.1-mini"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.model, "gpt-4.1-mini");
        assert_eq!(s.api_base, "https://api.openai.com/v1");
        assert_eq!(s.timeout_secs, 60);
    }

    #[test]
    fn test_api_key_not_serialized_when_absent() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn test_set_validates_values() {
        let mut s = Settings::default();
        s.set("max_tokens", "500").unwrap();
        assert_eq!(s.max_tokens, 500);
        s.set("api_base", "http://localhost:8080/v1/").unwrap();
        assert_eq!(s.api_base, "http://localhost:8080/v1");
        assert!(s.set("max_tokens", "lots").is_err());
        assert!(s.set("temperature", "3.5").is_err());
        let err = s.set("colour", "blue").unwrap_err();
        assert!(err.to_string().contains("Unknown setting"), "got: {err}");
        s.set("api_key", "").unwrap();
        assert!(s.api_key.is_none());
    }
}
