use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bot token sent as `Authorization: Bot <token>`.
    pub token: Option<String>,
    /// Id of the account this client acts as. Used as the actor for
    /// channel overwrite checks.
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            user_id: String::new(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts per request, including the first one. Clamped to
    /// `1..=10` by the HTTP transport.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub oversize: OversizePolicy,
}

/// What to do with a bulk delete over 100 ids or a fetch limit over 100.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Reject with a validation error.
    Strict,
    /// Truncate bulk deletes to the first 100 ids and skip oversized
    /// fetches, logging a warning instead of failing.
    #[default]
    Lenient,
}

fn default_base_url() -> String {
    "http://localhost:8080/api/v1".into()
}

fn default_user_agent() -> String {
    concat!("Paracord-Client/", env!("CARGO_PKG_VERSION")).into()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

impl ClientConfig {
    /// Load from a TOML file, falling back to defaults when the file is
    /// missing, then apply `PARACORD_*` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::from_toml_str(&content)?
        } else {
            tracing::info!(
                "Config file not found at '{}', using defaults",
                path.display()
            );
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("PARACORD_API_URL") {
            self.api.base_url = value;
        }
        if let Some(value) = lookup("PARACORD_TOKEN") {
            self.api.token = Some(value);
        }
        if let Some(value) = lookup("PARACORD_USER_ID") {
            self.api.user_id = value;
        }
        if let Some(value) = lookup("PARACORD_HTTP_TIMEOUT_SECS") {
            if let Ok(parsed) = value.parse::<u64>() {
                self.http.timeout_secs = parsed;
            }
        }
        if let Some(value) = lookup("PARACORD_HTTP_MAX_ATTEMPTS") {
            if let Ok(parsed) = value.parse::<u32>() {
                self.http.max_attempts = parsed;
            }
        }
        if let Some(value) = lookup("PARACORD_OVERSIZE_POLICY") {
            match value.trim().to_ascii_lowercase().as_str() {
                "strict" => self.validation.oversize = OversizePolicy::Strict,
                "lenient" => self.validation.oversize = OversizePolicy::Lenient,
                _ => {
                    tracing::warn!(
                        "Ignoring invalid PARACORD_OVERSIZE_POLICY value '{}'; expected strict or lenient",
                        value
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.http.max_attempts, 3);
        assert_eq!(config.validation.oversize, OversizePolicy::Lenient);
    }

    #[test]
    fn parses_sections() {
        let config = ClientConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://chat.example.com/api/v1"
            token = "abc"
            user_id = "42"

            [http]
            timeout_secs = 5

            [validation]
            oversize = "strict"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.token.as_deref(), Some("abc"));
        assert_eq!(config.api.user_id, "42");
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.retry_base_delay_ms, 500);
        assert_eq!(config.validation.oversize, OversizePolicy::Strict);
    }

    #[test]
    fn rejects_unknown_policy_in_file() {
        assert!(ClientConfig::from_toml_str("[validation]\noversize = \"loose\"").is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PARACORD_USER_ID", "7"),
            ("PARACORD_HTTP_MAX_ATTEMPTS", "not-a-number"),
            ("PARACORD_OVERSIZE_POLICY", "Strict"),
        ]);
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api.user_id, "7");
        assert_eq!(config.http.max_attempts, 3);
        assert_eq!(config.validation.oversize, OversizePolicy::Strict);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        fs::write(&path, "[api]\nuser_id = \"99\"\n").unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert!(!config.api.user_id.is_empty());
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.http.timeout_secs, 15);
    }
}
