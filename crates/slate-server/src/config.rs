use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub db_path: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("db_path", &self.db_path)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "SLATE_BIND_ADDR", "127.0.0.1:8080");
        let db_path = value_or_default(&lookup, "SLATE_DB_PATH", "slate-server.db");

        let jwt_secret = required_trimmed(&lookup, "SLATE_JWT_SECRET")?;
        if jwt_secret.len() < 16 {
            return Err(ConfigError::Invalid(
                "SLATE_JWT_SECRET must be at least 16 bytes".to_string(),
            ));
        }

        let token_ttl_secs = value_or_default(&lookup, "SLATE_TOKEN_TTL_SECS", "86400")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "SLATE_TOKEN_TTL_SECS must be an integer in [60, 2592000]".to_string(),
                )
            })?;
        if !(60..=2_592_000).contains(&token_ttl_secs) {
            return Err(ConfigError::Invalid(
                "SLATE_TOKEN_TTL_SECS must be in [60, 2592000]".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            db_path,
            jwt_secret,
            token_ttl: Duration::from_secs(token_ttl_secs),
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn required_trimmed(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional_trimmed(lookup, name).ok_or(ConfigError::MissingVar(name))
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn config_requires_jwt_secret() {
        let map: HashMap<&str, &str> = HashMap::new();
        let err = AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("SLATE_JWT_SECRET"));
    }

    #[test]
    fn config_rejects_short_secret() {
        let mut map = HashMap::new();
        map.insert("SLATE_JWT_SECRET", "short");
        let err = AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("16 bytes"));
    }

    #[test]
    fn config_redacts_secret_in_debug() {
        let mut map = HashMap::new();
        map.insert("SLATE_JWT_SECRET", "sensitive-signing-secret");
        let config =
            AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string())).unwrap();

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("sensitive-signing-secret"));
        assert!(debug_output.contains("[REDACTED]"));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.token_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn config_validates_token_ttl_range() {
        let mut map = HashMap::new();
        map.insert("SLATE_JWT_SECRET", "sensitive-signing-secret");
        map.insert("SLATE_TOKEN_TTL_SECS", "5");
        let err = AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("SLATE_TOKEN_TTL_SECS"));
    }
}
