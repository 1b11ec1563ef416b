use std::env;
use std::fmt;

/// Runtime configuration, read from the process environment (and `.env` via `dotenv`).
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. When unset the server runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    /// Secret used to sign and verify access tokens.
    pub jwt_secret: String,
    /// Shared secret for the Linear webhook. Webhook requests are rejected while unset.
    pub linear_webhook_secret: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key, value) => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parse_or("SERVER_PORT", 3000)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret: non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            linear_webhook_secret: non_empty("LINEAR_WEBHOOK_SECRET"),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the environment is never mutated concurrently.
    #[test]
    fn test_config_from_env() {
        env::remove_var("DATABASE_URL");
        env::remove_var("SERVER_PORT");
        env::remove_var("SERVER_HOST");
        env::remove_var("LINEAR_WEBHOOK_SECRET");
        env::remove_var("JWT_SECRET");

        assert_eq!(
            Config::from_env().unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );

        env::set_var("JWT_SECRET", "test-secret");
        let config = Config::from_env().unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "127.0.0.1");
        assert!(config.linear_webhook_secret.is_none());

        env::set_var("SERVER_PORT", "8080");
        env::set_var("SERVER_HOST", "0.0.0.0");
        env::set_var("LINEAR_WEBHOOK_SECRET", "lin_wh_test");

        let config = Config::from_env().unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_url(), "http://0.0.0.0:8080");
        assert_eq!(config.linear_webhook_secret.as_deref(), Some("lin_wh_test"));

        env::set_var("SERVER_PORT", "not-a-port");
        assert_eq!(
            Config::from_env().unwrap_err(),
            ConfigError::Invalid("SERVER_PORT", "not-a-port".to_string())
        );

        env::remove_var("SERVER_PORT");
        env::remove_var("SERVER_HOST");
        env::remove_var("LINEAR_WEBHOOK_SECRET");
    }
}
