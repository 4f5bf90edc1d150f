//! Process configuration loaded from environment variables.

use crate::error::ConfigError;
use std::str::FromStr;

/// Server configuration with defaults suitable for local development.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    /// Largest accepted request body.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            database_url: "sqlite://tcgindex.db".into(),
            host: "0.0.0.0".into(),
            port: 3000,
            max_connections: 5,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// | Env Var                    | Default                |
    /// |----------------------------|------------------------|
    /// | `DATABASE_URL`             | `sqlite://tcgindex.db` |
    /// | `HOST`                     | `0.0.0.0`              |
    /// | `PORT`                     | `3000`                 |
    /// | `DATABASE_MAX_CONNECTIONS` | `5`                    |
    /// | `BODY_LIMIT_BYTES`         | `1048576`              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        Ok(ServerConfig {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            body_limit_bytes: parse_or(&lookup, "BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env(format!("{} must be a number, got '{}'", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn overrides_are_parsed() {
        let env: HashMap<&str, &str> = [("PORT", "8080"), ("DATABASE_URL", "sqlite::memory:")].into();
        let config = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn invalid_port_is_an_error() {
        let result = ServerConfig::from_lookup(|k| (k == "PORT").then(|| "eighty".to_string()));
        assert_matches!(result, Err(ConfigError::Env(_)));
    }
}
