use std::env;

use thiserror::Error;

use crate::infrastructure::mercadopago::MERCADOPAGO_API_BASE;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Required for the postgres backend only.
    pub database_url: Option<String>,
    pub admin_api_key: Option<String>,
    pub admin_email: String,
    pub mercadopago_access_token: Option<String>,
    pub mercadopago_api_url: String,
    pub frontend_url: String,
    pub backend_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok().filter(|v| !v.is_empty()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let backend_url = lookup("BACKEND_URL").unwrap_or_else(|| format!("http://localhost:{port}"));

        Ok(Config {
            host,
            port,
            store_backend,
            database_url,
            admin_api_key: lookup("ADMIN_API_KEY"),
            admin_email: lookup("ADMIN_EMAIL").unwrap_or_else(|| "admin@griferia.com".to_string()),
            mercadopago_access_token: lookup("MERCADOPAGO_ACCESS_TOKEN"),
            mercadopago_api_url: lookup("MERCADOPAGO_API_URL")
                .unwrap_or_else(|| MERCADOPAGO_API_BASE.to_string()),
            frontend_url: lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            backend_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_with_database_url() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.store_backend, StoreBackend::Postgres);
        assert_eq!(cfg.backend_url, "http://localhost:8080");
        assert_eq!(cfg.mercadopago_api_url, MERCADOPAGO_API_BASE);
        assert!(cfg.mercadopago_access_token.is_none());
    }

    #[test]
    fn postgres_requires_database_url() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let cfg = config(&[("STORE_BACKEND", "memory"), ("PORT", "9000")]).unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::Memory);
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config(&[("STORE_BACKEND", "lowdb")]),
            Err(ConfigError::Invalid { name: "STORE_BACKEND", .. })
        ));
        assert!(matches!(
            config(&[("STORE_BACKEND", "memory"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
    }
}
