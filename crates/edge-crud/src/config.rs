//! Application configuration

use std::env;

use crate::functions::TicketSchema;
use crate::services::{StoreBackend, SupabaseConfig};

/// Errors raised while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface the HTTP server binds to
    pub host: String,

    /// Port the HTTP server listens on
    pub port: u16,

    /// Store every function talks to
    pub store_backend: StoreBackend,

    /// Supabase project URL and service credential
    pub supabase: Option<SupabaseConfig>,

    /// Field requirements for the `Name` table
    pub ticket_schema: TicketSchema,

    /// Largest request body accepted, in bytes
    pub max_body_bytes: usize,

    /// Answer cross-origin requests
    pub cors: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let store_backend = parsed(&lookup, "EDGE_CRUD_STORE")?.unwrap_or(defaults.store_backend);

        let supabase = match (lookup("SUPABASE_URL"), lookup("SUPABASE_SERVICE_ROLE_KEY")) {
            (Some(url), Some(service_role_key)) => Some(SupabaseConfig { url, service_role_key }),
            (None, _) if store_backend == StoreBackend::Supabase => {
                return Err(ConfigError::Missing("SUPABASE_URL"))
            }
            (_, None) if store_backend == StoreBackend::Supabase => {
                return Err(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))
            }
            _ => None,
        };

        Ok(Self {
            host: lookup("EDGE_CRUD_HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "EDGE_CRUD_PORT")?.unwrap_or(defaults.port),
            store_backend,
            supabase,
            ticket_schema: parsed(&lookup, "EDGE_CRUD_TICKET_SCHEMA")?.unwrap_or(defaults.ticket_schema),
            max_body_bytes: parsed(&lookup, "EDGE_CRUD_MAX_BODY_BYTES")?.unwrap_or(defaults.max_body_bytes),
            cors: match lookup("EDGE_CRUD_CORS") {
                Some(value) => parse_bool("EDGE_CRUD_CORS", &value)?,
                None => defaults.cors,
            },
        })
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            store_backend: StoreBackend::Supabase,
            supabase: None,
            ticket_schema: TicketSchema::Full,
            max_body_bytes: 1024 * 1024,
            cors: true,
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
