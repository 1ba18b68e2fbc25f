//! Store Connectors
//!
//! This module builds the store every function talks to:
//! - Supabase - hosted PostgREST API (production)
//! - Memory - in-process actor store (local development, tests)

pub mod supabase;

use edge_crud_sdk::Store;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::runtime::MemoryStore;

pub use supabase::{SupabaseConfig, SupabaseStore};

/// Errors related to setting up a store
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Service not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Which store backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Supabase,
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Supabase => write!(f, "supabase"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supabase" => Ok(StoreBackend::Supabase),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Unknown store backend: {}", s)),
        }
    }
}

/// Construct the store selected by the configuration.
///
/// Called once at startup; the result is shared by every request.
pub fn create_store(config: &AppConfig) -> Result<Arc<dyn Store>, ServiceError> {
    match config.store_backend {
        StoreBackend::Supabase => {
            let supabase = config
                .supabase
                .as_ref()
                .ok_or(ServiceError::NotConfigured("supabase"))?;
            tracing::info!(url = %supabase.url, "Using Supabase store");
            Ok(Arc::new(SupabaseStore::new(supabase)?))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; records are lost on restart");
            Ok(Arc::new(MemoryStore::start()))
        }
    }
}
