//! The store contract functions talk to
//!
//! A store owns persistence for a set of tables. Functions only ever issue
//! one call per request and forward whatever the store answers.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

/// A single record: a flat mapping from column name to value
pub type Row = Map<String, Value>;

/// Failure reported by a store.
///
/// `message` is shown to clients unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub message: String,
    /// Store specific error code (e.g. a PostgreSQL SQLSTATE), if any
    pub code: Option<String>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

/// Operations a backing store must provide.
///
/// `id` is whatever the client sent as identifier; interpreting it is up
/// to the store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert one row and return its stored representation
    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError>;

    /// Fetch every row of a table
    async fn select_all(&self, table: &str) -> Result<Vec<Row>, StoreError>;

    /// Update the row matching `id`, returning the updated rows (empty if none matched)
    async fn update(&self, table: &str, id: &Value, changes: Row) -> Result<Vec<Row>, StoreError>;

    /// Delete the row matching `id`. Deleting an absent row is not an error.
    async fn delete(&self, table: &str, id: &Value) -> Result<(), StoreError>;
}
