//! Context API for functions
//!
//! The Context gives a function access to the backing store and to the
//! identifier of the request it is serving. The host builds one per request;
//! the store inside is shared and constructed once at startup.

use std::sync::Arc;
use uuid::Uuid;

use crate::store::Store;

/// Request identifier for tracing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Create a new random request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context passed to every function
///
/// Cheap to clone; pass it by reference.
///
/// # Example
///
/// ```ignore
/// async fn handle(ctx: &Context, req: Request) -> Result<Response, HandlerError> {
///     let rows = ctx.store.select_all("User").await?;
///     tracing::info!(request_id = %ctx.request_id, "Fetched users");
///     Ok(Response::ok(json!({ "fetched": rows })))
/// }
/// ```
#[derive(Clone)]
pub struct Context {
    /// Backing store shared by all requests
    pub store: Arc<dyn Store>,

    /// Unique request identifier
    pub request_id: RequestId,
}

impl Context {
    /// Create a new context for a request
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            request_id: RequestId::new(),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}
