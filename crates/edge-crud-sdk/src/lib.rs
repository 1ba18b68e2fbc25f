//! edge-crud SDK - Types and utilities for writing edge-crud functions
//!
//! A function receives a [`Context`] and a [`Request`] and answers with a
//! [`Response`]. All persistence goes through the [`Store`] held by the
//! context.

pub mod request;
pub mod response;
pub mod context;
pub mod store;
pub mod handler;
pub mod error;

pub mod prelude {
    //! Common imports for edge-crud functions
    pub use crate::request::Request;
    pub use crate::response::Response;
    pub use crate::context::{Context, RequestId};
    pub use crate::store::{Row, Store, StoreError};
    pub use crate::handler::{BoxFuture, HandlerFn};
    pub use crate::error::HandlerError;
    pub use crate::handler_result;
    pub use serde_json::{json, Value as JsonValue};
}

// Re-export key types at crate root
pub use request::Request;
pub use response::Response;
pub use context::Context;
pub use store::{Row, Store, StoreError};
pub use error::HandlerError;
