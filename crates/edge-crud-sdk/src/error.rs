//! Error types for edge-crud functions

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur in a function.
///
/// The `Display` text of every variant is exactly what ends up in the
/// `error` field of the JSON response, so messages are never prefixed.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// A required body field is missing or falsy
    #[error("{0}")]
    Validation(String),

    /// The request could not be interpreted (e.g. malformed JSON)
    #[error("{0}")]
    BadRequest(String),

    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Failure reported by the backing store, forwarded verbatim
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert the error to an HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::Validation(_) | HandlerError::BadRequest(_) => 400,
            HandlerError::NotFound => 404,
            HandlerError::MethodNotAllowed => 405,
            HandlerError::Store(_) | HandlerError::Internal(_) => 500,
        }
    }

    /// Convert to a Response
    pub fn into_response(self) -> crate::Response {
        crate::Response::json(
            self.status_code(),
            serde_json::json!({
                "error": self.to_string()
            }),
        )
    }
}

impl From<HandlerError> for crate::Response {
    fn from(err: HandlerError) -> Self {
        err.into_response()
    }
}
