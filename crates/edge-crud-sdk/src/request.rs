//! HTTP Request representation for functions

use crate::error::HandlerError;
use serde_json::{Map, Value};

/// Represents an incoming HTTP request
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    pub method: String,

    /// Request body as text
    pub body: Option<String>,
}

impl Request {
    /// Parse the body as a JSON object.
    ///
    /// A missing or blank body is an empty object, and so is any JSON value
    /// that is not an object: field lookups on it then all come back empty.
    pub fn json_object(&self) -> Result<Map<String, Value>, HandlerError> {
        let body = match self.body.as_deref().map(str::trim) {
            None | Some("") => return Ok(Map::new()),
            Some(body) => body,
        };

        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Ok(Map::new()),
            Err(e) => Err(HandlerError::BadRequest(format!("Invalid JSON: {}", e))),
        }
    }
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            body: None,
        }
    }
}
