//! Method dispatch shared by every table function
//!
//! | Method | Required | Store call | Body |
//! |--------|----------|------------|------|
//! | POST | all required fields | insert | `{"inserted": [...]}` |
//! | GET | none | select all | `{"fetched": [...]}` |
//! | PUT | `id` + required fields | update by id | `{"updated": [...]}` |
//! | DELETE | `id` | delete by id | `{"success": true, "message": "Record deleted!"}` |
//!
//! Anything else is answered with 405. Validation happens before the store
//! is touched, and a store failure is returned as a 500 carrying the store's
//! own message.
//!
//! POST carries no idempotency key: a client retrying after a network error
//! creates a second record.

use edge_crud_sdk::prelude::*;
use serde_json::Map;

pub const DELETE_REQUIREMENT: &str = "ID is required to delete.";

/// Columns a function reads from the request body for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub table: &'static str,
    /// Must be present and truthy on insert and update
    pub required: &'static [&'static str],
    /// Forwarded when present and truthy, never required
    pub optional: &'static [&'static str],
}

impl EntitySchema {
    /// Message returned when an insert is missing a required field
    pub fn insert_requirement(&self) -> String {
        let fields: Vec<String> = self.required.iter().map(|f| format!("'{}'", f)).collect();
        match fields.as_slice() {
            [single] => format!("{} is required.", single),
            [first, second] => format!("Both {} and {} are required.", first, second),
            _ => format!("{} are required.", join_fields(&fields)),
        }
    }

    /// Message returned when an update is missing the id or a required field
    pub fn update_requirement(&self) -> String {
        let mut fields = vec!["ID".to_string()];
        fields.extend(self.required.iter().map(|f| format!("'{}'", f)));
        match fields.as_slice() {
            [single] => format!("{} is required.", single),
            _ => format!("{} are required.", join_fields(&fields)),
        }
    }

    /// Build the row to write from the request body.
    ///
    /// Returns `None` when a required field is missing. Only schema columns
    /// are copied, so a client supplied `id` never reaches the store.
    pub fn payload(&self, body: &Map<String, JsonValue>) -> Option<Row> {
        let mut row = Row::new();

        for field in self.required {
            let value = body.get(*field).filter(|v| is_truthy(v))?;
            row.insert(field.to_string(), value.clone());
        }

        for field in self.optional {
            if let Some(value) = body.get(*field).filter(|v| is_truthy(v)) {
                row.insert(field.to_string(), value.clone());
            }
        }

        Some(row)
    }
}

/// `a and b`, `a, b, and c`
fn join_fields(fields: &[String]) -> String {
    match fields {
        [] => String::new(),
        [single] => single.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// Presence check: absent, `null`, `false`, `0` and `""` count as missing
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Extract a truthy `id` from the body
fn require_id(body: &Map<String, JsonValue>) -> Option<JsonValue> {
    body.get("id").filter(|v| is_truthy(v)).cloned()
}

/// Route one request to the store operation its method selects
pub async fn dispatch(
    ctx: &Context,
    req: Request,
    schema: &EntitySchema,
) -> Result<Response, HandlerError> {
    let method = req.method.to_ascii_uppercase();
    tracing::debug!(
        request_id = %ctx.request_id,
        table = schema.table,
        method = %method,
        "Dispatching request"
    );

    match method.as_str() {
        "POST" => insert(ctx, &req, schema).await,
        "GET" => fetch(ctx, schema).await,
        "PUT" => update(ctx, &req, schema).await,
        "DELETE" => delete(ctx, &req, schema).await,
        _ => Err(HandlerError::MethodNotAllowed),
    }
}

async fn insert(ctx: &Context, req: &Request, schema: &EntitySchema) -> Result<Response, HandlerError> {
    let body = req.json_object()?;
    let row = schema
        .payload(&body)
        .ok_or_else(|| HandlerError::Validation(schema.insert_requirement()))?;

    let inserted = ctx
        .store
        .insert(schema.table, row)
        .await
        .map_err(|e| store_failure(ctx, schema, "insert", e))?;

    tracing::info!(request_id = %ctx.request_id, table = schema.table, "Inserted record");
    Ok(Response::ok(json!({ "inserted": inserted })))
}

async fn fetch(ctx: &Context, schema: &EntitySchema) -> Result<Response, HandlerError> {
    let fetched = ctx
        .store
        .select_all(schema.table)
        .await
        .map_err(|e| store_failure(ctx, schema, "select", e))?;

    Ok(Response::ok(json!({ "fetched": fetched })))
}

async fn update(ctx: &Context, req: &Request, schema: &EntitySchema) -> Result<Response, HandlerError> {
    let body = req.json_object()?;
    let (id, changes) = match (require_id(&body), schema.payload(&body)) {
        (Some(id), Some(changes)) => (id, changes),
        _ => return Err(HandlerError::Validation(schema.update_requirement())),
    };

    let updated = ctx
        .store
        .update(schema.table, &id, changes)
        .await
        .map_err(|e| store_failure(ctx, schema, "update", e))?;

    tracing::info!(
        request_id = %ctx.request_id,
        table = schema.table,
        id = %id,
        matched = updated.len(),
        "Updated record"
    );
    Ok(Response::ok(json!({ "updated": updated })))
}

async fn delete(ctx: &Context, req: &Request, schema: &EntitySchema) -> Result<Response, HandlerError> {
    let body = req.json_object()?;
    let id = require_id(&body)
        .ok_or_else(|| HandlerError::Validation(DELETE_REQUIREMENT.to_string()))?;

    ctx.store
        .delete(schema.table, &id)
        .await
        .map_err(|e| store_failure(ctx, schema, "delete", e))?;

    tracing::info!(request_id = %ctx.request_id, table = schema.table, id = %id, "Deleted record");
    Ok(Response::ok(json!({ "success": true, "message": "Record deleted!" })))
}

fn store_failure(ctx: &Context, schema: &EntitySchema, operation: &str, err: StoreError) -> HandlerError {
    tracing::warn!(
        request_id = %ctx.request_id,
        table = schema.table,
        operation,
        code = ?err.code,
        "Store error: {}",
        err
    );
    HandlerError::Store(err)
}
