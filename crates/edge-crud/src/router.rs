//! Function router - turns HTTP requests into function calls
//!
//! The function is picked from the `{function}` route parameter. Everything
//! after that (method dispatch, validation, the store call) is up to the
//! function itself. A `{resource}` segment after the function name picks
//! the resource that function works on, so `/functions/v1/user/posts` runs
//! the posts handler. Paths that match no route get the JSON 404.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use edge_crud_sdk::context::{Context, RequestId};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;

use crate::functions::FunctionKind;
use crate::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the router that serves every function
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = state.config.cors;

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/functions/v1/{function}", any(handle_function_request))
        .route("/functions/v1/{function}/{resource}", any(handle_resource_request))
        .route("/{function}", any(handle_function_request))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Handle a request addressed to one function
async fn handle_function_request(
    State(state): State<Arc<AppState>>,
    Path(function): Path<String>,
    request: Request<Body>,
) -> Response {
    let kind = function.parse::<FunctionKind>().ok();
    run_function(state, function, kind, request).await
}

/// Handle a request addressed to a resource of a function
async fn handle_resource_request(
    State(state): State<Arc<AppState>>,
    Path((function, resource)): Path<(String, String)>,
    request: Request<Body>,
) -> Response {
    let kind = match function.parse::<FunctionKind>() {
        Ok(_) => resource.parse::<FunctionKind>().ok(),
        Err(_) => None,
    };
    run_function(state, format!("{}/{}", function, resource), kind, request).await
}

/// Any path no route matches
async fn route_not_found(request: Request<Body>) -> Response {
    let request_id = RequestId::new();
    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        "No route matched"
    );
    into_http_response(edge_crud_sdk::Response::not_found(), &request_id)
}

async fn run_function(
    state: Arc<AppState>,
    function: String,
    kind: Option<FunctionKind>,
    request: Request<Body>,
) -> Response {
    let ctx = Context::new(state.store.clone());
    let method = request.method().to_string();

    let span = tracing::info_span!(
        "function",
        request_id = %ctx.request_id,
        function = %function,
        method = %method,
    );

    async move {
        let Some(kind) = kind else {
            tracing::debug!(path = %request.uri().path(), "No function found");
            return into_http_response(edge_crud_sdk::Response::not_found(), &ctx.request_id);
        };

        let body_bytes = match axum::body::to_bytes(request.into_body(), state.config.max_body_bytes).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to read body: {}", e);
                return into_http_response(
                    edge_crud_sdk::Response::bad_request("Failed to read body"),
                    &ctx.request_id,
                );
            }
        };

        let body = if body_bytes.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&body_bytes).to_string())
        };

        let sdk_request = edge_crud_sdk::Request { method, body };

        let handler = state.functions.get(kind);
        let response = handler(&ctx, sdk_request).await;

        tracing::info!(resolved = %kind, status = response.status, "Function completed");
        into_http_response(response, &ctx.request_id)
    }
    .instrument(span)
    .await
}

/// Convert a function response into an HTTP response
fn into_http_response(sdk_response: edge_crud_sdk::Response, request_id: &RequestId) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::from_u16(sdk_response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));

    for (key, value) in &sdk_response.headers {
        builder = builder.header(key, value);
    }

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        builder = builder.header(REQUEST_ID_HEADER, value);
    }

    match builder.body(Body::from(sdk_response.body.unwrap_or_default())) {
        Ok(response) => response,
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response(),
    }
}
