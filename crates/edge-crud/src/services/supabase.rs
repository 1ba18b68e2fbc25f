//! Supabase Store Connector
//!
//! Talks to the PostgREST API that Supabase exposes under `/rest/v1`. Each
//! store operation is exactly one HTTP request; whatever error the service
//! reports is handed back unchanged.

use async_trait::async_trait;
use edge_crud_sdk::{Row, Store, StoreError};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::ServiceError;

/// Supabase connection configuration
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`
    pub url: String,
    /// Service role key, sent as both `apikey` and bearer token
    pub service_role_key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_role_key", &"<redacted>")
            .finish()
    }
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    code: Option<String>,
}

/// Supabase store connector
pub struct SupabaseStore {
    base_url: Url,
    service_role_key: String,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig) -> Result<Self, ServiceError> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| ServiceError::InvalidConfig(format!("SUPABASE_URL is not a valid URL: {}", e)))?;

        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidConfig(format!(
                "SUPABASE_URL cannot be used as a base URL: {}",
                config.url
            )));
        }

        if config.service_role_key.is_empty() {
            return Err(ServiceError::InvalidConfig("SUPABASE_SERVICE_ROLE_KEY is empty".into()));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ServiceError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            base_url,
            service_role_key: config.service_role_key.clone(),
            client,
        })
    }

    /// `{base}/rest/v1/{table}`
    fn table_url(&self, table: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["rest", "v1", table]);
        }
        url
    }

    /// `{base}/rest/v1/{table}?id=eq.{id}`
    fn row_url(&self, table: &str, id: &Value) -> Url {
        let mut url = self.table_url(table);
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id_literal(id)));
        url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    /// Send a request and decode the returned rows
    async fn fetch_rows(&self, builder: RequestBuilder) -> Result<Vec<Row>, StoreError> {
        let text = self.send(builder).await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&text)
            .map_err(|e| StoreError::new(format!("Unexpected response from store: {}", e)))
    }

    /// Send a request, returning the body text of a successful response
    async fn send(&self, builder: RequestBuilder) -> Result<String, StoreError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| StoreError::new(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::new(e.to_string()))?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(error_from_response(status, &text))
        }
    }
}

impl std::fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Store for SupabaseStore {
    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError> {
        let builder = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&[row]);
        self.fetch_rows(builder).await
    }

    async fn select_all(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let mut url = self.table_url(table);
        url.query_pairs_mut().append_pair("select", "*");
        self.fetch_rows(self.client.get(url)).await
    }

    async fn update(&self, table: &str, id: &Value, changes: Row) -> Result<Vec<Row>, StoreError> {
        let mut url = self.row_url(table, id);
        url.query_pairs_mut().append_pair("select", "*");
        let builder = self
            .client
            .patch(url)
            .header("Prefer", "return=representation")
            .json(&changes);
        self.fetch_rows(builder).await
    }

    async fn delete(&self, table: &str, id: &Value) -> Result<(), StoreError> {
        let builder = self
            .client
            .delete(self.row_url(table, id))
            .header("Prefer", "return=minimal");
        self.send(builder).await.map(|_| ())
    }
}

/// Render an identifier as a PostgREST filter literal
fn id_literal(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the error handed back to clients from a failed response.
///
/// Prefers the PostgREST `message`, then the raw body, then the status line.
fn error_from_response(status: StatusCode, body: &str) -> StoreError {
    if let Ok(PostgrestError { message: Some(message), code }) = serde_json::from_str::<PostgrestError>(body) {
        let err = StoreError::new(message);
        return match code {
            Some(code) => err.with_code(code),
            None => err,
        };
    }

    let body = body.trim();
    if body.is_empty() {
        StoreError::new(status.to_string())
    } else {
        StoreError::new(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Request, State},
        http::HeaderMap,
        Router,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// What the PostgREST stand-in saw for one request
    #[derive(Debug, Clone)]
    struct Recorded {
        method: String,
        path: String,
        query: Vec<(String, String)>,
        headers: HeaderMap,
        body: String,
    }

    impl Recorded {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).and_then(|v| v.to_str().ok())
        }

        fn json(&self) -> Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    #[derive(Clone)]
    struct Upstream {
        status: StatusCode,
        reply: String,
        seen: Arc<Mutex<Vec<Recorded>>>,
    }

    async fn record(State(upstream): State<Upstream>, request: Request) -> (StatusCode, String) {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let query = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        upstream.seen.lock().await.push(Recorded {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            query,
            headers: parts.headers,
            body: String::from_utf8_lossy(&body).to_string(),
        });

        (upstream.status, upstream.reply.clone())
    }

    /// Serve a fixed reply on a local port and return a store pointed at it
    async fn upstream(status: StatusCode, reply: &str) -> (SupabaseStore, Arc<Mutex<Vec<Recorded>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(record).with_state(Upstream {
            status,
            reply: reply.to_string(),
            seen: seen.clone(),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let store = SupabaseStore {
            base_url: Url::parse(&format!("http://{}", addr)).unwrap(),
            service_role_key: "service-key".to_string(),
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
        };
        (store, seen)
    }

    async fn only_request(seen: &Mutex<Vec<Recorded>>) -> Recorded {
        let seen = seen.lock().await;
        assert_eq!(seen.len(), 1);
        seen[0].clone()
    }

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    fn assert_authorized(request: &Recorded) {
        assert_eq!(request.header("apikey"), Some("service-key"));
        assert_eq!(request.header("authorization"), Some("Bearer service-key"));
    }

    fn connector(url: &str) -> SupabaseStore {
        SupabaseStore::new(&SupabaseConfig {
            url: url.to_string(),
            service_role_key: "service-key".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_table_url() {
        let store = connector("https://project.supabase.co");
        assert_eq!(
            store.table_url("Name").as_str(),
            "https://project.supabase.co/rest/v1/Name"
        );

        // Trailing slashes on the project URL are tolerated
        let store = connector("http://127.0.0.1:54321/");
        assert_eq!(store.table_url("User").as_str(), "http://127.0.0.1:54321/rest/v1/User");
    }

    #[test]
    fn test_row_url_filters_by_id() {
        let store = connector("https://project.supabase.co");
        assert_eq!(
            store.row_url("User", &json!(7)).as_str(),
            "https://project.supabase.co/rest/v1/User?id=eq.7"
        );
        assert_eq!(
            store.row_url("User", &json!("a&b")).as_str(),
            "https://project.supabase.co/rest/v1/User?id=eq.a%26b"
        );
    }

    #[test]
    fn test_rejects_invalid_config() {
        let err = SupabaseStore::new(&SupabaseConfig {
            url: "not a url".to_string(),
            service_role_key: "key".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidConfig(_)));

        let err = SupabaseStore::new(&SupabaseConfig {
            url: "https://project.supabase.co".to_string(),
            service_role_key: String::new(),
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidConfig(_)));
    }

    #[test]
    fn test_error_from_postgrest_body() {
        let body = r#"{"code":"23502","details":null,"hint":null,"message":"null value in column \"last_name\" violates not-null constraint"}"#;
        let err = error_from_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err.message,
            "null value in column \"last_name\" violates not-null constraint"
        );
        assert_eq!(err.code.as_deref(), Some("23502"));
    }

    #[test]
    fn test_error_from_plain_body_and_empty_body() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "upstream unavailable\n");
        assert_eq!(err.message, "upstream unavailable");

        let err = error_from_response(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(err.message, "503 Service Unavailable");
    }

    #[test]
    fn test_debug_hides_key() {
        let config = SupabaseConfig {
            url: "https://project.supabase.co".to_string(),
            service_role_key: "super-secret".to_string(),
        };
        assert!(!format!("{:?}", config).contains("super-secret"));
        assert!(!format!("{:?}", connector(&config.url)).contains("service-key"));
    }

    #[tokio::test]
    async fn test_insert_posts_row_array() {
        let (store, seen) = upstream(
            StatusCode::CREATED,
            r#"[{"id":1,"first_name":"Ada","last_name":"Lovelace"}]"#,
        )
        .await;

        let inserted = store
            .insert("User", row(json!({"first_name": "Ada", "last_name": "Lovelace"})))
            .await
            .unwrap();
        assert_eq!(inserted, vec![row(json!({"id": 1, "first_name": "Ada", "last_name": "Lovelace"}))]);

        let request = only_request(&seen).await;
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/rest/v1/User");
        assert!(request.query.is_empty());
        assert_eq!(request.header("prefer"), Some("return=representation"));
        assert_eq!(request.json(), json!([{"first_name": "Ada", "last_name": "Lovelace"}]));
        assert_authorized(&request);
    }

    #[tokio::test]
    async fn test_select_all_requests_every_column() {
        let (store, seen) = upstream(StatusCode::OK, r#"[{"id":1},{"id":2}]"#).await;

        let fetched = store.select_all("Name").await.unwrap();
        assert_eq!(fetched.len(), 2);

        let request = only_request(&seen).await;
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/rest/v1/Name");
        assert_eq!(request.query, vec![("select".to_string(), "*".to_string())]);
        assert_authorized(&request);
    }

    #[tokio::test]
    async fn test_update_patches_matching_id() {
        let (store, seen) = upstream(StatusCode::OK, r#"[{"id":7,"first_name":"Grace"}]"#).await;

        let updated = store
            .update("User", &json!(7), row(json!({"first_name": "Grace"})))
            .await
            .unwrap();
        assert_eq!(updated, vec![row(json!({"id": 7, "first_name": "Grace"}))]);

        let request = only_request(&seen).await;
        assert_eq!(request.method, "PATCH");
        assert_eq!(request.path, "/rest/v1/User");
        assert_eq!(
            request.query,
            vec![
                ("id".to_string(), "eq.7".to_string()),
                ("select".to_string(), "*".to_string()),
            ]
        );
        assert_eq!(request.header("prefer"), Some("return=representation"));
        assert_eq!(request.json(), json!({"first_name": "Grace"}));
        assert_authorized(&request);
    }

    #[tokio::test]
    async fn test_delete_asks_for_minimal_return() {
        let (store, seen) = upstream(StatusCode::NO_CONTENT, "").await;

        store.delete("Name", &json!(3)).await.unwrap();

        let request = only_request(&seen).await;
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.path, "/rest/v1/Name");
        assert_eq!(request.query, vec![("id".to_string(), "eq.3".to_string())]);
        assert_eq!(request.header("prefer"), Some("return=minimal"));
        assert!(request.body.is_empty());
        assert_authorized(&request);
    }

    #[tokio::test]
    async fn test_failed_call_carries_postgrest_message() {
        let (store, seen) = upstream(
            StatusCode::CONFLICT,
            r#"{"code":"23505","details":null,"hint":null,"message":"duplicate key value violates unique constraint \"User_pkey\""}"#,
        )
        .await;

        let err = store
            .insert("User", row(json!({"first_name": "Ada", "last_name": "Lovelace"})))
            .await
            .unwrap_err();
        assert_eq!(
            err.message,
            "duplicate key value violates unique constraint \"User_pkey\""
        );
        assert_eq!(err.code.as_deref(), Some("23505"));
        assert_eq!(only_request(&seen).await.method, "POST");
    }

    #[tokio::test]
    async fn test_failed_call_without_json_uses_body_text() {
        let (store, _seen) = upstream(StatusCode::UNAUTHORIZED, "Invalid API key").await;

        let err = store.select_all("User").await.unwrap_err();
        assert_eq!(err.message, "Invalid API key");
        assert_eq!(err.code, None);
    }
}
