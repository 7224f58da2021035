//! HTTP surface
//!
//! One resource per document:
//!
//! | Method | Path | Body | Success |
//! |--------|------|------|---------|
//! | GET | `/documents/{name}` | - | document JSON |
//! | PUT | `/documents/{name}` | document JSON | `{success: true}` |
//! | POST | `/documents/{name}` | `{path, value}` | `{success: true, data}` |
//! | PATCH | `/documents/{name}` | `{path, value}` | `{success: true, data}` |
//! | DELETE | `/documents/{name}` | `{path, id}` | `{success: true, data}` |
//!
//! `data` is always the whole post-mutation document. Successful responses
//! carry the document's version in the `ETag` header. Handlers hold no state
//! between requests; a conflicting mutation is answered with 409 and the
//! caller re-runs it.

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use docsync_core::{DocName, DocPath, Error, JsonValue, Result, VersionToken, Versioned};
use docsync_engine::MutationEngine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Health endpoint path
pub const HEALTH_PATH: &str = "/health";
/// Document resource path
pub const DOCUMENT_PATH: &str = "/documents/{name}";

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Engine every request goes through
    pub engine: MutationEngine,
    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    /// State with the default body limit
    pub fn new(engine: MutationEngine) -> Self {
        Self {
            engine,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Set the request body limit
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Build health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health))
}

/// Build document routes
pub fn document_routes() -> Router<AppState> {
    Router::new().route(
        DOCUMENT_PATH,
        get(get_document)
            .put(put_document)
            .post(append_item)
            .patch(patch_item)
            .delete(delete_item),
    )
}

/// Full application router with tracing, CORS and the body limit applied
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::ETAG]);

    Router::new()
        .merge(health_routes())
        .merge(document_routes())
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

// =============================================================================
// Request bodies
// =============================================================================

/// Distinguishes an explicit `null` from an absent field
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// POST / PATCH body
#[derive(Debug, Deserialize)]
struct ValueBody {
    path: Option<String>,
    #[serde(default, deserialize_with = "present")]
    value: Option<Value>,
}

/// DELETE body
#[derive(Debug, Deserialize)]
struct IdBody {
    path: Option<String>,
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| Error::invalid_input(format!("malformed request body: {e}")))
}

fn require_path(path: Option<String>) -> Result<DocPath> {
    let raw = path.ok_or_else(|| Error::invalid_input("missing path"))?;
    Ok(raw.parse::<DocPath>()?)
}

fn require<T>(field: Option<T>, name: &str) -> Result<T> {
    field.ok_or_else(|| Error::invalid_input(format!("missing {name}")))
}

fn doc_name(raw: String) -> Result<DocName> {
    DocName::new(raw)
}

// =============================================================================
// Responses
// =============================================================================

fn with_etag(version: &VersionToken, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    if let Ok(value) = HeaderValue::from_str(&version.to_etag()) {
        response.headers_mut().insert(header::ETAG, value);
    }
    response
}

fn mutation_response(result: Versioned<JsonValue>) -> Response {
    let (document, version) = result.into_parts();
    with_etag(&version, Json(json!({ "success": true, "data": document })))
}

// =============================================================================
// Handlers
// =============================================================================

async fn get_document(
    State(st): State<AppState>,
    Path(name): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let name = doc_name(name)?;
    let (document, version) = st.engine.fetch(&name).await?.into_parts();
    Ok(with_etag(&version, Json(document)))
}

async fn put_document(
    State(st): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> std::result::Result<Response, ApiError> {
    let name = doc_name(name)?;
    let document = JsonValue::from_slice(&body)
        .map_err(|e| Error::invalid_input(format!("document is not valid JSON: {e}")))?;
    let version = st.engine.replace(&name, document).await?;
    Ok(with_etag(&version, Json(json!({ "success": true }))))
}

async fn append_item(
    State(st): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> std::result::Result<Response, ApiError> {
    let name = doc_name(name)?;
    let req: ValueBody = parse_body(&body)?;
    let path = require_path(req.path)?;
    let value = require(req.value, "value")?;
    let result = st.engine.append(&name, path, value.into()).await?;
    Ok(mutation_response(result))
}

async fn patch_item(
    State(st): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> std::result::Result<Response, ApiError> {
    let name = doc_name(name)?;
    let req: ValueBody = parse_body(&body)?;
    let path = require_path(req.path)?;
    let value = require(req.value, "value")?;
    let result = st.engine.patch_field(&name, path, value.into()).await?;
    Ok(mutation_response(result))
}

async fn delete_item(
    State(st): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> std::result::Result<Response, ApiError> {
    let name = doc_name(name)?;
    let req: IdBody = parse_body(&body)?;
    let path = require_path(req.path)?;
    let id = require(req.id, "id")?;
    let result = st.engine.remove_by_id(&name, path, id.into()).await?;
    Ok(mutation_response(result))
}
