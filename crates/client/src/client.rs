//! Document client
//!
//! | Method | HTTP | Retried on conflict |
//! |--------|------|---------------------|
//! | `fetch_document` | GET | no |
//! | `put_document` | PUT | no |
//! | `append_item` | POST `{path, value}` | yes |
//! | `patch_item` | PATCH `{path, value}` | yes |
//! | `delete_item` | DELETE `{path, id}` | yes |

use crate::config::ClientConfig;
use docsync_concurrency::{ConflictRetry, RetryConfig};
use docsync_core::{DocName, DocPath, Error, JsonValue, Result, VersionToken, Versioned};
use reqwest::{header, Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Successful mutation response body
#[derive(Debug, Deserialize)]
struct MutationResponse {
    data: JsonValue,
}

/// Client for one docsync server
#[derive(Debug, Clone)]
pub struct DocumentClient {
    http: reqwest::Client,
    base_url: Url,
    retry: ConflictRetry,
}

impl DocumentClient {
    /// Build a client from `config`
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::invalid_input(format!("invalid base URL {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_input(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| Error::upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            retry: ConflictRetry::new(config.retry),
        })
    }

    /// Client for a server at `base_url` with default settings
    pub fn connect(base_url: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Copy of this client with a different attempt bound for mutations
    pub fn with_max_retries(&self, max_retries: u32) -> Self {
        self.with_retry_config(self.retry.config().clone().with_max_retries(max_retries))
    }

    /// Copy of this client with a different retry policy
    pub fn with_retry_config(&self, retry: RetryConfig) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            retry: ConflictRetry::new(retry),
        }
    }

    /// The retry policy applied to mutations
    pub fn retry_config(&self) -> &RetryConfig {
        self.retry.config()
    }

    /// `<base>/documents/<name>`, with the name percent-encoded as one segment
    fn url(&self, name: &DocName) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["documents", name.as_str()]);
        }
        url
    }

    /// Fetch a document and its version
    ///
    /// A missing document surfaces as [`Error::NotFound`].
    pub async fn fetch_document(&self, name: &DocName) -> Result<Versioned<JsonValue>> {
        let (version, bytes) = self.send(Method::GET, name, None).await?;
        let document = JsonValue::from_slice(&bytes)?;
        Ok(Versioned::new(document, version))
    }

    /// Create or replace a whole document
    pub async fn put_document(&self, name: &DocName, document: &JsonValue) -> Result<VersionToken> {
        let body = serde_json::to_value(document)?;
        let (version, _) = self.send(Method::PUT, name, Some(&body)).await?;
        Ok(version)
    }

    /// Append `value` to the array at `path`, retrying on conflict
    pub async fn append_item(
        &self,
        name: &DocName,
        path: &DocPath,
        value: impl Into<JsonValue>,
    ) -> Result<Versioned<JsonValue>> {
        let value: JsonValue = value.into();
        let body = json!({ "path": path.to_string(), "value": value });
        self.mutate(Method::POST, name, body).await
    }

    /// Remove the element with `id` from the array at `path`, retrying on conflict
    pub async fn delete_item(
        &self,
        name: &DocName,
        path: &DocPath,
        id: impl Into<JsonValue>,
    ) -> Result<Versioned<JsonValue>> {
        let id: JsonValue = id.into();
        let body = json!({ "path": path.to_string(), "id": id });
        self.mutate(Method::DELETE, name, body).await
    }

    /// Set the field at `path` to `value`, retrying on conflict
    pub async fn patch_item(
        &self,
        name: &DocName,
        path: &DocPath,
        value: impl Into<JsonValue>,
    ) -> Result<Versioned<JsonValue>> {
        let value: JsonValue = value.into();
        let body = json!({ "path": path.to_string(), "value": value });
        self.mutate(Method::PATCH, name, body).await
    }

    async fn mutate(&self, method: Method, name: &DocName, body: Value) -> Result<Versioned<JsonValue>> {
        let (method, body) = (&method, &body);
        self.retry
            .perform(move || async move {
                let (version, bytes) = self.send(method.clone(), name, Some(body)).await?;
                let response: MutationResponse = serde_json::from_slice(&bytes)?;
                Ok(Versioned::new(response.data, version))
            })
            .await
    }

    /// One request; non-2xx statuses become typed errors
    async fn send(
        &self,
        method: Method,
        name: &DocName,
        body: Option<&Value>,
    ) -> Result<(VersionToken, Vec<u8>)> {
        debug!(%method, doc = %name, "Sending request");
        let mut request = self.http.request(method, self.url(name));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        let version = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(VersionToken::new);
        let bytes = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(decode_error(status, &bytes, name));
        }
        let version = version.ok_or_else(|| Error::upstream("response carried no ETag"))?;
        Ok((version, bytes.to_vec()))
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::upstream(format!("request failed: {e}"))
}

/// Rebuild the server's error from its body, falling back to the status
fn decode_error(status: StatusCode, body: &[u8], name: &DocName) -> Error {
    if let Ok(error) = serde_json::from_slice::<Error>(body) {
        return error;
    }
    let text = String::from_utf8_lossy(body);
    match status {
        StatusCode::NOT_FOUND => Error::not_found(name.as_str()),
        StatusCode::CONFLICT => Error::conflict(name.as_str(), VersionToken::new(""), None),
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => {
            Error::invalid_input(text.into_owned())
        }
        _ => Error::upstream(format!("HTTP {status}: {text}")),
    }
}
