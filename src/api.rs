//! OpenAI-compatible API client and builder.
//!
//! [`OpenAiApi`] is the immutable client handle assembled by the composition
//! root: resolved base URL, bearer credential, default headers, and the two
//! endpoint paths. It is built once through [`OpenAiApiBuilder`], performs no
//! network I/O at build time, and is safely shared read-only afterwards.
//!
//! Non-success HTTP responses are mapped to [`EmbedError`] by a pluggable
//! [`ResponseErrorHandler`]; [`DefaultResponseErrorHandler`] covers the
//! OpenAI conventions (401 auth failures, 429 with `retry-after`).

use crate::config::{ResolvedConnection, DEFAULT_COMPLETIONS_PATH, DEFAULT_EMBEDDINGS_PATH};
use crate::error::{EmbedError, EmbedResult};
use crate::logging::{log_debug, log_error};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Strategy for turning non-success HTTP responses into [`EmbedError`]s.
pub trait ResponseErrorHandler: Send + Sync + std::fmt::Debug {
    /// Map a non-2xx response to an error. The body has already been read.
    fn handle(&self, status: StatusCode, headers: &HeaderMap, body: &str) -> EmbedError;
}

/// Default OpenAI-convention error mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResponseErrorHandler;

impl ResponseErrorHandler for DefaultResponseErrorHandler {
    fn handle(&self, status: StatusCode, headers: &HeaderMap, body: &str) -> EmbedError {
        log_error!(
            status = %status,
            error_text = %body,
            "API error response"
        );

        match status.as_u16() {
            401 => {
                // Surface key problems distinctly when the body names them
                if let Ok(error_json) = serde_json::from_str::<serde_json::Value>(body) {
                    if let Some(code) = error_json
                        .get("error")
                        .and_then(|e| e.get("code"))
                        .and_then(|c| c.as_str())
                    {
                        if code.contains("api_key") || code.contains("auth") {
                            return EmbedError::authentication_failed(
                                "Invalid API key or authentication failed",
                            );
                        }
                    }
                }
                EmbedError::authentication_failed("Authentication failed")
            }
            429 => {
                let retry_after_seconds = headers
                    .get("retry-after")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);

                EmbedError::rate_limit_exceeded(retry_after_seconds)
            }
            _ => EmbedError::request_failed(format!("API error {status}: {body}"), None),
        }
    }
}

/// Request body for the embeddings endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// One embedding vector out of a batch response.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

/// Response body from the embeddings endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub model: String,
    pub usage: Option<EmbeddingUsage>,
}

/// Immutable OpenAI-compatible API client.
///
/// Constructed once via [`OpenAiApi::builder`] and exclusively owned by the
/// embedding model that wraps it. All requests reuse the same transport
/// handle and prebuilt header set.
#[derive(Debug, Clone)]
pub struct OpenAiApi {
    base_url: String,
    headers: HeaderMap,
    completions_path: String,
    embeddings_path: String,
    client: reqwest::Client,
    error_handler: Arc<dyn ResponseErrorHandler>,
}

impl OpenAiApi {
    /// Start building a client.
    pub fn builder() -> OpenAiApiBuilder {
        OpenAiApiBuilder::default()
    }

    /// The resolved base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The chat completions endpoint path this client was configured with.
    pub fn completions_path(&self) -> &str {
        &self.completions_path
    }

    /// The embeddings endpoint path this client was configured with.
    pub fn embeddings_path(&self) -> &str {
        &self.embeddings_path
    }

    /// The prebuilt headers attached to every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Issue a single embeddings request.
    ///
    /// One POST to `{base_url}{embeddings_path}`, no retry here - callers
    /// wrap this in the retry executor.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::RequestFailed`] on transport failures, the
    /// error handler's mapping for non-2xx statuses, and
    /// [`EmbedError::ResponseParsingError`] for undecodable bodies.
    pub async fn embed(&self, request: &EmbeddingRequest) -> EmbedResult<EmbeddingResponse> {
        let url = format!("{}{}", self.base_url, self.embeddings_path);

        log_debug!(
            url = %url,
            model = %request.model,
            input_count = request.input.len(),
            "Sending embeddings request"
        );

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log_error!(
                    url = %url,
                    error = %e,
                    "HTTP request failed"
                );
                EmbedError::request_failed(format!("Request failed: {e}"), Some(Box::new(e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(self.error_handler.handle(status, &headers, &body));
        }

        let raw_body = response.text().await.map_err(|e| {
            EmbedError::response_parsing_error(format!("Failed to read response: {e}"))
        })?;

        serde_json::from_str(&raw_body).map_err(|e| {
            log_error!(
                error = %e,
                raw_body = %raw_body,
                "Failed to parse embeddings response"
            );
            EmbedError::response_parsing_error(format!("Invalid response: {e}"))
        })
    }
}

/// Builder for [`OpenAiApi`].
///
/// Start from [`OpenAiApiBuilder::from_resolved`] when wiring from a
/// [`ResolvedConnection`]; the free-standing setters exist for tests and
/// manual assembly.
#[derive(Debug, Default)]
pub struct OpenAiApiBuilder {
    base_url: String,
    api_key: String,
    headers: HashMap<String, String>,
    completions_path: Option<String>,
    embeddings_path: Option<String>,
    http_client: Option<reqwest::Client>,
    error_handler: Option<Arc<dyn ResponseErrorHandler>>,
}

impl OpenAiApiBuilder {
    /// Seed the builder from a resolved connection.
    pub fn from_resolved(resolved: &ResolvedConnection) -> Self {
        Self {
            base_url: resolved.base_url.clone(),
            api_key: resolved.api_key.clone(),
            headers: resolved.headers.clone(),
            ..Self::default()
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn completions_path(mut self, path: impl Into<String>) -> Self {
        self.completions_path = Some(path.into());
        self
    }

    pub fn embeddings_path(mut self, path: impl Into<String>) -> Self {
        self.embeddings_path = Some(path.into());
        self
    }

    /// Supply a transport handle; a fresh `reqwest::Client` is used when
    /// absent.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Supply a response error handler; [`DefaultResponseErrorHandler`] is
    /// used when absent.
    pub fn response_error_handler(mut self, handler: Arc<dyn ResponseErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Assemble the immutable client.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::ConfigurationError`] when the base URL, API
    /// key, or either endpoint path is empty, or when a header name/value
    /// is not valid HTTP header content.
    pub fn build(self) -> EmbedResult<OpenAiApi> {
        if self.base_url.trim().is_empty() {
            return Err(EmbedError::configuration_error("Base URL must not be empty"));
        }
        if self.api_key.trim().is_empty() {
            return Err(EmbedError::configuration_error("API key must not be empty"));
        }

        let completions_path = self
            .completions_path
            .unwrap_or_else(|| DEFAULT_COMPLETIONS_PATH.to_string());
        let embeddings_path = self
            .embeddings_path
            .unwrap_or_else(|| DEFAULT_EMBEDDINGS_PATH.to_string());
        if completions_path.trim().is_empty() {
            return Err(EmbedError::configuration_error(
                "Completions path must not be empty",
            ));
        }
        if embeddings_path.trim().is_empty() {
            return Err(EmbedError::configuration_error(
                "Embeddings path must not be empty",
            ));
        }

        let headers = build_request_headers(&self.api_key, &self.headers)?;

        Ok(OpenAiApi {
            base_url: self.base_url,
            headers,
            completions_path,
            embeddings_path,
            client: self.http_client.unwrap_or_default(),
            error_handler: self
                .error_handler
                .unwrap_or_else(|| Arc::new(DefaultResponseErrorHandler)),
        })
    }
}

/// Build the per-request header set: content type, bearer auth, then the
/// configured extra headers.
pub fn build_request_headers(
    api_key: &str,
    extra: &HashMap<String, String>,
) -> EmbedResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| EmbedError::configuration_error(format!("Invalid API key format: {e}")))?,
    );

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| EmbedError::configuration_error(format!("Invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            EmbedError::configuration_error(format!("Invalid value for header {name}: {e}"))
        })?;
        headers.insert(name, value);
    }

    Ok(headers)
}
