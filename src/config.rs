//! Connection and embedding configuration.
//!
//! Configuration is supplied at two levels: a shared [`ConnectionConfig`]
//! (where to reach the service) and a feature-level [`EmbeddingConfig`]
//! (embedding-specific settings plus optional connection overrides). The two
//! levels are merged by [`resolve_connection`], with feature overrides taking
//! precedence, into a single [`ResolvedConnection`] that parameterizes the
//! API client.
//!
//! Loading is explicit: [`ConnectionConfig::from_env`] and the
//! `from_section` constructors parse plain key/value data, validated eagerly.
//! There is no reflection and no container; the composition root in
//! [`crate::registry`] calls these directly at startup.

use crate::error::{EmbedError, EmbedResult};
use crate::logging::log_debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default base URL for OpenAI-compatible services.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default chat completions endpoint path.
pub const DEFAULT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Default embeddings endpoint path.
pub const DEFAULT_EMBEDDINGS_PATH: &str = "/v1/embeddings";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Environment/section key selecting the active embedding provider.
pub const EMBEDDING_MODEL_SELECTION_KEY: &str = "embedding.model";

/// Shared connection configuration: where and how to reach the service.
///
/// This is the common level. Feature configurations may override any of
/// these fields; see [`resolve_connection`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the service, without a trailing endpoint path.
    pub base_url: String,
    /// API credential sent as a bearer token.
    pub api_key: String,
    /// Extra headers attached to every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            headers: HashMap::new(),
        }
    }
}

impl ConnectionConfig {
    /// Load the shared connection level from environment variables.
    ///
    /// Reads `OPENAI_BASE_URL` (falling back to the OpenAI default) and
    /// `OPENAI_API_KEY`. Missing credentials are not an error here; they
    /// surface during resolution if the feature level doesn't supply them.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            config.api_key = api_key;
        }

        log_debug!(
            base_url = %config.base_url,
            has_api_key = !config.api_key.is_empty(),
            "Loaded shared connection configuration from environment"
        );

        config
    }

    /// Create the shared connection level from a parsed key/value section.
    ///
    /// Recognized keys: `base_url`, `api_key`, and `headers.<name>` entries
    /// which become request headers.
    pub fn from_section(section: &HashMap<String, String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = section.get("base_url") {
            config.base_url = base_url.clone();
        }
        if let Some(api_key) = section.get("api_key") {
            config.api_key = api_key.clone();
        }
        config.headers = parse_header_entries(section);
        config
    }
}

/// How document metadata participates in the text sent for embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataMode {
    /// Include all metadata alongside the content.
    All,
    /// Include metadata intended for embedding.
    #[default]
    Embed,
    /// Content only; metadata is reserved for inference time.
    Inference,
    /// Content only.
    None,
}

impl MetadataMode {
    /// Parse a mode name as it appears in configuration sections.
    pub fn parse(value: &str) -> EmbedResult<Self> {
        match value.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "embed" => Ok(Self::Embed),
            "inference" => Ok(Self::Inference),
            "none" => Ok(Self::None),
            other => Err(EmbedError::configuration_error(format!(
                "Unknown metadata mode: {other}. Expected all, embed, inference, or none"
            ))),
        }
    }
}

/// Request options forwarded to the embeddings endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingOptions {
    /// Model name sent with every embedding request.
    pub model: String,
    /// Requested output dimensionality, when the model supports shortening.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    /// Wire encoding for the returned vectors ("float" or "base64").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    /// End-user identifier forwarded for provider-side abuse monitoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for EmbeddingOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: None,
            encoding_format: None,
            user: None,
        }
    }
}

/// Feature-level embedding configuration.
///
/// Extends the shared connection level with embedding-specific settings.
/// Connection fields here are *overrides*: `None` falls back to the shared
/// value, while an explicit value wins even when it is empty - an empty
/// override is an intentional misconfiguration and fails resolution rather
/// than being silently masked by the shared default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL override for embedding traffic.
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key override for embedding traffic.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Headers merged on top of the shared headers (override wins per key).
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Embeddings endpoint path, appended to the resolved base URL.
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: String,
    /// How document metadata participates in embedded text.
    #[serde(default)]
    pub metadata_mode: MetadataMode,
    /// Request options forwarded to the endpoint.
    #[serde(default)]
    pub options: EmbeddingOptions,
}

fn default_embeddings_path() -> String {
    DEFAULT_EMBEDDINGS_PATH.to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            headers: HashMap::new(),
            embeddings_path: default_embeddings_path(),
            metadata_mode: MetadataMode::default(),
            options: EmbeddingOptions::default(),
        }
    }
}

impl EmbeddingConfig {
    /// Create an embedding configuration with defaults and no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the feature level from a parsed key/value section.
    ///
    /// Recognized keys: `base_url`, `api_key`, `headers.<name>`,
    /// `embeddings_path`, `metadata_mode`, `model`, `dimensions`,
    /// `encoding_format`, `user`.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::ConfigurationError`] if `metadata_mode` names
    /// an unknown mode or `dimensions` is not an unsigned integer.
    pub fn from_section(section: &HashMap<String, String>) -> EmbedResult<Self> {
        let mut config = Self::new();
        config.base_url = section.get("base_url").cloned();
        config.api_key = section.get("api_key").cloned();
        config.headers = parse_header_entries(section);

        if let Some(path) = section.get("embeddings_path") {
            config.embeddings_path = path.clone();
        }
        if let Some(mode) = section.get("metadata_mode") {
            config.metadata_mode = MetadataMode::parse(mode)?;
        }
        if let Some(model) = section.get("model") {
            config.options.model = model.clone();
        }
        if let Some(dimensions) = section.get("dimensions") {
            config.options.dimensions = Some(dimensions.parse::<u32>().map_err(|e| {
                EmbedError::configuration_error(format!("Invalid dimensions value: {e}"))
            })?);
        }
        config.options.encoding_format = section.get("encoding_format").cloned();
        config.options.user = section.get("user").cloned();

        Ok(config)
    }
}

/// Collect `headers.<name>` entries from a flat key/value section.
fn parse_header_entries(section: &HashMap<String, String>) -> HashMap<String, String> {
    section
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix("headers.")
                .map(|name| (name.to_string(), value.clone()))
        })
        .collect()
}

/// Connection configuration after merging the shared and feature levels.
///
/// Guaranteed non-empty `base_url` and `api_key`; [`resolve_connection`]
/// refuses to produce a value otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    pub base_url: String,
    pub api_key: String,
    pub headers: HashMap<String, String>,
}

/// Merge the shared connection level with the feature-level overrides.
///
/// Precedence per field: the feature override wins when set, otherwise the
/// shared value is used. An explicitly set override is taken as-is, so an
/// empty override fails the emptiness check below instead of falling back.
/// Header maps are merged over their key union with the feature side winning
/// on collisions.
///
/// `model_kind` only labels diagnostics (e.g. "embedding"); it never
/// branches the merge.
///
/// # Errors
///
/// Returns [`EmbedError::ConfigurationError`] when the resolved base URL or
/// API key is empty - neither level supplied the field, or an override
/// suppressed it. This is a startup-fatal misconfiguration.
pub fn resolve_connection(
    shared: &ConnectionConfig,
    feature: &EmbeddingConfig,
    model_kind: &str,
) -> EmbedResult<ResolvedConnection> {
    let base_url = feature
        .base_url
        .clone()
        .unwrap_or_else(|| shared.base_url.clone());
    let api_key = feature
        .api_key
        .clone()
        .unwrap_or_else(|| shared.api_key.clone());

    let mut headers = shared.headers.clone();
    headers.extend(
        feature
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    if base_url.trim().is_empty() {
        return Err(EmbedError::configuration_error(format!(
            "Base URL for the {model_kind} model is empty: set the shared base_url or the {model_kind} override"
        )));
    }
    if api_key.trim().is_empty() {
        return Err(EmbedError::configuration_error(format!(
            "API key for the {model_kind} model is empty: set the shared api_key or the {model_kind} override"
        )));
    }

    log_debug!(
        model_kind = model_kind,
        base_url = %base_url,
        header_count = headers.len(),
        base_url_overridden = feature.base_url.is_some(),
        api_key_overridden = feature.api_key.is_some(),
        "Resolved connection configuration"
    );

    Ok(ResolvedConnection {
        base_url,
        api_key,
        headers,
    })
}

/// The provider-selection property controlling which embedding provider the
/// composition root activates.
///
/// Absence means "active" - a process that never sets the property gets the
/// default provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSelection(Option<String>);

impl ModelSelection {
    /// Selection with an explicit provider value.
    pub fn some(provider: impl Into<String>) -> Self {
        Self(Some(provider.into()))
    }

    /// Unset selection; every provider considers itself active.
    pub fn unset() -> Self {
        Self(None)
    }

    /// Read the selection from the `EMBEDDING_MODEL` environment variable.
    pub fn from_env() -> Self {
        Self(std::env::var("EMBEDDING_MODEL").ok())
    }

    /// Read the selection from a parsed key/value section.
    pub fn from_section(section: &HashMap<String, String>) -> Self {
        Self(section.get(EMBEDDING_MODEL_SELECTION_KEY).cloned())
    }

    /// Whether the named provider is the active selection.
    ///
    /// True when the property is absent or equals `provider` exactly.
    pub fn is_active(&self, provider: &str) -> bool {
        match &self.0 {
            None => true,
            Some(selected) => selected == provider,
        }
    }
}
