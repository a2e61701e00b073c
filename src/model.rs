//! Embedding model capability and the OpenAI-backed implementation.
//!
//! [`EmbeddingModel`] is the capability type the registry stores. The
//! OpenAI implementation wraps the assembled [`OpenAiApi`] together with
//! the metadata mode, request options, the retry template, and an optional
//! observation-naming convention. It adds no protocol logic of its own:
//! transport lives in the client, backoff in the executor.

use crate::config::MetadataMode;
use crate::error::EmbedResult;
use async_trait::async_trait;
use std::collections::HashMap;

#[cfg(feature = "openai")]
use crate::api::{EmbeddingRequest, EmbeddingUsage, OpenAiApi};
#[cfg(feature = "openai")]
use crate::config::EmbeddingOptions;
#[cfg(feature = "openai")]
use crate::error::EmbedError;
#[cfg(feature = "openai")]
use crate::logging::log_debug;
#[cfg(feature = "openai")]
use crate::retry::{RetryExecutor, RetryPolicy};
#[cfg(feature = "openai")]
use std::sync::Arc;
#[cfg(feature = "openai")]
use std::time::Instant;

/// A piece of content to embed, with optional metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub content: String,
    pub metadata: HashMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The text actually sent for embedding under the given metadata mode.
    ///
    /// `All` and `Embed` prepend metadata as sorted `key: value` lines;
    /// `Inference` and `None` send the content alone. Documents here carry
    /// no per-key embed/inference flags, so the pairs collapse.
    pub fn formatted_content(&self, mode: MetadataMode) -> String {
        match mode {
            MetadataMode::All | MetadataMode::Embed => {
                if self.metadata.is_empty() {
                    return self.content.clone();
                }
                let mut entries: Vec<_> = self.metadata.iter().collect();
                entries.sort_by_key(|(key, _)| key.as_str());
                let metadata_text = entries
                    .into_iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{metadata_text}\n\n{}", self.content)
            }
            MetadataMode::Inference | MetadataMode::None => self.content.clone(),
        }
    }
}

/// Naming strategy for emitted observation records.
///
/// Optional collaborator: the composition root attaches one when supplied,
/// otherwise [`DefaultObservationConvention`] labels the records.
pub trait ObservationConvention: Send + Sync + std::fmt::Debug {
    /// Name for one embedding operation against the given model.
    fn operation_name(&self, provider: &str, model: &str) -> String;
}

/// Default `"<provider> embedding <model>"` naming.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObservationConvention;

impl ObservationConvention for DefaultObservationConvention {
    fn operation_name(&self, provider: &str, model: &str) -> String {
        format!("{provider} embedding {model}")
    }
}

/// The capability under which a constructed embedding model is registered.
#[async_trait]
pub trait EmbeddingModel: Send + Sync + std::fmt::Debug {
    /// Embed a batch of raw texts, one vector per input in input order.
    async fn embed(&self, texts: Vec<String>) -> EmbedResult<Vec<Vec<f32>>>;

    /// Embed documents after metadata-mode formatting.
    async fn embed_documents(&self, documents: &[Document]) -> EmbedResult<Vec<Vec<f32>>>;

    /// The model name requests are issued for.
    fn model_name(&self) -> &str;

    /// The provider identifier.
    fn provider_name(&self) -> &'static str;
}

/// OpenAI-backed embedding model.
///
/// Immutable after construction apart from the optional observation
/// convention, which the composition root attaches before registering.
#[cfg(feature = "openai")]
#[derive(Debug)]
pub struct OpenAiEmbeddingModel {
    api: OpenAiApi,
    metadata_mode: MetadataMode,
    options: EmbeddingOptions,
    retry: RetryExecutor,
    observation: Arc<dyn ObservationConvention>,
}

#[cfg(feature = "openai")]
impl OpenAiEmbeddingModel {
    /// Wrap an assembled API client into an embedding model.
    pub fn new(
        api: OpenAiApi,
        metadata_mode: MetadataMode,
        options: EmbeddingOptions,
        retry_policy: RetryPolicy,
    ) -> Self {
        log_debug!(
            provider = "openai",
            model = %options.model,
            metadata_mode = ?metadata_mode,
            base_url = %api.base_url(),
            embeddings_path = %api.embeddings_path(),
            "Creating OpenAI embedding model"
        );

        Self {
            api,
            metadata_mode,
            options,
            retry: RetryExecutor::new(retry_policy),
            observation: Arc::new(DefaultObservationConvention),
        }
    }

    /// Replace the observation-naming convention.
    pub fn set_observation_convention(&mut self, convention: Arc<dyn ObservationConvention>) {
        self.observation = convention;
    }

    /// The wrapped API client.
    pub fn api(&self) -> &OpenAiApi {
        &self.api
    }

    /// The configured metadata mode.
    pub fn metadata_mode(&self) -> MetadataMode {
        self.metadata_mode
    }

    /// The configured request options.
    pub fn options(&self) -> &EmbeddingOptions {
        &self.options
    }

    fn build_request(&self, input: Vec<String>) -> EmbeddingRequest {
        EmbeddingRequest {
            model: self.options.model.clone(),
            input,
            dimensions: self.options.dimensions,
            encoding_format: self.options.encoding_format.clone(),
            user: self.options.user.clone(),
        }
    }

    fn log_usage(&self, usage: Option<EmbeddingUsage>, count: usize, started: Instant) {
        let operation = self
            .observation
            .operation_name(self.provider_name(), &self.options.model);
        log_debug!(
            operation = %operation,
            embedding_count = count,
            prompt_tokens = usage.map(|u| u.prompt_tokens).unwrap_or(0),
            total_tokens = usage.map(|u| u.total_tokens).unwrap_or(0),
            duration_ms = started.elapsed().as_millis(),
            "Embedding request completed"
        );
    }
}

#[cfg(feature = "openai")]
#[async_trait]
impl EmbeddingModel for OpenAiEmbeddingModel {
    async fn embed(&self, texts: Vec<String>) -> EmbedResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let request = self.build_request(texts);
        let response = self.retry.execute(|| self.api.embed(&request)).await?;

        if response.data.len() != request.input.len() {
            return Err(EmbedError::response_parsing_error(format!(
                "Expected {} embeddings, got {}",
                request.input.len(),
                response.data.len()
            )));
        }

        self.log_usage(response.usage, response.data.len(), started);

        // Providers may return batch entries out of order; index is canonical
        let mut data = response.data;
        data.sort_by_key(|entry| entry.index);
        Ok(data.into_iter().map(|entry| entry.embedding).collect())
    }

    async fn embed_documents(&self, documents: &[Document]) -> EmbedResult<Vec<Vec<f32>>> {
        let texts = documents
            .iter()
            .map(|doc| doc.formatted_content(self.metadata_mode))
            .collect();
        self.embed(texts).await
    }

    fn model_name(&self) -> &str {
        &self.options.model
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
