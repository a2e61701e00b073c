//! Composition root: conditional construction and registration of the
//! embedding-model capability.
//!
//! Registration is guarded by plain predicates, evaluated once at startup:
//! - the OpenAI client capability is compiled in (`openai` cargo feature);
//! - the selection property names this provider or is absent;
//! - no model is already registered (first registration wins).
//!
//! A failed condition is a silent skip, not an error. Only an unresolvable
//! connection configuration produces an error, and that one is meant to
//! abort startup.

use crate::logging::log_debug;
use crate::model::EmbeddingModel;
use std::sync::{Arc, RwLock};

#[cfg(feature = "openai")]
use crate::api::{OpenAiApiBuilder, ResponseErrorHandler};
#[cfg(feature = "openai")]
use crate::config::{resolve_connection, ConnectionConfig, EmbeddingConfig, ModelSelection};
#[cfg(feature = "openai")]
use crate::error::EmbedResult;
#[cfg(feature = "openai")]
use crate::model::{ObservationConvention, OpenAiEmbeddingModel};
#[cfg(feature = "openai")]
use crate::retry::RetryPolicy;

/// Process-wide slot for the embedding-model capability.
///
/// Holds at most one [`EmbeddingModel`]. Registration is first-wins; the
/// lock exists so the registry type is shareable, not because concurrent
/// registration is expected - wiring runs once at startup.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    embedding_model: RwLock<Option<Arc<dyn EmbeddingModel>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered embedding model, if any.
    pub fn embedding_model(&self) -> Option<Arc<dyn EmbeddingModel>> {
        self.embedding_model
            .read()
            .expect("registry lock poisoned")
            .clone()
    }

    /// Whether the capability slot is occupied.
    pub fn has_embedding_model(&self) -> bool {
        self.embedding_model
            .read()
            .expect("registry lock poisoned")
            .is_some()
    }

    /// Register a model. Returns `false` (and keeps the existing instance)
    /// when the slot is already occupied.
    pub fn register_embedding_model(&self, model: Arc<dyn EmbeddingModel>) -> bool {
        let mut slot = self.embedding_model.write().expect("registry lock poisoned");
        if slot.is_some() {
            log_debug!(
                provider = model.provider_name(),
                "Embedding model already registered, keeping existing instance"
            );
            return false;
        }

        log_debug!(
            provider = model.provider_name(),
            model = model.model_name(),
            "Embedding model registered"
        );
        *slot = Some(model);
        true
    }
}

/// Why a registration attempt did not construct anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The selection property names a different provider.
    ProviderNotSelected,
    /// Another model already occupies the capability slot.
    AlreadyRegistered,
}

/// Outcome of a conditional registration attempt.
#[derive(Debug)]
pub enum Registration {
    /// All conditions held; the model was constructed and registered.
    Registered(Arc<dyn EmbeddingModel>),
    /// A condition failed; nothing was constructed. Not an error.
    Skipped(SkipReason),
}

impl Registration {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

/// Optional collaborators for wiring, each defaulted when absent.
///
/// Optional collaborators are plain parameters instead of lookups: a caller
/// that has a shared transport handle, a tuned retry policy, a custom error
/// handler, or a naming convention passes them; everyone else takes the
/// defaults resolved once at composition time.
#[cfg(feature = "openai")]
#[derive(Debug, Default)]
pub struct WiringDeps {
    pub http_client: Option<reqwest::Client>,
    pub retry_policy: Option<RetryPolicy>,
    pub response_error_handler: Option<Arc<dyn ResponseErrorHandler>>,
    pub observation_convention: Option<Arc<dyn ObservationConvention>>,
}

/// Conditionally construct and register the OpenAI embedding model.
///
/// Evaluates the guard conditions; when they hold, resolves the connection
/// configuration, assembles the API client, wraps it into
/// [`OpenAiEmbeddingModel`] with the retry policy and optional observation
/// convention, and registers it under the embedding capability.
///
/// # Errors
///
/// Returns [`crate::error::EmbedError::ConfigurationError`] when the guard
/// conditions hold but the connection cannot be resolved or the client
/// cannot be built - a startup-fatal misconfiguration. Unmet conditions are
/// reported as [`Registration::Skipped`], never as errors.
#[cfg(feature = "openai")]
pub fn register_openai_embedding_model(
    registry: &ModelRegistry,
    selection: &ModelSelection,
    shared: &ConnectionConfig,
    embedding: &EmbeddingConfig,
    deps: WiringDeps,
) -> EmbedResult<Registration> {
    if !selection.is_active("openai") {
        log_debug!(
            provider = "openai",
            "Embedding provider not selected, skipping registration"
        );
        return Ok(Registration::Skipped(SkipReason::ProviderNotSelected));
    }

    if registry.has_embedding_model() {
        log_debug!(
            provider = "openai",
            "Embedding model already registered, skipping construction"
        );
        return Ok(Registration::Skipped(SkipReason::AlreadyRegistered));
    }

    let resolved = resolve_connection(shared, embedding, "embedding")?;

    let mut builder = OpenAiApiBuilder::from_resolved(&resolved)
        .embeddings_path(embedding.embeddings_path.clone());
    if let Some(client) = deps.http_client {
        builder = builder.http_client(client);
    }
    if let Some(handler) = deps.response_error_handler {
        builder = builder.response_error_handler(handler);
    }
    let api = builder.build()?;

    let mut model = OpenAiEmbeddingModel::new(
        api,
        embedding.metadata_mode,
        embedding.options.clone(),
        deps.retry_policy.unwrap_or_default(),
    );
    if let Some(convention) = deps.observation_convention {
        model.set_observation_convention(convention);
    }

    let model: Arc<dyn EmbeddingModel> = Arc::new(model);
    if registry.register_embedding_model(model.clone()) {
        Ok(Registration::Registered(model))
    } else {
        Ok(Registration::Skipped(SkipReason::AlreadyRegistered))
    }
}
