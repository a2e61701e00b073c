//! # embedwire
//!
//! Composition-root wiring for OpenAI-compatible embedding model clients.
//!
//! ## Key Features
//!
//! - **Two-level configuration**: shared connection defaults with
//!   feature-level overrides, merged by an explicit resolver
//! - **Builder-assembled client**: immutable API handle carrying base URL,
//!   credential, headers, and endpoint paths
//! - **Conditional registration**: plain startup predicates decide whether
//!   the model is constructed; first registration wins, skips are silent
//! - **Resilience**: built-in retry template with exponential backoff
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedwire::{
//!     register_openai_embedding_model, ConnectionConfig, EmbeddingConfig, ModelRegistry,
//!     ModelSelection, WiringDeps,
//! };
//!
//! # fn example() -> embedwire::EmbedResult<()> {
//! let registry = ModelRegistry::new();
//! let shared = ConnectionConfig::from_env();
//! let embedding = EmbeddingConfig::new();
//!
//! let registration = register_openai_embedding_model(
//!     &registry,
//!     &ModelSelection::from_env(),
//!     &shared,
//!     &embedding,
//!     WiringDeps::default(),
//! )?;
//!
//! if registration.is_registered() {
//!     let model = registry.embedding_model().expect("just registered");
//!     // Use model.embed(...) for actual requests
//! }
//! # Ok(())
//! # }
//! ```

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod retry;

#[cfg(feature = "openai")]
pub mod api;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use config::{
    resolve_connection, ConnectionConfig, EmbeddingConfig, EmbeddingOptions, MetadataMode,
    ModelSelection, ResolvedConnection, DEFAULT_BASE_URL, DEFAULT_COMPLETIONS_PATH,
    DEFAULT_EMBEDDINGS_PATH, DEFAULT_EMBEDDING_MODEL,
};
pub use error::{EmbedError, EmbedResult};
pub use model::{
    DefaultObservationConvention, Document, EmbeddingModel, ObservationConvention,
};
pub use registry::{ModelRegistry, Registration, SkipReason};
pub use retry::{RetryExecutor, RetryPolicy};

#[cfg(feature = "openai")]
pub use api::{
    DefaultResponseErrorHandler, EmbeddingRequest, EmbeddingResponse, OpenAiApi, OpenAiApiBuilder,
    ResponseErrorHandler,
};
#[cfg(feature = "openai")]
pub use model::OpenAiEmbeddingModel;
#[cfg(feature = "openai")]
pub use registry::{register_openai_embedding_model, WiringDeps};
