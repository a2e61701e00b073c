//! Test helper utilities for embedwire unit tests
//!
//! Reusable fixtures shared across test modules.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use crate::config::{ConnectionConfig, EmbeddingConfig};
use std::collections::HashMap;

/// Shared connection level with a complete, valid configuration.
pub fn shared_connection() -> ConnectionConfig {
    ConnectionConfig {
        base_url: "https://api.openai.com".to_string(),
        api_key: "shared-key".to_string(),
        headers: HashMap::from([("x-org".to_string(), "shared-org".to_string())]),
    }
}

/// Shared connection level with no credential and no headers.
pub fn bare_shared_connection() -> ConnectionConfig {
    ConnectionConfig {
        base_url: String::new(),
        api_key: String::new(),
        headers: HashMap::new(),
    }
}

/// Feature level with no overrides and default embedding settings.
pub fn plain_embedding_config() -> EmbeddingConfig {
    EmbeddingConfig::new()
}

/// Feature level overriding every connection field.
pub fn overriding_embedding_config() -> EmbeddingConfig {
    let mut config = EmbeddingConfig::new();
    config.base_url = Some("https://embeddings.example.com".to_string());
    config.api_key = Some("feature-key".to_string());
    config.headers = HashMap::from([("x-org".to_string(), "feature-org".to_string())]);
    config
}

/// Build a flat key/value section from string pairs.
pub fn section(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
