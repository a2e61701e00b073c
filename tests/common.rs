//! Test helper utilities for embedwire integration tests
//!
//! Shared fixtures for the wiremock-backed suites.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use embedwire::{ConnectionConfig, EmbeddingConfig, RetryPolicy};
use std::collections::HashMap;
use std::time::Duration;

/// Shared connection level pointed at a mock server.
pub fn shared_connection(base_url: String) -> ConnectionConfig {
    ConnectionConfig {
        base_url,
        api_key: "test-key".to_string(),
        headers: HashMap::new(),
    }
}

/// Feature level with defaults and no overrides.
pub fn embedding_config() -> EmbeddingConfig {
    EmbeddingConfig::new()
}

/// Retry policy with short delays suitable for tests.
pub fn fast_retry_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        total_timeout: Duration::from_secs(10),
        request_timeout: Duration::from_secs(5),
    }
}

/// A well-formed embeddings response with two vectors in request order.
pub fn success_response_body() -> serde_json::Value {
    serde_json::json!({
        "object": "list",
        "data": [
            { "object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3] },
            { "object": "embedding", "index": 1, "embedding": [0.4, 0.5, 0.6] }
        ],
        "model": "text-embedding-ada-002",
        "usage": { "prompt_tokens": 8, "total_tokens": 8 }
    })
}
