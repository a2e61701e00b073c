//! Integration Tests for OpenAI Embedding Model HTTP Handling
//!
//! UNIT UNDER TEST: OpenAiEmbeddingModel request execution
//!
//! BUSINESS RESPONSIBILITY:
//!   - Execute HTTP requests to the embeddings endpoint with authentication
//!   - Parse successful responses into vectors in input order
//!   - Handle API errors (401, 429, 500)
//!   - Apply retry logic for transient failures
//!   - Format documents per the configured metadata mode
//!
//! TEST COVERAGE:
//!   - Successful requests, auth header, and response ordering
//!   - Authentication errors (401)
//!   - Rate limiting errors (429)
//!   - Server error then recovery (500 -> 200)
//!   - Document metadata formatting on the wire
//!   - Empty input short-circuits without network traffic

mod common;

use common::{embedding_config, fast_retry_policy, shared_connection, success_response_body};
use embedwire::{
    resolve_connection, Document, EmbedError, EmbeddingModel, EmbeddingOptions, OpenAiApiBuilder,
    OpenAiEmbeddingModel, RetryPolicy,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn build_model(server: &MockServer, retry_policy: RetryPolicy) -> OpenAiEmbeddingModel {
    let shared = shared_connection(server.uri());
    let embedding = embedding_config();
    let resolved = resolve_connection(&shared, &embedding, "embedding").unwrap();

    let api = OpenAiApiBuilder::from_resolved(&resolved)
        .embeddings_path(embedding.embeddings_path.clone())
        .build()
        .unwrap();

    OpenAiEmbeddingModel::new(
        api,
        embedding.metadata_mode,
        embedding.options.clone(),
        retry_policy,
    )
}

#[tokio::test]
async fn test_successful_embedding_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_response_body()))
        .expect(1)
        .mount(&server)
        .await;

    let model = build_model(&server, fast_retry_policy(2)).await;
    let vectors = model
        .embed(vec!["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0], vec![0.1, 0.2, 0.3]);
    assert_eq!(vectors[1], vec![0.4, 0.5, 0.6]);
}

#[tokio::test]
async fn test_out_of_order_batch_is_reordered_by_index() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "object": "list",
        "data": [
            { "object": "embedding", "index": 1, "embedding": [1.0] },
            { "object": "embedding", "index": 0, "embedding": [0.0] }
        ],
        "model": "text-embedding-ada-002",
        "usage": { "prompt_tokens": 2, "total_tokens": 2 }
    });
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let model = build_model(&server, fast_retry_policy(2)).await;
    let vectors = model
        .embed(vec!["a".to_string(), "b".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![0.0], vec![1.0]]);
}

#[tokio::test]
async fn test_request_carries_configured_model_and_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(serde_json::json!({
            "model": "text-embedding-3-small",
            "dimensions": 256,
            "input": ["hello"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [ { "object": "embedding", "index": 0, "embedding": [0.5] } ],
            "model": "text-embedding-3-small",
            "usage": { "prompt_tokens": 1, "total_tokens": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let shared = shared_connection(server.uri());
    let mut embedding = embedding_config();
    embedding.options = EmbeddingOptions {
        model: "text-embedding-3-small".to_string(),
        dimensions: Some(256),
        ..EmbeddingOptions::default()
    };
    let resolved = resolve_connection(&shared, &embedding, "embedding").unwrap();
    let api = OpenAiApiBuilder::from_resolved(&resolved).build().unwrap();
    let model = OpenAiEmbeddingModel::new(
        api,
        embedding.metadata_mode,
        embedding.options.clone(),
        fast_retry_policy(2),
    );

    let vectors = model.embed(vec!["hello".to_string()]).await.unwrap();

    assert_eq!(vectors, vec![vec![0.5]]);
}

#[tokio::test]
async fn test_documents_are_formatted_before_embedding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(serde_json::json!({
            "input": ["source: wiki\n\nhello world"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [ { "object": "embedding", "index": 0, "embedding": [0.9] } ],
            "model": "text-embedding-ada-002",
            "usage": { "prompt_tokens": 4, "total_tokens": 4 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = build_model(&server, fast_retry_policy(2)).await;
    let documents = vec![Document::new("hello world").with_metadata("source", "wiki")];

    let vectors = model.embed_documents(&documents).await.unwrap();

    assert_eq!(vectors, vec![vec![0.9]]);
}

#[tokio::test]
async fn test_authentication_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"error": {"code": "invalid_api_key", "message": "bad key"}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let model = build_model(&server, fast_retry_policy(3)).await;
    let result = model.embed(vec!["hello".to_string()]).await;

    assert!(matches!(
        result,
        Err(EmbedError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn test_rate_limit_error_surfaces_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1")
                .set_body_string("slow down"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let model = build_model(&server, fast_retry_policy(2)).await;
    let result = model.embed(vec!["hello".to_string()]).await;

    assert!(matches!(
        result,
        Err(EmbedError::RateLimitExceeded {
            retry_after_seconds: 1
        })
    ));
}

#[tokio::test]
async fn test_server_error_then_recovery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("transient"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_response_body()))
        .expect(1)
        .mount(&server)
        .await;

    let model = build_model(&server, fast_retry_policy(3)).await;
    let vectors = model
        .embed(vec!["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors.len(), 2);
}

#[tokio::test]
async fn test_malformed_response_is_a_parsing_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let model = build_model(&server, fast_retry_policy(2)).await;
    let result = model.embed(vec!["hello".to_string()]).await;

    assert!(matches!(
        result,
        Err(EmbedError::ResponseParsingError { .. })
    ));
}

#[tokio::test]
async fn test_empty_input_skips_the_network() {
    // No mock mounted: any request would fail the test via connect error

    let server = MockServer::start().await;
    let model = build_model(&server, fast_retry_policy(2)).await;

    let vectors = model.embed(Vec::new()).await.unwrap();

    assert!(vectors.is_empty());
}
