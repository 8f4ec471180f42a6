#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Regression tests for parcel-oracle: OracleConfig, OpenAiBackend wire
//! contract, and OracleClient retry behaviour against a mock HTTP server.

use parcel_core::{Message, OracleError};
use parcel_oracle::{
    CompletionBackend, OpenAiBackend, OracleClient, OracleConfig, OracleProvider, RetryPolicy,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> OracleConfig {
    OracleConfig {
        api_key: Some("sk-test".to_string()),
        api_base_url: Some(server.uri()),
        timeout_secs: 5,
        retry_policy: RetryPolicy::immediate(5),
        ..OracleConfig::default()
    }
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

// --- OracleConfig ---

#[test]
fn test_oracle_config_deserialization_with_defaults() {
    let toml_str = r#"
        provider = "openai"
        api_key = "test-key"
    "#;

    let config: OracleConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.provider, OracleProvider::OpenAi);
    assert_eq!(config.model_id, "gpt-3.5-turbo");
    assert_eq!(config.timeout_secs, 60);
    assert!(config.verify_on_startup);
    assert_eq!(config.retry_policy.max_attempts, 5);
    assert!(config.api_base_url.is_none());
}

#[test]
fn test_retry_policy_partial_override() {
    let toml_str = r#"
        model_id = "gpt-4o-mini"

        [retry_policy]
        max_attempts = 3
        jitter = false
    "#;

    let config: OracleConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.model_id, "gpt-4o-mini");
    assert_eq!(config.retry_policy.max_attempts, 3);
    assert!(!config.retry_policy.jitter);
    assert_eq!(config.retry_policy.backoff_base_ms, 1_000);
}

// --- OpenAiBackend wire contract ---

#[tokio::test]
async fn test_backend_sends_messages_and_reads_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "system", "content": "Decide."}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(" Finalizing ")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(config_for(&server), "sk-test").unwrap();
    let text = backend
        .complete(&[Message::system("Decide.")], None)
        .await
        .unwrap();
    assert_eq!(text, " Finalizing ");
}

#[tokio::test]
async fn test_backend_forwards_max_tokens_override() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"max_tokens": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hi")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(config_for(&server), "sk-test").unwrap();
    assert_eq!(
        backend.complete(&[Message::user("Hello")], Some(5)).await.unwrap(),
        "Hi"
    );
}

#[tokio::test]
async fn test_backend_classifies_context_length_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "message": "This model's maximum context length is 4097 tokens.",
                "type": "invalid_request_error",
                "code": "context_length_exceeded"
            }
        })))
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(config_for(&server), "sk-test").unwrap();
    let err = backend.complete(&[Message::user("x")], None).await.unwrap_err();
    assert!(matches!(err, OracleError::ContextTooLong(_)));
}

// --- OracleClient retry behaviour over HTTP ---

#[tokio::test]
async fn test_client_retries_rate_limits_five_times() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "Rate limit exceeded", "code": "rate_limit_exceeded"}
        })))
        .expect(5)
        .mount(&server)
        .await;

    let client = OracleClient::new(&config_for(&server));
    let err = client.complete(&[Message::system("decide")]).await.unwrap_err();
    assert!(matches!(err, OracleError::RateLimited(_)));
}

#[tokio::test]
async fn test_client_does_not_retry_context_exhaustion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"message": "This model's maximum context length is 4097 tokens."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OracleClient::new(&config_for(&server));
    let reply = client.respond(&[Message::system("decide")]).await;
    assert_eq!(reply, "Token limit reached. Ending conversation.");
}

#[tokio::test]
async fn test_client_recovers_after_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("restart")))
        .mount(&server)
        .await;

    let client = OracleClient::new(&config_for(&server));
    assert_eq!(
        client.complete(&[Message::system("decide")]).await.unwrap(),
        "restart"
    );
}

#[tokio::test]
async fn test_verified_client_probe_failure_goes_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided", "code": "invalid_api_key"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OracleClient::new(&config_for(&server)).verified().await;
    assert!(!client.is_available());
}
