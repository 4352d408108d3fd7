/// Integration tests with a mocked OpenAI-compatible endpoint.
/// Exercises the real HTTP backend and the composer's fallback without
/// hitting a live service.
use lead_enrichment_api::composer::{EmailComposer, GenerationSettings, SYSTEM_PROMPT};
use lead_enrichment_api::config::Config;
use lead_enrichment_api::errors::AppError;
use lead_enrichment_api::generation::{GenerationRequest, GenerativeTextBackend, OpenAiBackend};
use lead_enrichment_api::models::Lead;
use lead_enrichment_api::pipeline::EnrichmentPipeline;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create test config
fn create_test_config(base_url: String) -> Config {
    Config {
        port: 8080,
        openai_api_key: Some("test-key".to_string()),
        openai_base_url: base_url,
        openai_model: "gpt-4".to_string(),
        generation_temperature: 0.7,
        generation_max_tokens: 300,
        generation_timeout: Some(Duration::from_secs(2)),
        provider_timeout: None,
        batch_max_leads: 10,
    }
}

fn backend_for(server: &MockServer) -> OpenAiBackend {
    OpenAiBackend::from_config(&create_test_config(format!("{}/v1", server.uri())))
        .unwrap()
        .unwrap()
}

fn request() -> GenerationRequest {
    GenerationRequest {
        system_prompt: "system".to_string(),
        user_prompt: "user".to_string(),
        temperature: 0.7,
        max_tokens: 300,
    }
}

fn test_lead() -> Lead {
    Lead {
        company: "Acme".to_string(),
        contact: "Jane Doe".to_string(),
        title: "CTO".to_string(),
        email: "jane@acme.com".to_string(),
        website: "https://acme.com".to_string(),
        industry: Some("SaaS".to_string()),
        employees: Some("200-500".to_string()),
        revenue: Some("$10M".to_string()),
    }
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }
        ]
    })
}

#[tokio::test]
async fn test_backend_successful_completion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4",
            "max_tokens": 300
        })))
        .and(body_string_contains(r#"{"role":"system","content":"system"}"#))
        .and(body_string_contains(r#"{"role":"user","content":"user"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Subject: Hi\nBody")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let result = backend.complete(&request()).await;

    assert_eq!(result.unwrap(), "Subject: Hi\nBody");
}

#[tokio::test]
async fn test_backend_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let result = backend.complete(&request()).await;

    match result {
        Err(AppError::GenerationError(msg)) => assert!(msg.contains("500")),
        other => panic!("expected generation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_backend_unexpected_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "legacy shape"})),
        )
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let result = backend.complete(&request()).await;

    assert!(matches!(result, Err(AppError::GenerationError(_))));
}

#[tokio::test]
async fn test_blank_completion_falls_back_to_template() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let result = backend.complete(&request()).await;
    assert!(matches!(result, Err(AppError::GenerationError(_))));

    let config = create_test_config(format!("{}/v1", mock_server.uri()));
    let pipeline = EnrichmentPipeline::from_config(&config).unwrap();
    let enriched = pipeline.enrich(test_lead()).await.unwrap();

    assert_eq!(
        enriched.email_draft.subject,
        "Acme + SaaSquatch: Boost Lead Gen by 40%"
    );
    assert!(enriched.email_draft.body.starts_with("Hi Jane,"));
}

#[tokio::test]
async fn test_backend_timeout_is_generation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("Subject: Late\nBody"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let result = backend.complete(&request()).await;

    assert!(matches!(result, Err(AppError::GenerationError(_))));
}

#[tokio::test]
async fn test_composer_sends_system_prompt_and_uses_reply() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(SYSTEM_PROMPT))
        .and(body_string_contains("Company: Acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Subject: Acme's React stack + more pipeline\n\nHi Jane,\n\nQuick idea for Acme.",
        )))
        .mount(&mock_server)
        .await;

    let config = create_test_config(format!("{}/v1", mock_server.uri()));
    let pipeline = EnrichmentPipeline::from_config(&config).unwrap();

    let enriched = pipeline.enrich(test_lead()).await.unwrap();

    assert_eq!(
        enriched.email_draft.subject,
        "Acme's React stack + more pipeline"
    );
    assert_eq!(enriched.email_draft.body, "Hi Jane,\n\nQuick idea for Acme.");
    assert_eq!(
        pipeline.health_check().generation_backend,
        "openai-compatible"
    );
}

#[tokio::test]
async fn test_composer_falls_back_on_backend_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let composer = EmailComposer::new(Some(Arc::new(backend)), GenerationSettings::default());
    let pipeline = Arc::new(EnrichmentPipeline::new(
        lead_enrichment_api::validator::Validator::new(
            lead_enrichment_api::providers::ProviderSet::simulated(),
            None,
        ),
        lead_enrichment_api::scorer::LeadScorer::new(),
        composer,
    ));

    let result = pipeline.enrich_batch(vec![test_lead(), test_lead()]).await;

    assert_eq!(result.successful, 2);
    for enriched in &result.results {
        assert_eq!(
            enriched.email_draft.subject,
            "Acme + SaaSquatch: Boost Lead Gen by 40%"
        );
        assert!(enriched.email_draft.body.starts_with("Hi Jane,"));
    }
}

#[tokio::test]
async fn test_concurrent_generation_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello\nBody")))
        .expect(10)
        .mount(&mock_server)
        .await;

    let backend = Arc::new(backend_for(&mock_server));

    let mut handles = vec![];
    for _ in 0..10 {
        let backend = Arc::clone(&backend);
        handles.push(tokio::spawn(async move {
            backend.complete(&request()).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result.unwrap(), "Hello\nBody");
    }
}
