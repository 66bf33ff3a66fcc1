use plantro_core::{
    domain::{
        common::{LLMConfig, ProviderKind, entities::app_errors::CoreError},
        diagnosis::ports::ModelGateway,
        image::entities::EncodedImage,
    },
    infrastructure::llm::GeminiClient,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

fn config(server: &MockServer, stream: bool) -> LLMConfig {
    LLMConfig {
        api_key: Some("gemini-key".to_string()),
        base_url: Some(server.uri()),
        stream,
        ..LLMConfig::for_provider(ProviderKind::Gemini)
    }
}

#[tokio::test]
async fn test_vision_prompt_sends_inline_data_and_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "gemini-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": "diagnose" },
                    { "inline_data": { "mime_type": "image/jpeg", "data": "bGVhZg==" } }
                ]
            }],
            "generation_config": { "response_mime_type": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"name\":\"Leaf Spot\"}" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config(&server, false));
    let image = EncodedImage::new("image/jpeg", b"leaf", 1, 1, 4);
    let reply = client
        .submit_vision_prompt("diagnose".to_string(), image)
        .await
        .unwrap();

    assert_eq!(reply.as_str(), r#"{"name":"Leaf Spot"}"#);
}

#[tokio::test]
async fn test_forbidden_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config(&server, false));
    let error = client.submit_text_prompt("hi".to_string()).await.unwrap_err();

    assert!(matches!(error, CoreError::Authentication(_)));
}

#[tokio::test]
async fn test_blocked_prompt_without_candidates_is_an_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config(&server, false));
    let error = client.submit_text_prompt("hi".to_string()).await.unwrap_err();

    assert_eq!(error, CoreError::EmptyReply);
}

#[tokio::test]
async fn test_streamed_reply_is_accumulated() {
    let server = MockServer::start().await;
    let sse_body = concat!(
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"{\\\"name\\\":\"}]}}]}\n\n",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"\\\"Healthy\\\"}\"}]}}]}\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:streamGenerateContent"))
        .and(query_param("alt", "sse"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config(&server, true));
    let reply = client.submit_text_prompt("hi".to_string()).await.unwrap();

    assert_eq!(reply.as_str(), r#"{"name":"Healthy"}"#);
}
