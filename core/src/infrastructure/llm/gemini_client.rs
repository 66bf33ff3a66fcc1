use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        common::{LLMConfig, ProviderKind, entities::app_errors::CoreError},
        diagnosis::{
            ports::ModelGateway, schema::diagnosis_response_schema, value_objects::ModelReply,
        },
        image::entities::EncodedImage,
    },
    infrastructure::llm::{
        Sampling, TEXT_SAMPLING, TOP_P, VISION_SAMPLING, ensure_success, read_body,
        require_credential,
        sse::{collect_sse_text, invalid_chunk},
        transport_error,
    },
};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    stream: bool,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// Text of the first candidate, all parts joined.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

impl GeminiClient {
    pub fn new(config: &LLMConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &LLMConfig, client: Client) -> Self {
        Self {
            api_key: config.credential().map(str::to_string),
            model: config.model.clone(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            stream: config.stream,
            client,
        }
    }

    fn endpoint(&self) -> String {
        if self.stream {
            format!(
                "{}/models/{}:streamGenerateContent?alt=sse",
                self.base_url, self.model
            )
        } else {
            format!("{}/models/{}:generateContent", self.base_url, self.model)
        }
    }

    async fn call_gemini_api(
        &self,
        parts: Vec<Part>,
        sampling: Sampling,
    ) -> Result<ModelReply, CoreError> {
        let provider = ProviderKind::Gemini;
        let api_key = require_credential(provider, self.api_key.as_deref())?;

        let request = GeminiRequest {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: diagnosis_response_schema(),
                temperature: sampling.temperature,
                top_p: TOP_P,
                max_output_tokens: sampling.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;
        let response = ensure_success(provider, response).await?;

        let text = if self.stream {
            collect_sse_text(response, |data| {
                let chunk: GeminiResponse = serde_json::from_str(data).map_err(invalid_chunk)?;
                Ok(chunk.into_text())
            })
            .await?
        } else {
            let body = read_body(provider, response).await?;
            let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
                tracing::warn!("Failed to parse Gemini response: {}", e);
                CoreError::EmptyReply
            })?;
            parsed.into_text().unwrap_or_default()
        };

        tracing::debug!(model = %self.model, reply_chars = text.len(), "Gemini reply received");
        ModelReply::non_empty(text)
    }
}

impl ModelGateway for GeminiClient {
    async fn submit_vision_prompt(
        &self,
        prompt: String,
        image: EncodedImage,
    ) -> Result<ModelReply, CoreError> {
        let parts = vec![
            Part::Text { text: prompt },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type().to_string(),
                    data: image.base64_payload().to_string(),
                },
            },
        ];

        self.call_gemini_api(parts, VISION_SAMPLING).await
    }

    async fn submit_text_prompt(&self, prompt: String) -> Result<ModelReply, CoreError> {
        self.call_gemini_api(vec![Part::Text { text: prompt }], TEXT_SAMPLING)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(stream: bool) -> GeminiClient {
        let mut config = LLMConfig::for_provider(ProviderKind::Gemini);
        config.api_key = Some("key".to_string());
        config.stream = stream;
        GeminiClient::new(&config)
    }

    #[test]
    fn test_endpoint_depends_on_streaming() {
        assert_eq!(
            client(false).endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert!(
            client(true)
                .endpoint()
                .ends_with(":streamGenerateContent?alt=sse")
        );
    }

    #[test]
    fn test_parts_of_first_candidate_are_joined() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"name\":"},{"text":"\"Healthy\"}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), r#"{"name":"Healthy"}"#);

        let empty: GeminiResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert_eq!(empty.into_text(), None);
    }
}
