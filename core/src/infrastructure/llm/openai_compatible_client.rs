use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        common::{LLMConfig, ProviderKind, entities::app_errors::CoreError},
        diagnosis::{ports::ModelGateway, value_objects::ModelReply},
        image::entities::EncodedImage,
    },
    infrastructure::llm::{
        Sampling, TEXT_SAMPLING, TOP_P, VISION_SAMPLING, ensure_success, read_body,
        require_credential,
        sse::{collect_sse_text, invalid_chunk},
        transport_error,
    },
};

/// Chat-completions client for OpenAI-compatible providers (Groq, OpenRouter).
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    provider: ProviderKind,
    api_key: Option<String>,
    model: String,
    endpoint: String,
    stream: bool,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<AssistantMessage>,
    #[serde(default)]
    delta: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self, streamed: bool) -> Option<String> {
        let choice = self.choices.into_iter().next()?;
        let message = if streamed { choice.delta } else { choice.message };
        message?.content
    }
}

impl OpenAiCompatibleClient {
    pub fn new(config: &LLMConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &LLMConfig, client: Client) -> Self {
        Self {
            provider: config.provider,
            api_key: config.credential().map(str::to_string),
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url().trim_end_matches('/')),
            stream: config.stream,
            client,
        }
    }

    async fn complete(
        &self,
        content: MessageContent,
        sampling: Sampling,
    ) -> Result<ModelReply, CoreError> {
        let api_key = require_credential(self.provider, self.api_key.as_deref())?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            temperature: sampling.temperature,
            max_completion_tokens: sampling.max_tokens,
            top_p: TOP_P,
            stream: self.stream,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(self.provider, e))?;
        let response = ensure_success(self.provider, response).await?;

        let text = if self.stream {
            collect_sse_text(response, |data| {
                let chunk: ChatResponse = serde_json::from_str(data).map_err(invalid_chunk)?;
                Ok(chunk.into_text(true))
            })
            .await?
        } else {
            let body = read_body(self.provider, response).await?;
            let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
                tracing::warn!(provider = %self.provider, "unexpected completion body: {}", e);
                CoreError::EmptyReply
            })?;
            parsed.into_text(false).unwrap_or_default()
        };

        tracing::debug!(
            provider = %self.provider,
            model = %self.model,
            reply_chars = text.len(),
            "completion received"
        );
        ModelReply::non_empty(text)
    }
}

impl ModelGateway for OpenAiCompatibleClient {
    async fn submit_vision_prompt(
        &self,
        prompt: String,
        image: EncodedImage,
    ) -> Result<ModelReply, CoreError> {
        let content = MessageContent::Parts(vec![
            ContentPart::Text { text: prompt },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.into_data_url(),
                },
            },
        ]);

        self.complete(content, VISION_SAMPLING).await
    }

    async fn submit_text_prompt(&self, prompt: String) -> Result<ModelReply, CoreError> {
        self.complete(MessageContent::Text(prompt), TEXT_SAMPLING)
            .await
    }
}
