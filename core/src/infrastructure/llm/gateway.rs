use crate::domain::{
    common::{LLMConfig, ProviderKind, entities::app_errors::CoreError},
    diagnosis::{ports::ModelGateway, value_objects::ModelReply},
    image::entities::EncodedImage,
};

use super::{GeminiClient, OfflineClient, OpenAiCompatibleClient};

/// The configured provider, behind a single [`ModelGateway`].
#[derive(Debug, Clone)]
pub enum ModelGatewayClient {
    OpenAiCompatible(OpenAiCompatibleClient),
    Gemini(GeminiClient),
    Offline(OfflineClient),
}

impl ModelGatewayClient {
    pub fn from_config(config: &LLMConfig) -> Self {
        match config.provider {
            ProviderKind::Groq | ProviderKind::OpenRouter => {
                Self::OpenAiCompatible(OpenAiCompatibleClient::new(config))
            }
            ProviderKind::Gemini => Self::Gemini(GeminiClient::new(config)),
            ProviderKind::Offline => Self::Offline(OfflineClient::new()),
        }
    }
}

impl ModelGateway for ModelGatewayClient {
    async fn submit_vision_prompt(
        &self,
        prompt: String,
        image: EncodedImage,
    ) -> Result<ModelReply, CoreError> {
        match self {
            Self::OpenAiCompatible(client) => client.submit_vision_prompt(prompt, image).await,
            Self::Gemini(client) => client.submit_vision_prompt(prompt, image).await,
            Self::Offline(client) => client.submit_vision_prompt(prompt, image).await,
        }
    }

    async fn submit_text_prompt(&self, prompt: String) -> Result<ModelReply, CoreError> {
        match self {
            Self::OpenAiCompatible(client) => client.submit_text_prompt(prompt).await,
            Self::Gemini(client) => client.submit_text_prompt(prompt).await,
            Self::Offline(client) => client.submit_text_prompt(prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_selects_variant() {
        let variant = |provider| ModelGatewayClient::from_config(&LLMConfig::for_provider(provider));

        assert!(matches!(
            variant(ProviderKind::Groq),
            ModelGatewayClient::OpenAiCompatible(_)
        ));
        assert!(matches!(
            variant(ProviderKind::OpenRouter),
            ModelGatewayClient::OpenAiCompatible(_)
        ));
        assert!(matches!(variant(ProviderKind::Gemini), ModelGatewayClient::Gemini(_)));
        assert!(matches!(variant(ProviderKind::Offline), ModelGatewayClient::Offline(_)));
    }
}
