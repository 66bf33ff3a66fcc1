use reqwest::{Response, StatusCode};

use crate::domain::common::{ProviderKind, entities::app_errors::CoreError};

pub mod gateway;
pub mod gemini_client;
pub mod offline_client;
pub mod openai_compatible_client;
mod sse;

pub use gateway::ModelGatewayClient;
pub use gemini_client::GeminiClient;
pub use offline_client::OfflineClient;
pub use openai_compatible_client::OpenAiCompatibleClient;

pub(crate) const TOP_P: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Image diagnosis wants deterministic, detailed answers.
pub(crate) const VISION_SAMPLING: Sampling = Sampling {
    temperature: 0.2,
    max_tokens: 2048,
};

pub(crate) const TEXT_SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    max_tokens: 1024,
};

pub(crate) fn require_credential(
    provider: ProviderKind,
    api_key: Option<&str>,
) -> Result<&str, CoreError> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| CoreError::Authentication(format!("no API key configured for {provider}")))
}

pub(crate) fn transport_error(provider: ProviderKind, error: reqwest::Error) -> CoreError {
    tracing::error!(provider = %provider, "model provider request failed: {}", error);
    CoreError::Transport {
        status: error.status().map(|status| status.as_u16()),
        message: error.to_string(),
    }
}

/// Passes 2xx responses through and turns everything else into a `CoreError`.
pub(crate) async fn ensure_success(
    provider: ProviderKind,
    response: Response,
) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body
    };
    tracing::error!(
        provider = %provider,
        status = status.as_u16(),
        "model provider returned an error: {}",
        message
    );

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(CoreError::Authentication(message));
    }

    Err(CoreError::Transport {
        status: Some(status.as_u16()),
        message,
    })
}

/// Reads the whole body; network failures while reading are transport errors.
pub(crate) async fn read_body(provider: ProviderKind, response: Response) -> Result<String, CoreError> {
    response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))
}
