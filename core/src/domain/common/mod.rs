use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::{NoContext, Timestamp, Uuid};

use crate::domain::{
    diagnosis::{mapper::DiagnosisDefaults, value_objects::Locale},
    image::value_objects::NormalizeOptions,
};

pub mod entities;
pub mod services;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug, Default)]
pub struct PlantroConfig {
    pub llm: LLMConfig,
    pub image: NormalizeOptions,
    pub diagnosis: DiagnosisDefaults,
    pub locale: Locale,
}

#[derive(Clone, Debug)]
pub struct LLMConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub stream: bool,
    pub request_timeout: Duration,
}

impl LLMConfig {
    pub fn for_provider(provider: ProviderKind) -> Self {
        Self {
            provider,
            api_key: None,
            model: provider.default_model().to_string(),
            base_url: None,
            stream: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// The configured API key, ignoring blank values.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self::for_provider(ProviderKind::default())
    }
}

/// Hosted model providers the gateway can talk to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    #[default]
    Groq,
    OpenRouter,
    Gemini,
    /// Canned replies, no network. Used for demos and when no key is at hand.
    Offline,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Offline => "offline",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "meta-llama/llama-4-scout-17b-16e-instruct",
            ProviderKind::OpenRouter => "meta-llama/llama-4-scout",
            ProviderKind::Gemini => "gemini-2.0-flash",
            ProviderKind::Offline => "offline-canned",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderKind::Offline => "",
        }
    }

    /// Provider-specific environment variable holding the API key.
    pub fn credential_env_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Groq => Some("GROQ_API_KEY"),
            ProviderKind::OpenRouter => Some("OPENROUTER_API_KEY"),
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::Offline => None,
        }
    }

    pub fn requires_credential(&self) -> bool {
        !matches!(self, ProviderKind::Offline)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "openrouter" | "open-router" => Ok(ProviderKind::OpenRouter),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "offline" | "mock" => Ok(ProviderKind::Offline),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

pub fn generate_timestamp() -> (DateTime<Utc>, Timestamp) {
    let now = Utc::now();
    let seconds = now.timestamp().try_into().unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, 0);

    (now, timestamp)
}

pub fn generate_uuid_v7() -> Uuid {
    let (_, timestamp) = generate_timestamp();
    Uuid::new_v7(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trips_through_its_name() {
        for provider in [
            ProviderKind::Groq,
            ProviderKind::OpenRouter,
            ProviderKind::Gemini,
            ProviderKind::Offline,
        ] {
            assert_eq!(provider.as_str().parse::<ProviderKind>(), Ok(provider));
        }
        assert!("claude".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_blank_api_key_is_no_credential() {
        let mut config = LLMConfig::for_provider(ProviderKind::Groq);
        config.api_key = Some("   ".to_string());
        assert_eq!(config.credential(), None);

        config.api_key = Some(" gsk_123 ".to_string());
        assert_eq!(config.credential(), Some("gsk_123"));
    }

    #[test]
    fn test_base_url_override() {
        let mut config = LLMConfig::for_provider(ProviderKind::OpenRouter);
        assert_eq!(config.base_url(), "https://openrouter.ai/api/v1");

        config.base_url = Some("http://localhost:9000".to_string());
        assert_eq!(config.base_url(), "http://localhost:9000");
    }
}
