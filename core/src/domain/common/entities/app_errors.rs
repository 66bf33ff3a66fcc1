use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Coarse failure category, stable enough for callers to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ImageDecode,
    MissingCredential,
    Authentication,
    Transport,
    EmptyReply,
    NoJsonFound,
    MalformedJson,
    Invalid,
    Cancelled,
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Could not decode image: {0}")]
    ImageDecode(String),

    #[error("No API key configured for provider '{provider}'")]
    MissingCredential { provider: String },

    #[error("Model provider rejected the credential: {0}")]
    Authentication(String),

    #[error("Model provider request failed{}: {message}", status_suffix(.status))]
    Transport { status: Option<u16>, message: String },

    #[error("Model provider did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Model provider returned no text")]
    EmptyReply,

    #[error("No JSON object found in model reply")]
    NoJsonFound,

    #[error("Model reply is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Analysis was cancelled")]
    Cancelled,

    #[error("Analysis was superseded by a newer request")]
    Superseded,
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" with status {code}"))
        .unwrap_or_default()
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ImageDecode(_) => ErrorKind::ImageDecode,
            CoreError::MissingCredential { .. } => ErrorKind::MissingCredential,
            CoreError::Authentication(_) => ErrorKind::Authentication,
            CoreError::Transport { .. } | CoreError::Timeout(_) => ErrorKind::Transport,
            CoreError::EmptyReply => ErrorKind::EmptyReply,
            CoreError::NoJsonFound => ErrorKind::NoJsonFound,
            CoreError::MalformedJson(_) => ErrorKind::MalformedJson,
            CoreError::Invalid(_) => ErrorKind::Invalid,
            CoreError::Cancelled => ErrorKind::Cancelled,
            CoreError::Superseded => ErrorKind::Superseded,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::Timeout(_))
    }

    /// HTTP status attached to a transport failure, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}
