use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::common::entities::app_errors::{CoreError, ErrorKind};

/// Stages of a single analysis, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Normalizing,
    Prompting,
    AwaitingReply,
    Extracting,
    Mapping,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Normalizing => "normalizing",
            PipelineStage::Prompting => "prompting",
            PipelineStage::AwaitingReply => "awaiting_reply",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Mapping => "mapping",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of an analysis: the error and the stage it happened in.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    pub error: CoreError,
}

impl PipelineFailure {
    pub fn new(stage: PipelineStage, error: CoreError) -> Self {
        Self { stage, error }
    }

    /// Failure that did not come from a pipeline stage, such as a cancelled session.
    pub fn detached(error: CoreError) -> Self {
        Self::new(PipelineStage::Failed, error)
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Short hint telling the user what to do next.
    pub fn remediation(&self) -> &'static str {
        match self.error.kind() {
            ErrorKind::MissingCredential | ErrorKind::Authentication => {
                "Configure a valid API key for the selected provider."
            }
            ErrorKind::Transport => "Check your internet connection and try again.",
            ErrorKind::ImageDecode => "Use another photo in a common format (JPEG, PNG, WebP).",
            ErrorKind::Invalid => "Check the input and try again.",
            ErrorKind::Cancelled | ErrorKind::Superseded => "Start a new analysis.",
            ErrorKind::EmptyReply | ErrorKind::NoJsonFound | ErrorKind::MalformedJson => {
                "The model answered in an unexpected format. Please try again."
            }
        }
    }
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (stage: {})", self.error, self.stage)
    }
}

impl std::error::Error for PipelineFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Tracks the current stage of one request and stamps failures with it.
#[derive(Debug)]
pub(crate) struct PipelineRun {
    request_id: Uuid,
    stage: PipelineStage,
}

impl PipelineRun {
    pub(crate) fn start(request_id: Uuid) -> Self {
        Self {
            request_id,
            stage: PipelineStage::Idle,
        }
    }

    pub(crate) fn advance(&mut self, next: PipelineStage) {
        debug_assert!(next > self.stage, "stages only move forward");
        tracing::debug!(
            request_id = %self.request_id,
            from = %self.stage,
            to = %next,
            "pipeline stage transition"
        );
        self.stage = next;
    }

    pub(crate) fn fail(&self, error: CoreError) -> PipelineFailure {
        tracing::warn!(
            request_id = %self.request_id,
            stage = %self.stage,
            kind = ?error.kind(),
            "analysis failed: {}",
            error
        );
        PipelineFailure::new(self.stage, error)
    }

    pub(crate) fn finish(mut self) {
        self.advance(PipelineStage::Done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::common::generate_uuid_v7;

    #[test]
    fn test_failure_keeps_the_stage_it_happened_in() {
        let mut run = PipelineRun::start(generate_uuid_v7());
        run.advance(PipelineStage::Prompting);
        run.advance(PipelineStage::AwaitingReply);

        let failure = run.fail(CoreError::EmptyReply);
        assert_eq!(failure.stage, PipelineStage::AwaitingReply);
        assert_eq!(failure.kind(), ErrorKind::EmptyReply);
        assert_eq!(
            failure.to_string(),
            "Model provider returned no text (stage: awaiting_reply)"
        );
    }

    #[test]
    fn test_remediation_separates_credential_from_network_problems() {
        let credential = PipelineFailure::detached(CoreError::MissingCredential {
            provider: "groq".to_string(),
        });
        let network = PipelineFailure::detached(CoreError::Transport {
            status: None,
            message: "connection refused".to_string(),
        });

        assert_ne!(credential.remediation(), network.remediation());
        assert!(credential.remediation().contains("API key"));
        assert!(network.remediation().contains("connection"));
    }
}
