use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    diagnosis::value_objects::{AnalysisMode, Locale, MAX_QUERY_CHARS},
    image::entities::EncodedImage,
};

/// One user action, ready to be turned into a prompt. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub id: Uuid,
    pub payload: AnalysisPayload,
    pub locale: Locale,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPayload {
    Image(EncodedImage),
    TextQuery(String),
}

impl AnalysisRequest {
    pub fn image(id: Uuid, image: EncodedImage, locale: Locale) -> Self {
        Self {
            id,
            payload: AnalysisPayload::Image(image),
            locale,
            created_at: Utc::now(),
        }
    }

    pub fn text_query(id: Uuid, query: &str, locale: Locale) -> Result<Self, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::Invalid("query must not be empty".to_string()));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(CoreError::Invalid(format!(
                "query must be at most {MAX_QUERY_CHARS} characters"
            )));
        }

        Ok(Self {
            id,
            payload: AnalysisPayload::TextQuery(query.to_string()),
            locale,
            created_at: Utc::now(),
        })
    }

    pub fn mode(&self) -> AnalysisMode {
        match self.payload {
            AnalysisPayload::Image(_) => AnalysisMode::Image,
            AnalysisPayload::TextQuery(_) => AnalysisMode::TextQuery,
        }
    }

    pub fn query_text(&self) -> Option<&str> {
        match &self.payload {
            AnalysisPayload::TextQuery(query) => Some(query),
            AnalysisPayload::Image(_) => None,
        }
    }
}
