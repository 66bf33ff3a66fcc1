use std::fmt;
use std::str::FromStr;

use crate::domain::{common::entities::app_errors::CoreError, image::entities::RawImage};

/// Longest text query accepted for a symptom search.
pub const MAX_QUERY_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisMode {
    Image,
    TextQuery,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Image => "image",
            AnalysisMode::TextQuery => "text",
        }
    }
}

/// Language the model should answer in. Only affects free-text fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    English,
    Bengali,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Bengali => "bn",
        }
    }

    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::Bengali => "Bengali",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Locale::default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-in" | "english" => Ok(Locale::English),
            "bn" | "bn-bd" | "bn-in" | "bengali" | "bangla" => Ok(Locale::Bengali),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

/// Raw completion text as returned by a model provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    text: String,
}

impl ModelReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Wraps `text`, rejecting replies with nothing but whitespace.
    pub fn non_empty(text: impl Into<String>) -> Result<Self, CoreError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::EmptyReply);
        }
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DiagnoseImageInput {
    pub image: RawImage,
    /// Overrides the configured locale for this request.
    pub locale: Option<Locale>,
}

#[derive(Debug, Clone)]
pub struct SearchByTextInput {
    pub query: String,
    pub locale: Option<Locale>,
}
