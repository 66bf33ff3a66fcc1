use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub const HEALTHY_ISSUE_NAME: &str = "Healthy";
pub const UNKNOWN_ISSUE_NAME: &str = "Unknown Issue";
pub const UNKNOWN_PLANT_NAME: &str = "Unknown Plant";

static SEARCH_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://www.flipkart.com/search").expect("search base url is a valid literal")
});

/// Validated outcome of one analysis, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    pub is_unknown_subject: bool,
    pub issue_name: String,
    pub plant_name: String,
    pub confidence: f64,
    pub reasoning: Option<String>,
    pub symptoms: Vec<String>,
    pub treatment_steps: Vec<String>,
    pub recovery_estimate: Option<String>,
    pub recommended_products: Vec<RecommendedProduct>,
}

impl Diagnosis {
    pub fn is_healthy(&self) -> bool {
        self.issue_name.eq_ignore_ascii_case(HEALTHY_ISSUE_NAME)
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedProduct {
    pub name: String,
    /// Price in whole rupees. `None` when the model gave nothing parseable.
    pub price_minor_units: Option<u64>,
    pub store: Option<String>,
    pub store_link: Url,
    pub rationale: Option<String>,
}

impl RecommendedProduct {
    /// Placeholder used when the model recommends nothing.
    pub fn fallback() -> Self {
        Self {
            name: "General Plant Food".to_string(),
            price_minor_units: Some(299),
            store: Some("Flipkart".to_string()),
            store_link: Self::search_link("plant fertilizer"),
            rationale: None,
        }
    }

    /// Store search URL for a product name.
    pub fn search_link(name: &str) -> Url {
        let mut link = SEARCH_BASE_URL.clone();
        link.query_pairs_mut().append_pair("q", name);
        link
    }
}
