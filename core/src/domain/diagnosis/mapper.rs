use serde_json::{Map, Value};
use url::Url;

use crate::domain::{
    common::entities::app_errors::CoreError,
    diagnosis::entities::{
        Diagnosis, RecommendedProduct, UNKNOWN_ISSUE_NAME, UNKNOWN_PLANT_NAME,
    },
};

/// Confidence reported when the model gives none, or nothing usable.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const ISSUE_NAME_KEYS: &[&str] = &["name", "diseaseName", "issueName"];
const PLANT_NAME_KEYS: &[&str] = &["plantName"];
const UNKNOWN_SUBJECT_KEYS: &[&str] = &["isUnknownSubject", "isUnknown"];
const SYMPTOM_KEYS: &[&str] = &["description", "symptoms"];
const TREATMENT_KEYS: &[&str] = &["treatment", "treatmentSteps", "fastRecoveryTips"];
const RECOVERY_KEYS: &[&str] = &["recoveryTime", "recoveryEstimate"];
const PRODUCT_KEYS: &[&str] = &["supplements", "recommendedProducts"];
const LINK_KEYS: &[&str] = &["link", "storeLink", "url"];
const RATIONALE_KEYS: &[&str] = &["why_this_product", "rationale", "reason"];

/// Values substituted for what the model leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisDefaults {
    pub confidence: f64,
    pub fallback_product: RecommendedProduct,
}

impl Default for DiagnosisDefaults {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            fallback_product: RecommendedProduct::fallback(),
        }
    }
}

/// Coerces the loosely-typed JSON a model produces into a [`Diagnosis`].
///
/// Only invalid JSON is an error. Every field is optional and falls back to a
/// documented default; known alternative key spellings are accepted.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisMapper {
    defaults: DiagnosisDefaults,
}

impl DiagnosisMapper {
    pub fn new(defaults: DiagnosisDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &DiagnosisDefaults {
        &self.defaults
    }

    pub fn map(&self, json_text: &str) -> Result<Diagnosis, CoreError> {
        let value: Value = serde_json::from_str(json_text)
            .map_err(|e| CoreError::MalformedJson(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(CoreError::MalformedJson(
                "expected a JSON object at the top level".to_string(),
            ));
        };

        let mut recommended_products = lookup(&fields, PRODUCT_KEYS)
            .map(products)
            .unwrap_or_default();
        if recommended_products.is_empty() {
            tracing::debug!("model recommended no products, using the fallback product");
            recommended_products.push(self.defaults.fallback_product.clone());
        }

        Ok(Diagnosis {
            request_id: None,
            is_unknown_subject: lookup(&fields, UNKNOWN_SUBJECT_KEYS)
                .and_then(boolean)
                .unwrap_or(false),
            issue_name: lookup(&fields, ISSUE_NAME_KEYS)
                .and_then(text)
                .unwrap_or_else(|| UNKNOWN_ISSUE_NAME.to_string()),
            plant_name: lookup(&fields, PLANT_NAME_KEYS)
                .and_then(text)
                .unwrap_or_else(|| UNKNOWN_PLANT_NAME.to_string()),
            confidence: fields
                .get("confidence")
                .and_then(confidence)
                .unwrap_or(self.defaults.confidence),
            reasoning: fields.get("reasoning").and_then(text),
            symptoms: lookup(&fields, SYMPTOM_KEYS)
                .map(string_list)
                .unwrap_or_default(),
            treatment_steps: lookup(&fields, TREATMENT_KEYS)
                .map(string_list)
                .unwrap_or_default(),
            recovery_estimate: lookup(&fields, RECOVERY_KEYS).and_then(text),
            recommended_products,
        })
    }
}

/// First non-null value among `keys`.
fn lookup<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}

/// Reads a confidence in [0, 1].
///
/// Only `%` strings are percentages. Other values above 1 are clamped to 1;
/// negative or non-finite values are rejected.
fn confidence(value: &Value) -> Option<f64> {
    let (raw, percent) = match value {
        Value::Number(n) => (n.as_f64()?, false),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_suffix('%') {
                Some(number) => (number.trim().parse::<f64>().ok()?, true),
                None => (s.parse::<f64>().ok()?, false),
            }
        }
        _ => return None,
    };

    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let value = if percent { raw / 100.0 } else { raw };
    Some(value.min(1.0))
}

/// Whole-rupee price. Strings keep only their digits; negatives are dropped.
fn price(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|p| p.is_finite() && *p >= 0.0 && *p < u64::MAX as f64)
                .map(|p| p.round() as u64)
        }),
        Value::String(s) => {
            let digits: String = s.chars().filter_map(ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn ascii_digit(ch: char) -> Option<char> {
    match ch {
        '0'..='9' => Some(ch),
        // Bengali digits ০..৯
        '\u{09E6}'..='\u{09EF}' => char::from_digit(ch as u32 - 0x09E6, 10),
        _ => None,
    }
}

fn products(value: &Value) -> Vec<RecommendedProduct> {
    match value {
        Value::Array(items) => items.iter().filter_map(product).collect(),
        Value::Object(_) => product(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn product(value: &Value) -> Option<RecommendedProduct> {
    let fields = match value {
        Value::Object(fields) => fields,
        Value::String(_) => {
            let name = text(value)?;
            return Some(RecommendedProduct {
                store_link: RecommendedProduct::search_link(&name),
                name,
                price_minor_units: None,
                store: None,
                rationale: None,
            });
        }
        _ => return None,
    };

    let name = fields.get("name").and_then(text)?;
    let store_link = lookup(fields, LINK_KEYS)
        .and_then(text)
        .and_then(|link| Url::parse(&link).ok())
        .filter(|link| matches!(link.scheme(), "http" | "https"))
        .unwrap_or_else(|| RecommendedProduct::search_link(&name));

    Some(RecommendedProduct {
        price_minor_units: fields.get("price").and_then(price),
        store: fields.get("store").and_then(text),
        rationale: lookup(fields, RATIONALE_KEYS).and_then(text),
        store_link,
        name,
    })
}
