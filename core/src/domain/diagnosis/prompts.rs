use crate::domain::diagnosis::value_objects::{AnalysisMode, Locale};

const IMAGE_TASK: &str = "\
You are an expert plant pathologist. Examine the attached photo closely.
1. Describe what you see: leaf texture, vein pattern, spots (size, colour, halo), stem and soil condition.
2. Identify the plant species from those features before anything else.
3. Match the symptoms to a specific disease, pest or nutrient deficiency, and rule out look-alikes.
4. If the plant shows no problem, use \"Healthy\" as the issue name.
If the photo is blurry, say so in the reasoning and lower the confidence.";

const REJECTION_RULE: &str = "\
If the photo shows a person, an animal, an object, a drawing or any other \
illustration instead of a real plant, set \"isUnknownSubject\" to true and leave \
the other fields empty.";

const RESPONSE_SHAPE: &str = r#"{
  "isUnknownSubject": false,
  "name": "Precise disease name or 'Healthy'",
  "plantName": "Precise plant name",
  "confidence": 0.9,
  "reasoning": "Visual evidence supporting the diagnosis",
  "description": ["Observed symptom", "..."],
  "treatment": ["Treatment step", "..."],
  "recoveryTime": "Realistic estimate, e.g. '3-4 weeks'",
  "supplements": [
    {
      "name": "Specific product name",
      "price": 450,
      "store": "Flipkart",
      "link": "https://www.flipkart.com/search?q=PRODUCT_NAME",
      "why_this_product": "Why this product helps with this issue"
    }
  ]
}"#;

const PRODUCT_GUIDANCE: &str = "\
Product rules:
- Recommend 2-3 specific products (for example a fungicide and a fertilizer), not a generic remedy.
- \"link\" must be a Flipkart search URL built from the product name.
- \"price\" is a realistic estimate in Indian Rupees, as a bare number.
- \"confidence\" is a number between 0 and 1. Be honest when unsure.";

/// Builds the instruction sent to the model. Pure: same inputs, same prompt.
pub fn build_prompt(mode: AnalysisMode, locale: Locale, query_text: Option<&str>) -> String {
    let mut prompt = String::new();

    match mode {
        AnalysisMode::Image => {
            prompt.push_str(IMAGE_TASK);
            prompt.push_str("\n\n");
            prompt.push_str(REJECTION_RULE);
        }
        AnalysisMode::TextQuery => {
            let query = query_text.unwrap_or_default().trim();
            prompt.push_str(&format!(
                "A user describes a plant problem: \"{query}\"\n\n\
                 Diagnose the most likely issue and how to fix it. If the description \
                 is vague, make a best guess for the symptoms described."
            ));
        }
    }

    if !locale.is_default() {
        prompt.push_str(&format!(
            "\n\nWrite every free-text value (names, reasoning, descriptions, treatment, \
             recovery time, product details) in {}. Keep the JSON keys in English.",
            locale.language_name()
        ));
    }

    prompt.push_str("\n\nReturn a single JSON object with exactly these fields:\n");
    prompt.push_str(RESPONSE_SHAPE);
    prompt.push_str("\n\n");
    prompt.push_str(PRODUCT_GUIDANCE);
    prompt.push_str(
        "\n\nReturn only the raw JSON. Do not wrap it in markdown code fences and add no text around it.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_prompt_has_rejection_rule_and_schema() {
        let prompt = build_prompt(AnalysisMode::Image, Locale::English, None);

        assert!(prompt.contains("isUnknownSubject"));
        assert!(prompt.contains("illustration"));
        for field in [
            "\"name\"",
            "\"plantName\"",
            "\"confidence\"",
            "\"reasoning\"",
            "\"description\"",
            "\"treatment\"",
            "\"recoveryTime\"",
            "\"supplements\"",
            "\"why_this_product\"",
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("code fences"));
        assert!(!prompt.contains("Bengali"));
    }

    #[test]
    fn test_text_prompt_embeds_query_without_rejection_rule() {
        let prompt = build_prompt(
            AnalysisMode::TextQuery,
            Locale::English,
            Some("  tomato leaves curling "),
        );

        assert!(prompt.contains("A user describes a plant problem: \"tomato leaves curling\""));
        assert!(prompt.contains("make a best guess"));
        assert!(!prompt.contains("illustration"));
    }

    #[test]
    fn test_non_default_locale_adds_language_instruction() {
        let prompt = build_prompt(AnalysisMode::Image, Locale::Bengali, None);
        assert!(prompt.contains("in Bengali. Keep the JSON keys in English."));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            build_prompt(AnalysisMode::TextQuery, Locale::Bengali, Some("wilting")),
            build_prompt(AnalysisMode::TextQuery, Locale::Bengali, Some("wilting"))
        );
    }
}
