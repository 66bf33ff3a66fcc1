use serde_json::json;

/// Structured-output schema for providers that accept one alongside the prompt.
pub fn diagnosis_response_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "isUnknownSubject": { "type": "boolean" },
            "name": { "type": "string" },
            "plantName": { "type": "string" },
            "confidence": { "type": "number" },
            "reasoning": { "type": "string" },
            "description": {
                "type": "array",
                "items": { "type": "string" }
            },
            "treatment": {
                "type": "array",
                "items": { "type": "string" }
            },
            "recoveryTime": { "type": "string" },
            "supplements": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "price": { "type": "number" },
                        "store": { "type": "string" },
                        "link": { "type": "string" },
                        "why_this_product": { "type": "string" }
                    },
                    "required": ["name"]
                }
            }
        },
        "required": ["isUnknownSubject", "name", "plantName", "confidence"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_prompt_fields() {
        let schema = diagnosis_response_schema();
        let properties = schema["properties"].as_object().unwrap();

        for field in ["isUnknownSubject", "name", "plantName", "supplements"] {
            assert!(properties.contains_key(field), "missing {field}");
        }
        assert_eq!(
            schema["properties"]["supplements"]["items"]["required"][0],
            "name"
        );
    }
}
