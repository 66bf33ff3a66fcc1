use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{
    common::entities::app_errors::CoreError, diagnosis::value_objects::ModelReply,
};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("code fence pattern is valid"));

/// Isolates the JSON object embedded in a model reply.
///
/// Returns the first complete balanced `{...}` span. Braces inside string
/// literals do not count. When no balanced span exists but the reply is
/// fenced, the fence markers are stripped and the remainder returned.
pub fn extract_json(reply: &ModelReply) -> Result<String, CoreError> {
    let text = reply.as_str();

    if let Some(span) = first_balanced_object(text) {
        return Ok(span.to_string());
    }

    if text.contains("```") {
        let stripped = CODE_FENCE.replace_all(text, "");
        let stripped = stripped.trim();
        if !stripped.is_empty() {
            return Ok(stripped.to_string());
        }
    }

    Err(CoreError::NoJsonFound)
}

fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Result<String, CoreError> {
        extract_json(&ModelReply::new(text))
    }

    #[test]
    fn test_clean_object_is_returned_unchanged() {
        let json = r#"{"name":"Leaf Spot","description":["brown {ring} marks"],"quote":"a \"}\" b"}"#;
        assert_eq!(extract(json).unwrap(), json);
    }

    #[test]
    fn test_prose_around_nested_object() {
        let reply = r#"Sure! Here is the result: {"a":{"b":1}} Hope this helps {"c":2}"#;
        assert_eq!(extract(reply).unwrap(), r#"{"a":{"b":1}}"#);
    }

    #[test]
    fn test_fenced_object() {
        let reply = "```json\n{\"isUnknownSubject\": true}\n```";
        assert_eq!(extract(reply).unwrap(), r#"{"isUnknownSubject": true}"#);
    }

    #[test]
    fn test_no_brace_is_no_json_found() {
        assert_eq!(
            extract("I could not analyze this image."),
            Err(CoreError::NoJsonFound)
        );
    }

    #[test]
    fn test_unbalanced_fenced_reply_falls_back_to_stripping() {
        let reply = "```json\n{\"name\": \"Rust\"\n```";
        assert_eq!(extract(reply).unwrap(), "{\"name\": \"Rust\"");
    }

    #[test]
    fn test_unbalanced_without_fence_is_no_json_found() {
        assert_eq!(extract("{\"name\": \"Rust\""), Err(CoreError::NoJsonFound));
    }

    #[test]
    fn test_empty_fence_is_no_json_found() {
        assert_eq!(extract("```json\n```"), Err(CoreError::NoJsonFound));
    }
}
