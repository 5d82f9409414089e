//! Tolerant JSON recovery from model output.
//!
//! Models often wrap the requested JSON in prose or markdown fences:
//!
//! ````text
//! Sure! Here is your quiz:
//! ```json
//! {"title": "...", "questions": [...]}
//! ```
//! Let me know if you need anything else.
//! ````
//!
//! [`parse_content`] first tries the trimmed text as-is, then falls back to
//! the greedy span between the first `{` and the last `}`.

use crate::core::string::truncate;
use serde_json::Value;
use thiserror::Error;

/// How much of the raw text to keep in the error for diagnostics.
const RAW_PREVIEW_BYTES: usize = 200;

/// Model content could not be turned into JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "model content is not valid JSON: {message} ({})",
    extraction_note(.extraction_attempted)
)]
pub struct ContentParseError {
    /// Error from parsing the trimmed text directly
    pub message: String,
    /// Whether a `{ ... }` span was found and tried
    pub extraction_attempted: bool,
    /// Error from parsing the extracted span, if one was tried
    pub extraction_error: Option<String>,
    /// Start of the raw text
    pub raw_preview: String,
}

fn extraction_note(attempted: &bool) -> &'static str {
    if *attempted {
        "brace-span extraction also failed"
    } else {
        "no brace-delimited span to extract"
    }
}

/// Recover a JSON value from raw model text.
pub fn parse_content(text: &str) -> Result<Value, ContentParseError> {
    let trimmed = text.trim();

    let direct_error = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e.to_string(),
    };

    let Some(span) = extract_brace_span(trimmed) else {
        return Err(ContentParseError {
            message: direct_error,
            extraction_attempted: false,
            extraction_error: None,
            raw_preview: truncate(trimmed, RAW_PREVIEW_BYTES),
        });
    };

    serde_json::from_str::<Value>(span).map_err(|e| ContentParseError {
        message: direct_error,
        extraction_attempted: true,
        extraction_error: Some(e.to_string()),
        raw_preview: truncate(trimmed, RAW_PREVIEW_BYTES),
    })
}

/// Greedy span from the first `{` to the last `}`, inclusive.
pub fn extract_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_parse() {
        let value = parse_content("  {\"title\": \"T\"}\n").unwrap();
        assert_eq!(value, json!({"title": "T"}));
    }

    #[test]
    fn test_recovers_json_surrounded_by_prose() {
        let value =
            parse_content("Here is the quiz: {\"title\":\"T\",\"questions\":[]} Thanks!").unwrap();
        assert_eq!(value, json!({"title": "T", "questions": []}));
    }

    #[test]
    fn test_recovers_from_markdown_fence() {
        let text = "```json\n{\"title\": \"Fenced\", \"questions\": [{\"a\": {}}]}\n```";
        let value = parse_content(text).unwrap();
        assert_eq!(value["title"], "Fenced");
    }

    #[test]
    fn test_failure_after_extraction() {
        let err = parse_content("Result: {\"title\": \"T\",} oops").unwrap_err();
        assert!(err.extraction_attempted);
        assert!(err.extraction_error.is_some());
        assert!(err.to_string().contains("brace-span extraction also failed"));
    }

    #[test]
    fn test_failure_without_braces() {
        let err = parse_content("I cannot help with that.").unwrap_err();
        assert!(!err.extraction_attempted);
        assert_eq!(err.raw_preview, "I cannot help with that.");
    }

    #[test]
    fn test_brace_span() {
        assert_eq!(extract_brace_span("a {b} c {d} e"), Some("{b} c {d}"));
        assert_eq!(extract_brace_span("} backwards {"), None);
        assert_eq!(extract_brace_span("none"), None);
    }
}
