//! Helpers for moving JSON between models and typed payloads.
//!
//! Models asked for JSON output occasionally wrap it in a Markdown code
//! fence; [`parse_payload`] tolerates that and strips the fence before
//! deserializing.

use crate::outcome::StageError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Strips a surrounding Markdown code fence, with or without a `json` tag.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// Parses a model response body into a typed payload.
pub(crate) fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, StageError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).map_err(|e| StageError::MalformedOutput(e.to_string()))
}

/// Renders a value as pretty-printed JSON for embedding into prompts.
pub(crate) fn to_pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn test_parses_bare_json() {
        let parsed: Sample = parse_payload(r#"{"name": "alpha"}"#).expect("parses");
        assert_eq!(parsed.name, "alpha");
    }

    #[test]
    fn test_strips_tagged_fence() {
        let raw = "```json\n{\"name\": \"beta\"}\n```";
        let parsed: Sample = parse_payload(raw).expect("parses");
        assert_eq!(parsed.name, "beta");
    }

    #[test]
    fn test_strips_untagged_fence() {
        let raw = "```\n{\"name\": \"gamma\"}\n```";
        let parsed: Sample = parse_payload(raw).expect("parses");
        assert_eq!(parsed.name, "gamma");
    }

    #[test]
    fn test_rejects_non_json() {
        let result: Result<Sample, _> = parse_payload("I could not produce JSON, sorry.");
        assert!(matches!(result, Err(StageError::MalformedOutput(_))));
    }

    #[test]
    fn test_tolerates_surrounding_whitespace() {
        let parsed: Sample = parse_payload("  \n {\"name\": \"delta\"} \n ").expect("parses");
        assert_eq!(parsed.name, "delta");
    }
}
