use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role tag used on the wire for user turns
pub const ROLE_USER: &str = "user";
/// Role tag used on the wire for model turns
pub const ROLE_MODEL: &str = "model";

/// Request to Gemini API to generate content
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Tool definition for Gemini API.
///
/// Only the built-in search grounding tool is used; it cannot be combined
/// with a response schema.
#[derive(Serialize, Debug, Clone, Default)]
pub struct Tool {
    pub google_search: GoogleSearch,
}

impl Tool {
    pub fn google_search() -> Self {
        Self::default()
    }
}

/// Empty marker object enabling search grounding
#[derive(Serialize, Debug, Clone, Default)]
pub struct GoogleSearch {}

/// Content structure for requests
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    /// Single-part content tagged with a role
    pub fn with_role(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// Single-part content without a role, as used for system instructions
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

/// Part structure for a piece of content
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub text: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Generation configuration options
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl GenerationConfig {
    /// JSON output constrained to the given schema
    pub fn json_schema(schema: Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
        }
    }
}

/// Response from Gemini API.
///
/// Every level is optional so that an unexpected body still decodes and
/// can be classified as a structural failure.
#[derive(Deserialize, Debug, Default)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

/// Candidate in the response
#[derive(Deserialize, Debug)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

/// Content of a candidate
#[derive(Deserialize, Debug)]
pub struct CandidateContent {
    pub parts: Option<Vec<PartResponse>>,
}

/// Part response from the API
#[derive(Deserialize, Debug)]
pub struct PartResponse {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text at `candidates[0].content.parts[0].text`, if present and non-empty
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .first()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_camel_case_and_skips_absent_fields() {
        let request = GenerateContentRequest {
            contents: vec![Content::with_role(ROLE_USER, "hi")],
            tools: Some(vec![Tool::google_search()]),
            system_instruction: Some(Content::instruction("be brief")),
            generation_config: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "tools": [{"google_search": {}}],
                "systemInstruction": {"parts": [{"text": "be brief"}]}
            })
        );
    }

    #[test]
    fn test_generation_config_serialization() {
        let config = GenerationConfig::json_schema(json!({"type": "OBJECT"}));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["responseMimeType"], "application/json");
        assert_eq!(value["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_first_text_extraction() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "hello"}], "role": "model"}}]
        }))
        .unwrap();
        assert_eq!(response.first_text(), Some("hello"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_text(), None);

        let no_parts: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert_eq!(no_parts.first_text(), None);

        let blank: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": ""}]}}]
        }))
        .unwrap();
        assert_eq!(blank.first_text(), None);
    }

    #[test]
    fn test_null_levels_decode_as_absent() {
        let bodies = [
            r#"{"candidates": null}"#,
            r#"{"candidates": [{"content": null}]}"#,
            r#"{"candidates": [{"content": {"parts": null}}]}"#,
            r#"{"candidates": [{"content": {"parts": [{"text": null}]}}]}"#,
        ];

        for body in bodies {
            let response: GenerateContentResponse = serde_json::from_str(body)
                .unwrap_or_else(|e| panic!("{body} should decode: {e}"));
            assert_eq!(response.first_text(), None, "{body}");
        }
    }
}
