//! Wire format of the Gemini `generateContent` REST call.
//! Must stay in sync with the dispatcher in `escape-web`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{GenerateRequest, ServiceConfig, ServiceError, ServiceResult};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Full URL of the generateContent method for the configured model.
pub fn endpoint_url(config: &ServiceConfig) -> String {
    format!(
        "{}/models/{}:generateContent",
        config.endpoint.trim_end_matches('/'),
        config.model
    )
}

/// Base64 payload for an `inlineData` part.
pub fn encode_inline(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Build the JSON request body. `inline_data` is the base64 payload of
/// `request.image`, already loaded by the host.
pub fn request_body(request: &GenerateRequest, inline_data: Option<&str>) -> Value {
    let mut parts = Vec::with_capacity(2);
    if let (Some(image), Some(data)) = (&request.image, inline_data) {
        parts.push(json!({
            "inlineData": { "mimeType": image.mime_type, "data": data }
        }));
    }
    parts.push(json!({ "text": request.prompt }));

    let mut body = json!({ "contents": [{ "parts": parts }] });
    if let Some(schema) = &request.schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
    }
    body
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extract the reply text: the concatenated text parts of the first candidate.
pub fn response_text(body: &str) -> ServiceResult {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ServiceError::Empty);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ImageRef;

    #[test]
    fn url_uses_model_and_trims_slash() {
        let config = ServiceConfig {
            endpoint: "https://example.test/v1beta/".into(),
            ..ServiceConfig::default()
        };
        assert_eq!(
            endpoint_url(&config),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn plain_body_has_single_text_part() {
        let body = request_body(&GenerateRequest::text("hello"), None);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn structured_body_requests_json() {
        let schema = json!({ "type": "OBJECT", "properties": { "correct": { "type": "BOOLEAN" } } });
        let body = request_body(&GenerateRequest::structured("judge", schema.clone()), None);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"], schema);
    }

    #[test]
    fn image_part_precedes_prompt() {
        let request = GenerateRequest::text("describe").with_image(ImageRef {
            url: "/frame.png".into(),
            mime_type: "image/png".into(),
        });
        let body = request_body(&request, Some("AAAA"));
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["text"], "describe");
    }

    #[test]
    fn inline_data_is_standard_base64() {
        assert_eq!(encode_inline(&[0x89, b'P', b'N', b'G']), "iVBORw==");
        assert_eq!(encode_inline(&[]), "");
    }

    #[test]
    fn response_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"correct\":"},{"text":"true}"}]}}]}"#;
        assert_eq!(response_text(body), Ok("{\"correct\":true}".to_string()));
    }

    #[test]
    fn response_without_text_is_empty() {
        assert_eq!(response_text(r#"{"candidates":[]}"#), Err(ServiceError::Empty));
        assert_eq!(response_text(r#"{}"#), Err(ServiceError::Empty));
        assert!(matches!(response_text("<html>"), Err(ServiceError::Malformed(_))));
    }
}
