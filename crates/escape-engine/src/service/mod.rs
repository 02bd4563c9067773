//! Contract for the external AI text service.
//!
//! Games queue `GenerateRequest`s through `EngineContext::request`; the host
//! (the web runner, or a test) executes them and pushes the outcome back as an
//! `InputEvent::ServiceReply`. Nothing here performs I/O.

pub mod gemini;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::types::RequestId;

/// Default model used for every request.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default REST base URL of the generative language API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// An image the host must load and attach inline to the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub mime_type: String,
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Response schema. When present the service is asked for JSON output.
    pub schema: Option<serde_json::Value>,
    pub image: Option<ImageRef>,
}

impl GenerateRequest {
    /// Free-text request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            schema: None,
            image: None,
        }
    }

    /// Request whose reply must be JSON matching `schema`.
    pub fn structured(prompt: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            schema: Some(schema),
            ..Self::text(prompt)
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }
}

/// A request tagged with the id its reply will carry.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    pub id: RequestId,
    pub request: GenerateRequest,
}

/// Why a service call produced no usable text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("no API key configured")]
    MissingCredentials,
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("service answered HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("response contained no text")]
    Empty,
    #[error("attached image could not be loaded: {0}")]
    Asset(String),
}

/// Reply text of a service call.
pub type ServiceResult = Result<String, ServiceError>;

/// Decode the JSON text of a structured reply.
pub fn parse_structured<T: DeserializeOwned>(result: &ServiceResult) -> Result<T, ServiceError> {
    let text = result.as_ref().map_err(|e| e.clone())?;
    serde_json::from_str(text.trim()).map_err(|e| ServiceError::Malformed(e.to_string()))
}

/// Connection settings for the AI service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builder-style setter used when the key comes from the build environment.
    pub fn with_api_key(mut self, key: Option<&str>) -> Self {
        self.api_key = key.map(str::trim).filter(|k| !k.is_empty()).map(String::from);
        self
    }

    /// The configured key, or `MissingCredentials`.
    pub fn api_key(&self) -> Result<&str, ServiceError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ServiceError::MissingCredentials)
    }
}
