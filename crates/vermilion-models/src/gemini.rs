//! Google Gemini model implementations.
//!
//! This module implements the `Model` and `ImageModel` traits over Gemini's
//! REST API. Text models request JSON output via `responseMimeType`; image
//! models request image modalities and decode base64 `inlineData` parts.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error};
use vermilion_abstraction::{
    ImageData, ImageModel, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
    ResponseFormat,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini text model.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    /// The model ID (e.g., "gemini-2.5-flash").
    model_id: String,
    /// The API key for authentication.
    api_key: String,
    /// The base URL for the Gemini API.
    base_url: String,
    /// HTTP client for making requests.
    client: Client,
}

impl GeminiModel {
    /// Creates a new `GeminiModel` with the given model ID.
    ///
    /// # Errors
    /// Returns a `ModelError` if the API key is not found in environment variables.
    #[allow(clippy::disallowed_methods)] // env::var is needed for API key loading
    pub fn new(model_id: String) -> Result<Self, ModelError> {
        let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
            ModelError::UnsupportedModelProvider(
                "GEMINI_API_KEY environment variable not set".to_string(),
            )
        })?;

        Ok(Self::with_api_key(model_id, api_key))
    }

    /// Creates a new `GeminiModel` with a custom API key.
    #[must_use]
    pub fn with_api_key(model_id: String, api_key: String) -> Self {
        Self {
            model_id,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Overrides the API base URL (used by tests against a local server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl Model for GeminiModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            prompt_len = prompt.len(),
            parameters = ?parameters,
            "GeminiModel generating text"
        );

        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart::Text { text: prompt.to_string() }],
            }],
            generation_config: parameters.as_ref().map(|p| generation_config(p, None)),
        };

        let response =
            send_generate(&self.client, &self.base_url, &self.model_id, &self.api_key, &request_body)
                .await?;

        let candidate = response.candidates.first().ok_or_else(|| {
            error!("No candidates in Gemini API response");
            ModelError::ModelResponseError("No content in API response".to_string())
        })?;

        let content = candidate
            .content
            .parts
            .iter()
            .find_map(|p| match p {
                GeminiPart::Text { text } => Some(text.clone()),
                GeminiPart::InlineData { .. } => None,
            })
            .ok_or_else(|| {
                error!("No text content in Gemini API response");
                ModelError::ModelResponseError("No text content in API response".to_string())
            })?;

        let usage = response.usage_metadata.map(|meta| ModelUsage {
            prompt_tokens: meta.prompt_token_count.unwrap_or(0),
            completion_tokens: meta.candidates_token_count.unwrap_or(0),
            total_tokens: meta.total_token_count.unwrap_or(0),
        });

        Ok(ModelResponse { content, model_id: Some(self.model_id.clone()), usage })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Google Gemini image generation model.
///
/// Targets image-capable models such as "gemini-2.5-flash-image-preview",
/// which return generated images as base64 `inlineData` parts.
#[derive(Debug, Clone)]
pub struct GeminiImageModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
}

impl GeminiImageModel {
    /// Creates a new `GeminiImageModel` with the given model ID.
    ///
    /// # Errors
    /// Returns a `ModelError` if the API key is not found in environment variables.
    #[allow(clippy::disallowed_methods)] // env::var is needed for API key loading
    pub fn new(model_id: String) -> Result<Self, ModelError> {
        let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
            ModelError::UnsupportedModelProvider(
                "GEMINI_API_KEY environment variable not set".to_string(),
            )
        })?;

        Ok(Self::with_api_key(model_id, api_key))
    }

    /// Creates a new `GeminiImageModel` with a custom API key.
    #[must_use]
    pub fn with_api_key(model_id: String, api_key: String) -> Self {
        Self {
            model_id,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Overrides the API base URL (used by tests against a local server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl ImageModel for GeminiImageModel {
    async fn generate_image(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ImageData, ModelError> {
        debug!(
            model_id = %self.model_id,
            prompt_len = prompt.len(),
            "GeminiImageModel generating image"
        );

        // Image-capable models must be asked for image modalities explicitly.
        let modalities = Some(vec!["TEXT".to_string(), "IMAGE".to_string()]);
        let config = parameters.as_ref().map_or_else(
            || GeminiGenerationConfig {
                response_modalities: modalities.clone(),
                ..GeminiGenerationConfig::default()
            },
            |p| generation_config(p, modalities.clone()),
        );

        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart::Text { text: prompt.to_string() }],
            }],
            generation_config: Some(config),
        };

        let response =
            send_generate(&self.client, &self.base_url, &self.model_id, &self.api_key, &request_body)
                .await?;

        let candidate = response.candidates.first().ok_or_else(|| {
            error!("No candidates in Gemini API response");
            ModelError::ModelResponseError("No content in API response".to_string())
        })?;

        let inline = candidate
            .content
            .parts
            .iter()
            .find_map(|p| match p {
                GeminiPart::InlineData { inline_data } => Some(inline_data),
                GeminiPart::Text { .. } => None,
            })
            .ok_or_else(|| {
                ModelError::ModelResponseError("No image data in response".to_string())
            })?;

        let bytes =
            base64::engine::general_purpose::STANDARD.decode(&inline.data).map_err(|e| {
                ModelError::SerializationError(format!("Failed to decode image data: {}", e))
            })?;

        debug!(
            model_id = %self.model_id,
            mime_type = %inline.mime_type,
            size = bytes.len(),
            "GeminiImageModel decoded image payload"
        );

        Ok(ImageData {
            bytes,
            mime_type: inline.mime_type.clone(),
            model_id: Some(self.model_id.clone()),
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Sends a generateContent request and maps error statuses.
async fn send_generate(
    client: &Client,
    base_url: &str,
    model_id: &str,
    api_key: &str,
    body: &GeminiRequest,
) -> Result<GeminiResponse, ModelError> {
    let url = format!("{}/models/{}:generateContent?key={}", base_url, model_id, api_key);

    let response = client.post(&url).json(body).send().await.map_err(|e| {
        error!(error = %e, "Failed to send request to Gemini API");
        ModelError::RequestError(format!("Network error: {}", e))
    })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        error!(status = %status, error = %error_text, "Gemini API returned error status");
        return Err(map_error_status(status, error_text));
    }

    response.json().await.map_err(|e| {
        error!(error = %e, "Failed to parse Gemini API response");
        ModelError::SerializationError(format!("Failed to parse response: {}", e))
    })
}

/// Maps a non-success HTTP status to a `ModelError`.
fn map_error_status(status: reqwest::StatusCode, error_text: String) -> ModelError {
    // Quota and rate-limit responses are a hard stop for the caller.
    if status == 402 || status == 429 {
        return ModelError::QuotaExceeded {
            provider: "gemini".to_string(),
            message: Some(error_text),
        };
    }

    if status == 401 || status == 403 {
        return ModelError::UnsupportedModelProvider(format!(
            "Authentication failed ({}): {}",
            status, error_text
        ));
    }

    ModelError::ModelResponseError(format!("API error ({}): {}", status, error_text))
}

/// Builds a generation config from abstract model parameters.
fn generation_config(
    params: &ModelParameters,
    response_modalities: Option<Vec<String>>,
) -> GeminiGenerationConfig {
    let response_mime_type = match params.response_format {
        Some(ResponseFormat::Json) => Some("application/json".to_string()),
        None => None,
    };

    GeminiGenerationConfig {
        temperature: params.temperature,
        top_p: params.top_p,
        max_output_tokens: params.max_tokens,
        stop_sequences: params.stop_sequences.clone(),
        response_mime_type,
        response_modalities,
    }
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inline_data", alias = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiInlineData {
    #[serde(rename = "mime_type", alias = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "responseModalities", skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)] // Matches API naming
struct GeminiUsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}
