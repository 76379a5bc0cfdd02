//! Model provider implementations for Vermilion.
//!
//! This crate wires the abstract `Model` and `ImageModel` traits from
//! `vermilion-abstraction` to concrete providers:
//!
//! - **Gemini**: Google's Gemini API for text and image generation
//! - **Mock**: deterministic offline implementations for tests and dry runs
//!
//! Providers are usually constructed through the [`factory::ModelFactory`]
//! rather than directly.

pub mod factory;
pub mod gemini;

pub use factory::{ModelConfig, ModelFactory, ModelType};
pub use gemini::{GeminiImageModel, GeminiModel};

use async_trait::async_trait;
use tracing::debug;
use vermilion_abstraction::{
    ImageData, ImageModel, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};

/// A mock text model that echoes prompts back.
///
/// Useful for exercising the pipeline without network access or API keys.
#[derive(Debug, Clone)]
pub struct MockModel {
    model_id: String,
}

impl MockModel {
    /// Creates a new `MockModel` with the given model ID.
    #[must_use]
    pub fn new(model_id: String) -> Self {
        Self { model_id }
    }
}

#[async_trait]
impl Model for MockModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            prompt_len = prompt.len(),
            "MockModel generating text"
        );

        let content = format!(
            "Mock response for: {prompt}\nModel ID: {}\nParameters: {parameters:?}",
            self.model_id
        );

        let usage = ModelUsage {
            prompt_tokens: count_tokens(prompt),
            completion_tokens: count_tokens(&content),
            total_tokens: count_tokens(prompt) + count_tokens(&content),
        };

        Ok(ModelResponse {
            content,
            model_id: Some(self.model_id.clone()),
            usage: Some(usage),
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// A mock image model that returns a fixed 1x1 transparent PNG.
#[derive(Debug, Clone)]
pub struct MockImageModel {
    model_id: String,
}

/// Smallest valid transparent PNG (1x1 pixel, RGBA).
const MOCK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

impl MockImageModel {
    /// Creates a new `MockImageModel` with the given model ID.
    #[must_use]
    pub fn new(model_id: String) -> Self {
        Self { model_id }
    }
}

#[async_trait]
impl ImageModel for MockImageModel {
    async fn generate_image(
        &self,
        prompt: &str,
        _parameters: Option<ModelParameters>,
    ) -> Result<ImageData, ModelError> {
        debug!(
            model_id = %self.model_id,
            prompt_len = prompt.len(),
            "MockImageModel generating image"
        );

        Ok(ImageData {
            bytes: MOCK_PNG.to_vec(),
            mime_type: "image/png".to_string(),
            model_id: Some(self.model_id.clone()),
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn count_tokens(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_model_echoes_prompt() {
        let model = MockModel::new("mock-model".to_string());
        let response = model.generate_text("hello world", None).await.expect("mock never fails");

        assert!(response.content.contains("Mock response for: hello world"));
        assert_eq!(response.model_id.as_deref(), Some("mock-model"));
        assert_eq!(response.usage.expect("usage present").prompt_tokens, 2);
    }

    #[tokio::test]
    async fn test_mock_image_model_returns_png() {
        let model = MockImageModel::new("mock-image".to_string());
        let image = model.generate_image("a red square", None).await.expect("mock never fails");

        assert_eq!(image.mime_type, "image/png");
        assert_eq!(&image.bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
