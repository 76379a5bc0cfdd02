//! Factory for creating model instances from configuration.

use crate::gemini::{GeminiImageModel, GeminiModel};
use crate::{MockImageModel, MockModel};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use vermilion_abstraction::{ImageModel, Model, ModelError};

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Deterministic offline mock provider.
    Mock,
    /// Google Gemini API provider.
    Gemini,
}

impl FromStr for ModelType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "gemini" => Ok(Self::Gemini),
            other => Err(ModelError::UnsupportedModelProvider(format!(
                "Unknown model provider: {other}"
            ))),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Configuration for creating a model instance.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Which provider backs the model.
    pub model_type: ModelType,
    /// Provider-specific model identifier.
    pub model_id: String,
    /// API key; falls back to the provider's environment variable when unset.
    pub api_key: Option<String>,
    /// Base URL override for self-hosted gateways and tests.
    pub base_url: Option<String>,
}

impl ModelConfig {
    /// Creates a new configuration for the given provider and model ID.
    #[must_use]
    pub fn new(model_type: ModelType, model_id: impl Into<String>) -> Self {
        Self { model_type, model_id: model_id.into(), api_key: None, base_url: None }
    }

    /// Sets an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets a base URL override.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Factory for creating text and image models from configuration.
pub struct ModelFactory;

impl ModelFactory {
    /// Creates a text model instance.
    ///
    /// # Errors
    /// Returns a `ModelError` if the provider requires credentials that are
    /// neither configured nor present in the environment.
    pub fn create_text_model(config: ModelConfig) -> Result<Arc<dyn Model>, ModelError> {
        info!(
            model_type = %config.model_type,
            model_id = %config.model_id,
            "Creating text model"
        );

        match config.model_type {
            ModelType::Mock => Ok(Arc::new(MockModel::new(config.model_id))),
            ModelType::Gemini => {
                let mut model = match config.api_key {
                    Some(key) => GeminiModel::with_api_key(config.model_id, key),
                    None => GeminiModel::new(config.model_id)?,
                };
                if let Some(base_url) = config.base_url {
                    model = model.with_base_url(base_url);
                }
                Ok(Arc::new(model))
            }
        }
    }

    /// Creates an image model instance.
    ///
    /// # Errors
    /// Returns a `ModelError` if the provider requires credentials that are
    /// neither configured nor present in the environment.
    pub fn create_image_model(config: ModelConfig) -> Result<Arc<dyn ImageModel>, ModelError> {
        info!(
            model_type = %config.model_type,
            model_id = %config.model_id,
            "Creating image model"
        );

        match config.model_type {
            ModelType::Mock => Ok(Arc::new(MockImageModel::new(config.model_id))),
            ModelType::Gemini => {
                let mut model = match config.api_key {
                    Some(key) => GeminiImageModel::with_api_key(config.model_id, key),
                    None => GeminiImageModel::new(config.model_id)?,
                };
                if let Some(base_url) = config.base_url {
                    model = model.with_base_url(base_url);
                }
                Ok(Arc::new(model))
            }
        }
    }
}
