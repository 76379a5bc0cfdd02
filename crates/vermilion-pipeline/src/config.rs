//! Pipeline configuration.
//!
//! Brand guidelines, platform specs, model settings, and review thresholds
//! are read-only structured data constructed once at startup and passed into
//! each component. Every field has a compiled-in default, so a configuration
//! file only needs to state overrides.

use crate::routing::Platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Brand voice and style guidelines.
    #[serde(default)]
    pub brand: BrandGuidelines,

    /// Per-platform content constraints.
    #[serde(default)]
    pub platforms: PlatformCatalog,

    /// Model provider settings.
    #[serde(default)]
    pub models: ModelSettings,

    /// Review loop settings.
    #[serde(default)]
    pub review: ReviewSettings,

    /// Output directory settings.
    #[serde(default)]
    pub outputs: OutputSettings,
}

/// Brand guidelines applied to every generated asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandGuidelines {
    /// Desired tone of voice.
    #[serde(default = "default_brand_tone")]
    pub tone: String,

    /// Keywords the content should use naturally.
    #[serde(default = "default_brand_keywords")]
    pub keywords: Vec<String>,

    /// Words the content must avoid.
    #[serde(default = "default_avoid_words")]
    pub avoid_words: Vec<String>,

    /// Brand colors as hex strings.
    #[serde(default = "default_color_palette")]
    pub color_palette: Vec<String>,

    /// Visual style descriptor for image generation.
    #[serde(default = "default_brand_style")]
    pub style: String,
}

fn default_brand_tone() -> String {
    "professional, friendly".to_string()
}

fn default_brand_keywords() -> Vec<String> {
    vec!["innovation".to_string(), "quality".to_string()]
}

fn default_avoid_words() -> Vec<String> {
    vec!["cheap".to_string(), "basic".to_string()]
}

fn default_color_palette() -> Vec<String> {
    vec!["#1a73e8".to_string(), "#34a853".to_string()]
}

fn default_brand_style() -> String {
    "modern, clean".to_string()
}

impl Default for BrandGuidelines {
    fn default() -> Self {
        Self {
            tone: default_brand_tone(),
            keywords: default_brand_keywords(),
            avoid_words: default_avoid_words(),
            color_palette: default_color_palette(),
            style: default_brand_style(),
        }
    }
}

/// Content constraints for one platform.
///
/// Character-limited platforms (linkedin, x) use the `max_chars` family;
/// long-form platforms (blog) use the word-count family. Unset fields are
/// omitted from serialized output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_words: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_words: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words: Option<u32>,
}

/// The supported platforms and their specs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformCatalog {
    #[serde(default = "default_linkedin_spec")]
    pub linkedin: PlatformSpec,
    #[serde(default = "default_x_spec")]
    pub x: PlatformSpec,
    #[serde(default = "default_blog_spec")]
    pub blog: PlatformSpec,
}

fn default_linkedin_spec() -> PlatformSpec {
    PlatformSpec {
        max_chars: Some(3000),
        optimal_length: Some(1500),
        hashtags: Some(5),
        ..PlatformSpec::default()
    }
}

fn default_x_spec() -> PlatformSpec {
    PlatformSpec {
        max_chars: Some(280),
        optimal_length: Some(200),
        hashtags: Some(3),
        ..PlatformSpec::default()
    }
}

fn default_blog_spec() -> PlatformSpec {
    PlatformSpec {
        min_words: Some(800),
        optimal_words: Some(1200),
        max_words: Some(2000),
        ..PlatformSpec::default()
    }
}

impl Default for PlatformCatalog {
    fn default() -> Self {
        Self {
            linkedin: default_linkedin_spec(),
            x: default_x_spec(),
            blog: default_blog_spec(),
        }
    }
}

impl PlatformCatalog {
    /// Returns the spec for the given platform.
    pub fn spec_for(&self, platform: Platform) -> &PlatformSpec {
        match platform {
            Platform::Linkedin => &self.linkedin,
            Platform::X => &self.x,
            Platform::Blog => &self.blog,
        }
    }
}

/// Model provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Provider name ("gemini" or "mock").
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Text generation model id.
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Image generation model id.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Sampling temperature for content-producing calls.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens per call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Review loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSettings {
    /// Hard cap on pipeline iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Minimum overall quality score to stop iterating.
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

fn default_max_iterations() -> u32 {
    2
}

fn default_min_score() -> f64 {
    7.0
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            min_score: default_min_score(),
        }
    }
}

/// Output directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Directory for generated images.
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// Directory for run artifacts.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("outputs/images")
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("outputs/content")
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            images_dir: default_images_dir(),
            content_dir: default_content_dir(),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Error reading configuration file.
    #[error("Error reading configuration file: {0}")]
    ReadError(String),

    /// Error parsing configuration file.
    #[error("Error parsing configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl PipelineConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the file is missing, unreadable, not valid
    /// TOML, or fails validation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks that configured values are usable.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.review.max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "review.max_iterations must be at least 1".to_string(),
            ));
        }
        if !(0.0..=10.0).contains(&self.review.min_score) {
            return Err(ConfigError::InvalidValue(
                "review.min_score must be between 0 and 10".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.models.temperature) {
            return Err(ConfigError::InvalidValue(
                "models.temperature must be between 0 and 2".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();

        assert_eq!(config.brand.tone, "professional, friendly");
        assert_eq!(config.brand.avoid_words, vec!["cheap", "basic"]);
        assert_eq!(config.platforms.linkedin.max_chars, Some(3000));
        assert_eq!(config.platforms.x.hashtags, Some(3));
        assert_eq!(config.platforms.blog.optimal_words, Some(1200));
        assert_eq!(config.models.text_model, "gemini-2.5-flash");
        assert_eq!(config.review.max_iterations, 2);
        assert!((config.review.min_score - 7.0).abs() < f64::EPSILON);
        assert_eq!(config.outputs.content_dir, PathBuf::from("outputs/content"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_spec_for_maps_platforms() {
        let config = PipelineConfig::default();

        assert_eq!(config.platforms.spec_for(Platform::X).max_chars, Some(280));
        assert_eq!(config.platforms.spec_for(Platform::Blog).min_words, Some(800));
    }

    #[test]
    fn test_platform_spec_serializes_only_set_fields() {
        let spec = default_x_spec();
        let value = serde_json::to_value(&spec).expect("serializes");

        assert_eq!(value["max_chars"], 280);
        assert!(value.get("min_words").is_none());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("vermilion.toml");
        let mut file = std::fs::File::create(&path).expect("create config file");
        writeln!(
            file,
            "[brand]\ntone = \"playful\"\n\n[review]\nmax_iterations = 3\n"
        )
        .expect("write config file");

        let config = PipelineConfig::load_from_file(&path).expect("loads");

        assert_eq!(config.brand.tone, "playful");
        assert_eq!(config.review.max_iterations, 3);
        // Untouched sections keep their defaults.
        assert_eq!(config.brand.keywords, vec!["innovation", "quality"]);
        assert_eq!(config.models.image_model, "gemini-2.5-flash-image-preview");
    }

    #[test]
    fn test_load_missing_file() {
        let result = PipelineConfig::load_from_file(Path::new("/nonexistent/vermilion.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let config = PipelineConfig {
            review: ReviewSettings { max_iterations: 0, ..ReviewSettings::default() },
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("vermilion.toml");
        std::fs::write(&path, "[models]\ntemperature = 9.5\n").expect("write config file");

        let result = PipelineConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }
}
