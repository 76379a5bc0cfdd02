//! Content tasks.
//!
//! Each task kind independently turns a request plus context into one typed
//! payload. Tasks never raise past their boundary: `run` converts every
//! failure into a degraded outcome carrying the kind's conservative fallback
//! payload.

pub mod brand;
pub mod image;
pub mod seo;
pub mod text;

pub use brand::BrandValidatorTask;
pub use image::ImageCreatorTask;
pub use seo::SeoOptimizerTask;
pub use text::TextGeneratorTask;

use crate::config::PipelineConfig;
use crate::outcome::{Outcome, StageError};
use crate::request::ContentRequest;
use crate::routing::{Complexity, Platform, RoutingDecision, UnrecognizedValue};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;
use vermilion_abstraction::{ModelParameters, ResponseFormat};

/// The four task identifiers. Dispatch is closed over this enum; there are
/// no stringly-typed task names past the routing parse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    TextGenerator,
    ImageCreator,
    SeoOptimizer,
    BrandValidator,
}

impl TaskKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TextGenerator => "text_generator",
            Self::ImageCreator => "image_creator",
            Self::SeoOptimizer => "seo_optimizer",
            Self::BrandValidator => "brand_validator",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text_generator" => Ok(Self::TextGenerator),
            "image_creator" => Ok(Self::ImageCreator),
            "seo_optimizer" => Ok(Self::SeoOptimizer),
            "brand_validator" => Ok(Self::BrandValidator),
            other => Err(UnrecognizedValue(other.to_string())),
        }
    }
}

fn default_platform() -> Platform {
    Platform::Blog
}

/// Generated text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDraft {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
    /// Set by the task after parsing; the model does not return it.
    #[serde(default = "default_platform")]
    pub platform: Platform,
}

impl TextDraft {
    /// Conservative substitute when generation fails.
    pub fn fallback(platform: Platform) -> Self {
        Self {
            title: "Content Generation Failed".to_string(),
            content: "Unable to generate content at this time.".to_string(),
            summary: None,
            word_count: None,
            hashtags: Vec::new(),
            call_to_action: None,
            platform,
        }
    }
}

/// A generated and saved image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    pub success: bool,
}

impl ImageAsset {
    /// Conservative substitute when generation or saving fails.
    pub const fn fallback() -> Self {
        Self { image_path: None, prompt_used: None, platform: None, success: false }
    }
}

/// SEO analysis and optimization results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoReport {
    pub seo_score: f64,
    pub optimized_title: String,
    pub meta_description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optimized_hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readability_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub engagement_factors: Vec<String>,
    #[serde(default = "default_platform")]
    pub platform: Platform,
}

impl SeoReport {
    /// Conservative substitute when optimization fails. Reuses the prior
    /// text draft's title when one is available.
    pub fn fallback(platform: Platform, prior_title: Option<&str>) -> Self {
        Self {
            seo_score: 5.0,
            optimized_title: prior_title.unwrap_or("Optimized Title").to_string(),
            meta_description: "SEO optimization failed - manual review needed.".to_string(),
            keywords: Vec::new(),
            optimized_hashtags: Vec::new(),
            content_improvements: Vec::new(),
            readability_score: None,
            engagement_factors: Vec::new(),
            platform,
        }
    }
}

/// Detected tone versus the brand voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneAnalysis {
    pub current_tone: String,
    pub alignment_score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

/// Brand keyword usage breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brand_keywords_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibited_words_found: Vec<String>,
}

/// Brand compliance validation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandReport {
    pub brand_compliance_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_analysis: Option<ToneAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_analysis: Option<KeywordAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_assessment: Option<String>,
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_changes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
}

impl BrandReport {
    /// Conservative substitute when validation fails: not approved, manual
    /// review required.
    pub fn fallback() -> Self {
        Self {
            brand_compliance_score: 5.0,
            tone_analysis: None,
            keyword_analysis: None,
            overall_assessment: None,
            approved: false,
            required_changes: vec![
                "Manual brand review needed due to validation error".to_string(),
            ],
            strengths: Vec::new(),
        }
    }
}

/// One task's output, tagged with the task that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "agent", rename_all = "snake_case")]
pub enum TaskOutput {
    TextGenerator(TextDraft),
    ImageCreator(ImageAsset),
    SeoOptimizer(SeoReport),
    BrandValidator(BrandReport),
}

impl TaskOutput {
    /// Which task kind produced this output.
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::TextGenerator(_) => TaskKind::TextGenerator,
            Self::ImageCreator(_) => TaskKind::ImageCreator,
            Self::SeoOptimizer(_) => TaskKind::SeoOptimizer,
            Self::BrandValidator(_) => TaskKind::BrandValidator,
        }
    }

    /// The conservative fallback payload for a task kind.
    pub fn fallback_for(kind: TaskKind, ctx: &TaskContext) -> Self {
        match kind {
            TaskKind::TextGenerator => Self::TextGenerator(TextDraft::fallback(ctx.platform)),
            TaskKind::ImageCreator => Self::ImageCreator(ImageAsset::fallback()),
            TaskKind::SeoOptimizer => Self::SeoOptimizer(SeoReport::fallback(
                ctx.platform,
                ctx.text_draft().map(|draft| draft.title.as_str()),
            )),
            TaskKind::BrandValidator => Self::BrandValidator(BrandReport::fallback()),
        }
    }
}

/// Shared context handed to every task in one dispatch.
///
/// Built once per iteration from the routing decision; `prior` holds the
/// previous iteration's outcomes (plus, in sequential mode, the outcomes of
/// tasks that already ran in this iteration).
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub platform: Platform,
    pub platform_specs: serde_json::Value,
    pub complexity: Complexity,
    pub requires_images: bool,
    pub requires_seo: bool,
    pub prior: BTreeMap<TaskKind, Outcome<TaskOutput>>,
}

impl TaskContext {
    pub fn from_decision(
        decision: &RoutingDecision,
        prior: BTreeMap<TaskKind, Outcome<TaskOutput>>,
    ) -> Self {
        Self {
            platform: decision.content_type,
            platform_specs: decision.platform_specs.clone(),
            complexity: decision.complexity,
            requires_images: decision.requires_images,
            requires_seo: decision.requires_seo,
            prior,
        }
    }

    /// Threads a settled outcome into context for later tasks.
    pub fn insert_prior(&mut self, kind: TaskKind, outcome: Outcome<TaskOutput>) {
        self.prior.insert(kind, outcome);
    }

    /// The prior text draft, if one is in context. Degraded drafts count;
    /// their conservative payload is still valid input for downstream tasks.
    pub fn text_draft(&self) -> Option<&TextDraft> {
        match self.prior.get(&TaskKind::TextGenerator).map(Outcome::output) {
            Some(TaskOutput::TextGenerator(draft)) => Some(draft),
            _ => None,
        }
    }

    /// The prior SEO report, if one is in context.
    pub fn seo_report(&self) -> Option<&SeoReport> {
        match self.prior.get(&TaskKind::SeoOptimizer).map(Outcome::output) {
            Some(TaskOutput::SeoOptimizer(report)) => Some(report),
            _ => None,
        }
    }

    /// The prior image asset, if one is in context.
    pub fn image_asset(&self) -> Option<&ImageAsset> {
        match self.prior.get(&TaskKind::ImageCreator).map(Outcome::output) {
            Some(TaskOutput::ImageCreator(asset)) => Some(asset),
            _ => None,
        }
    }
}

/// Generation parameters shared by the content-producing model calls.
pub(crate) fn content_parameters(config: &PipelineConfig) -> ModelParameters {
    ModelParameters {
        temperature: Some(config.models.temperature),
        top_p: None,
        max_tokens: Some(config.models.max_tokens),
        stop_sequences: None,
        response_format: Some(ResponseFormat::Json),
    }
}

/// A single content task executor.
#[async_trait]
pub trait ContentTask: Send + Sync {
    /// Which task kind this executor implements.
    fn kind(&self) -> TaskKind;

    /// Runs the task, surfacing any failure.
    async fn try_run(
        &self,
        request: &ContentRequest,
        ctx: &TaskContext,
    ) -> Result<TaskOutput, StageError>;

    /// Infallible boundary around [`ContentTask::try_run`]: every failure
    /// degrades to the kind's fallback payload.
    async fn run(&self, request: &ContentRequest, ctx: &TaskContext) -> Outcome<TaskOutput> {
        match self.try_run(request, ctx).await {
            Ok(output) => Outcome::Completed(output),
            Err(error) => {
                warn!(task = %self.kind(), error = %error, "Task failed, substituting fallback output");
                Outcome::Degraded { output: TaskOutput::fallback_for(self.kind(), ctx), error }
            }
        }
    }
}
