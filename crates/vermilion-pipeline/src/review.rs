//! Quality review.
//!
//! The reviewer scores one iteration's combined outputs against the original
//! request. Review failures degrade to a conservative output that forces
//! another iteration (budget permitting); they never abort the run.
//!
//! Whether to iterate again is decided by two separate rules: the pure
//! [`should_iterate`] predicate over score and improvement flag, and the
//! orchestrator's own check of `approval_status`. A review can therefore be
//! internally inconsistent (approved with a low score); the orchestrator's
//! stop rule is authoritative.

use crate::config::PipelineConfig;
use crate::json;
use crate::outcome::{Outcome, StageError};
use crate::request::ContentRequest;
use crate::tasks::{TaskKind, TaskOutput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vermilion_abstraction::{Model, ModelParameters, ResponseFormat};

/// Reviews use a lower temperature than content generation.
const REVIEW_TEMPERATURE: f32 = 0.2;

/// The reviewer's verdict on one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Approved,
    #[default]
    NeedsRevision,
    Rejected,
}

/// Per-criterion scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualScores {
    pub goal_achievement: f64,
    pub quality_standards: f64,
    pub brand_consistency: f64,
    pub platform_optimization: f64,
    pub engagement_potential: f64,
}

/// Per-area feedback lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificFeedback {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_content: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_content: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seo_content: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brand_compliance: Vec<String>,
}

/// One iteration's quality review.
///
/// Parse defaults are deliberately pessimistic: a review missing the overall
/// score reads as 0, a missing improvement flag reads as true, and a missing
/// status reads as needs_revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutput {
    #[serde(default)]
    pub overall_quality_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_scores: Option<IndividualScores>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weaknesses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_feedback: Option<SpecificFeedback>,
    #[serde(default = "default_improvement_required")]
    pub improvement_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority_fixes: Vec<String>,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iteration_suggestions: Vec<String>,
}

fn default_improvement_required() -> bool {
    true
}

impl ReviewOutput {
    /// Conservative substitute when the review itself fails.
    pub fn fallback() -> Self {
        Self {
            overall_quality_score: 5.0,
            individual_scores: None,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            specific_feedback: None,
            improvement_required: true,
            priority_fixes: vec![
                "Manual quality review needed due to review error".to_string(),
            ],
            approval_status: ApprovalStatus::NeedsRevision,
            iteration_suggestions: Vec::new(),
        }
    }
}

/// Whether another iteration is warranted.
///
/// True iff the score is below `min_score` or the review demands
/// improvement. `approval_status` is intentionally not consulted here.
pub fn should_iterate(review: &ReviewOutput, min_score: f64) -> bool {
    review.overall_quality_score < min_score || review.improvement_required
}

/// Scores one iteration's combined outputs.
pub struct ContentReviewer {
    model: Arc<dyn Model>,
    config: Arc<PipelineConfig>,
}

impl ContentReviewer {
    pub fn new(model: Arc<dyn Model>, config: Arc<PipelineConfig>) -> Self {
        Self { model, config }
    }

    /// Reviews one iteration's outputs. Never fails: errors degrade to the
    /// conservative fallback review.
    pub async fn review(
        &self,
        request: &ContentRequest,
        outputs: &BTreeMap<TaskKind, Outcome<TaskOutput>>,
        iteration: u32,
    ) -> Outcome<ReviewOutput> {
        match self.try_review(request, outputs).await {
            Ok(review) => {
                info!(
                    iteration,
                    score = review.overall_quality_score,
                    status = ?review.approval_status,
                    "Review complete"
                );
                Outcome::Completed(review)
            }
            Err(error) => {
                warn!(iteration, error = %error, "Review failed, substituting conservative review");
                Outcome::Degraded { output: ReviewOutput::fallback(), error }
            }
        }
    }

    async fn try_review(
        &self,
        request: &ContentRequest,
        outputs: &BTreeMap<TaskKind, Outcome<TaskOutput>>,
    ) -> Result<ReviewOutput, StageError> {
        let prompt = self.review_prompt(request, outputs);
        let parameters = ModelParameters {
            temperature: Some(REVIEW_TEMPERATURE),
            top_p: None,
            max_tokens: Some(self.config.models.max_tokens),
            stop_sequences: None,
            response_format: Some(ResponseFormat::Json),
        };

        let response = self.model.generate_text(&prompt, Some(parameters)).await?;
        debug!(chars = response.content.len(), "Review model responded");

        json::parse_payload(&response.content)
    }

    fn review_prompt(
        &self,
        request: &ContentRequest,
        outputs: &BTreeMap<TaskKind, Outcome<TaskOutput>>,
    ) -> String {
        format!(
            r#"Review and evaluate all content outputs for quality and goal achievement:

Original Request: {request}

Agent Outputs:
{outputs}

Evaluate on these criteria:
1. Goal Achievement (1-10): Does content meet original request?
2. Quality Standards (1-10): Professional quality and accuracy
3. Brand Consistency (1-10): Alignment with brand guidelines
4. Platform Optimization (1-10): Suitable for target platform
5. Engagement Potential (1-10): Likely to engage target audience

Return JSON with:
{{
    "overall_quality_score": number (1-10),
    "individual_scores": {{
        "goal_achievement": number,
        "quality_standards": number,
        "brand_consistency": number,
        "platform_optimization": number,
        "engagement_potential": number
    }},
    "strengths": ["what works well"],
    "weaknesses": ["areas needing improvement"],
    "specific_feedback": {{
        "text_content": ["feedback for text"],
        "image_content": ["feedback for images"],
        "seo_content": ["feedback for SEO"],
        "brand_compliance": ["feedback for brand"]
    }},
    "improvement_required": true/false,
    "priority_fixes": ["most important changes"],
    "approval_status": "approved|needs_revision|rejected",
    "iteration_suggestions": ["how to improve in next iteration"]
}}

Be constructive and specific in feedback."#,
            request = json::to_pretty(request),
            outputs = json::to_pretty(outputs),
        )
    }
}
