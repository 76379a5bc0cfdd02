//! SEO optimization task.

use crate::config::PipelineConfig;
use crate::json;
use crate::outcome::StageError;
use crate::request::ContentRequest;
use crate::tasks::{ContentTask, SeoReport, TaskContext, TaskKind, TaskOutput, content_parameters};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use vermilion_abstraction::Model;

/// Analyzes the drafted content for search and platform discoverability.
///
/// Reads the prior text draft from context when one is available (a later
/// iteration, or sequential mode after the text task ran).
pub struct SeoOptimizerTask {
    model: Arc<dyn Model>,
    config: Arc<PipelineConfig>,
}

impl SeoOptimizerTask {
    pub fn new(model: Arc<dyn Model>, config: Arc<PipelineConfig>) -> Self {
        Self { model, config }
    }

    fn seo_prompt(&self, request: &ContentRequest, ctx: &TaskContext) -> String {
        let text_content =
            ctx.text_draft().map_or_else(|| "{}".to_string(), |draft| json::to_pretty(draft));
        let topic = if request.topic.is_empty() { "general" } else { request.topic.as_str() };

        format!(
            r##"Analyze and optimize this content for SEO and platform discoverability:

Original Content: {text_content}
Platform: {platform}
Topic: {topic}

Provide SEO optimization recommendations and enhanced elements:

Return JSON with:
{{
    "seo_score": number (1-10),
    "optimized_title": "SEO-friendly title",
    "meta_description": "Compelling meta description (150-160 chars)",
    "keywords": ["primary", "secondary", "long-tail"],
    "optimized_hashtags": ["#relevant", "#trending"],
    "content_improvements": ["specific suggestions"],
    "readability_score": number (1-10),
    "engagement_factors": ["elements that increase engagement"]
}}

Focus on:
1. Keyword optimization without keyword stuffing
2. Platform-specific optimization
3. User engagement factors
4. Discoverability improvements"##,
            platform = ctx.platform,
        )
    }
}

#[async_trait]
impl ContentTask for SeoOptimizerTask {
    fn kind(&self) -> TaskKind {
        TaskKind::SeoOptimizer
    }

    async fn try_run(
        &self,
        request: &ContentRequest,
        ctx: &TaskContext,
    ) -> Result<TaskOutput, StageError> {
        let prompt = self.seo_prompt(request, ctx);
        let parameters = content_parameters(&self.config);

        let response = self.model.generate_text(&prompt, Some(parameters)).await?;
        debug!(chars = response.content.len(), "SEO model responded");

        let mut report: SeoReport = json::parse_payload(&response.content)?;
        report.platform = ctx.platform;
        Ok(TaskOutput::SeoOptimizer(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use crate::routing::{Complexity, Platform};
    use crate::tasks::TextDraft;
    use std::collections::BTreeMap;
    use vermilion_abstraction::{ModelError, ModelParameters, ModelResponse};

    struct CannedModel {
        content: String,
    }

    #[async_trait]
    impl Model for CannedModel {
        async fn generate_text(
            &self,
            _prompt: &str,
            _parameters: Option<ModelParameters>,
        ) -> Result<ModelResponse, ModelError> {
            Ok(ModelResponse {
                content: self.content.clone(),
                model_id: Some("canned".to_string()),
                usage: None,
            })
        }

        fn model_id(&self) -> &str {
            "canned"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl Model for FailingModel {
        async fn generate_text(
            &self,
            _prompt: &str,
            _parameters: Option<ModelParameters>,
        ) -> Result<ModelResponse, ModelError> {
            Err(ModelError::RequestError("timeout".to_string()))
        }

        fn model_id(&self) -> &str {
            "failing"
        }
    }

    fn context_with_draft(title: &str) -> TaskContext {
        let mut ctx = TaskContext {
            platform: Platform::Blog,
            platform_specs: serde_json::Value::Null,
            complexity: Complexity::Medium,
            requires_images: false,
            requires_seo: true,
            prior: BTreeMap::new(),
        };
        let mut draft = TextDraft::fallback(Platform::Blog);
        draft.title = title.to_string();
        ctx.insert_prior(
            TaskKind::TextGenerator,
            Outcome::Completed(TaskOutput::TextGenerator(draft)),
        );
        ctx
    }

    fn request() -> ContentRequest {
        ContentRequest {
            topic: "Observability".to_string(),
            target_audience: String::new(),
            platform: "blog".to_string(),
            content_type: "article".to_string(),
            include_images: false,
            tone: String::new(),
            key_points: vec![],
        }
    }

    #[tokio::test]
    async fn test_parses_report_and_sets_platform() {
        let task = SeoOptimizerTask::new(
            Arc::new(CannedModel {
                content: r#"{
                    "seo_score": 8,
                    "optimized_title": "Observability Done Right",
                    "meta_description": "A practical observability guide.",
                    "keywords": ["observability", "tracing"],
                    "readability_score": 7
                }"#
                .to_string(),
            }),
            Arc::new(PipelineConfig::default()),
        );

        let outcome = task.run(&request(), &context_with_draft("Draft Title")).await;
        assert!(!outcome.is_degraded());

        let TaskOutput::SeoOptimizer(report) = outcome.output() else {
            panic!("expected an SEO report");
        };
        assert!((report.seo_score - 8.0).abs() < f64::EPSILON);
        assert_eq!(report.platform, Platform::Blog);
        assert_eq!(report.keywords, vec!["observability", "tracing"]);
    }

    #[tokio::test]
    async fn test_failure_fallback_reuses_draft_title() {
        let task = SeoOptimizerTask::new(
            Arc::new(FailingModel),
            Arc::new(PipelineConfig::default()),
        );

        let outcome = task.run(&request(), &context_with_draft("Observability Deep Dive")).await;
        assert!(outcome.is_degraded());

        let TaskOutput::SeoOptimizer(report) = outcome.output() else {
            panic!("expected an SEO report");
        };
        assert_eq!(report.optimized_title, "Observability Deep Dive");
        assert_eq!(report.meta_description, "SEO optimization failed - manual review needed.");
    }

    #[tokio::test]
    async fn test_prompt_embeds_prior_draft() {
        let task = SeoOptimizerTask::new(
            Arc::new(FailingModel),
            Arc::new(PipelineConfig::default()),
        );

        let prompt = task.seo_prompt(&request(), &context_with_draft("Embedded Title"));
        assert!(prompt.contains("Embedded Title"));
        assert!(prompt.contains("Topic: Observability"));
    }

    #[tokio::test]
    async fn test_prompt_defaults_empty_topic() {
        let task = SeoOptimizerTask::new(
            Arc::new(FailingModel),
            Arc::new(PipelineConfig::default()),
        );

        let blank = ContentRequest { topic: String::new(), ..request() };
        let prompt = task.seo_prompt(&blank, &context_with_draft("Embedded Title"));
        assert!(prompt.contains("Topic: general"));
    }
}
