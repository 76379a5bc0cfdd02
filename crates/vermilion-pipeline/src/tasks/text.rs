//! Text generation task.

use crate::config::PipelineConfig;
use crate::json;
use crate::outcome::StageError;
use crate::request::ContentRequest;
use crate::tasks::{ContentTask, TaskContext, TaskKind, TaskOutput, TextDraft, content_parameters};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use vermilion_abstraction::Model;

/// Generates the written content for a request, adapted to the target
/// platform and brand guidelines.
pub struct TextGeneratorTask {
    model: Arc<dyn Model>,
    config: Arc<PipelineConfig>,
}

impl TextGeneratorTask {
    pub fn new(model: Arc<dyn Model>, config: Arc<PipelineConfig>) -> Self {
        Self { model, config }
    }

    fn generation_prompt(&self, request: &ContentRequest, ctx: &TaskContext) -> String {
        let brand = &self.config.brand;
        format!(
            r#"Create high-quality content based on these specifications:

Content Request: {request}
Platform: {platform}
Platform Specifications: {specs}
Brand Guidelines: {brand}

Requirements:
1. Follow the brand tone: {tone}
2. Include brand keywords naturally: {keywords:?}
3. Avoid these words: {avoid_words:?}
4. Adapt content length to platform requirements
5. Make it engaging and valuable for the target audience

Return a JSON object with:
{{
    "title": "Compelling title",
    "content": "Main content body",
    "summary": "Brief summary",
    "word_count": number,
    "hashtags": ["relevant", "hashtags"],
    "call_to_action": "Clear CTA"
}}

Ensure content is original, valuable, and platform-optimized."#,
            request = json::to_pretty(request),
            platform = ctx.platform,
            specs = json::to_pretty(&ctx.platform_specs),
            brand = json::to_pretty(brand),
            tone = brand.tone,
            keywords = brand.keywords,
            avoid_words = brand.avoid_words,
        )
    }
}

#[async_trait]
impl ContentTask for TextGeneratorTask {
    fn kind(&self) -> TaskKind {
        TaskKind::TextGenerator
    }

    async fn try_run(
        &self,
        request: &ContentRequest,
        ctx: &TaskContext,
    ) -> Result<TaskOutput, StageError> {
        let prompt = self.generation_prompt(request, ctx);
        let parameters = content_parameters(&self.config);

        let response = self.model.generate_text(&prompt, Some(parameters)).await?;
        debug!(chars = response.content.len(), "Text model responded");

        let mut draft: TextDraft = json::parse_payload(&response.content)?;
        draft.platform = ctx.platform;
        Ok(TaskOutput::TextGenerator(draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use crate::routing::{Complexity, Platform};
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

    fn context(platform: Platform) -> TaskContext {
        TaskContext {
            platform,
            platform_specs: serde_json::Value::Null,
            complexity: Complexity::Medium,
            requires_images: false,
            requires_seo: false,
            prior: BTreeMap::new(),
        }
    }

    fn request() -> ContentRequest {
        ContentRequest {
            topic: "Async Rust".to_string(),
            target_audience: "engineers".to_string(),
            platform: "linkedin".to_string(),
            content_type: "post".to_string(),
            include_images: false,
            tone: "technical".to_string(),
            key_points: vec!["ownership".to_string()],
        }
    }

    #[tokio::test]
    async fn test_parses_draft_and_sets_platform() {
        let task = TextGeneratorTask::new(
            Arc::new(CannedModel {
                content: r##"{
                    "title": "Async Rust in Production",
                    "content": "Body text.",
                    "summary": "Short summary",
                    "word_count": 450,
                    "hashtags": ["#rust"],
                    "call_to_action": "Read more"
                }"##
                .to_string(),
            }),
            Arc::new(PipelineConfig::default()),
        );

        let outcome = task.run(&request(), &context(Platform::Linkedin)).await;
        assert!(!outcome.is_degraded());

        let Outcome::Completed(TaskOutput::TextGenerator(draft)) = outcome else {
            panic!("expected a completed text draft");
        };
        assert_eq!(draft.title, "Async Rust in Production");
        assert_eq!(draft.word_count, Some(450));
        assert_eq!(draft.platform, Platform::Linkedin);
    }

    #[tokio::test]
    async fn test_malformed_output_degrades_to_fallback() {
        let task = TextGeneratorTask::new(
            Arc::new(CannedModel { content: "I refuse to answer in JSON.".to_string() }),
            Arc::new(PipelineConfig::default()),
        );

        let outcome = task.run(&request(), &context(Platform::X)).await;
        assert!(outcome.is_degraded());
        assert!(matches!(outcome.error(), Some(StageError::MalformedOutput(_))));

        let TaskOutput::TextGenerator(draft) = outcome.output() else {
            panic!("expected a text draft");
        };
        assert_eq!(draft.title, "Content Generation Failed");
        assert_eq!(draft.content, "Unable to generate content at this time.");
        assert_eq!(draft.platform, Platform::X);
    }
}
