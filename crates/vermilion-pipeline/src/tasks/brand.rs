//! Brand compliance validation task.

use crate::config::PipelineConfig;
use crate::json;
use crate::outcome::StageError;
use crate::request::ContentRequest;
use crate::tasks::{
    BrandReport, ContentTask, TaskContext, TaskKind, TaskOutput, content_parameters,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use vermilion_abstraction::Model;

/// Validates every produced asset against the brand guidelines.
///
/// Reads prior text, SEO, and image outputs from context when present.
pub struct BrandValidatorTask {
    model: Arc<dyn Model>,
    config: Arc<PipelineConfig>,
}

impl BrandValidatorTask {
    pub fn new(model: Arc<dyn Model>, config: Arc<PipelineConfig>) -> Self {
        Self { model, config }
    }

    fn validation_prompt(&self, ctx: &TaskContext) -> String {
        let text = ctx.text_draft().map_or_else(|| "{}".to_string(), |d| json::to_pretty(d));
        let seo = ctx.seo_report().map_or_else(|| "{}".to_string(), |r| json::to_pretty(r));
        let image = ctx.image_asset().map_or_else(|| "{}".to_string(), |a| json::to_pretty(a));

        format!(
            r#"Validate this content against brand guidelines:

Brand Guidelines: {brand}

Content to Validate:
Text: {text}
SEO: {seo}
Image: {image}

Check for:
1. Tone consistency with brand voice
2. Proper use of brand keywords
3. Avoidance of prohibited words
4. Overall brand alignment
5. Professional quality standards

Return JSON with:
{{
    "brand_compliance_score": number (1-10),
    "tone_analysis": {{
        "current_tone": "detected tone",
        "alignment_score": number (1-10),
        "recommendations": ["specific improvements"]
    }},
    "keyword_analysis": {{
        "brand_keywords_used": ["found keywords"],
        "missing_keywords": ["should include"],
        "prohibited_words_found": ["avoid these"]
    }},
    "overall_assessment": "detailed analysis",
    "approved": true/false,
    "required_changes": ["specific changes needed"],
    "strengths": ["what works well"]
}}

Be thorough and specific in your analysis."#,
            brand = json::to_pretty(&self.config.brand),
        )
    }
}

#[async_trait]
impl ContentTask for BrandValidatorTask {
    fn kind(&self) -> TaskKind {
        TaskKind::BrandValidator
    }

    async fn try_run(
        &self,
        _request: &ContentRequest,
        ctx: &TaskContext,
    ) -> Result<TaskOutput, StageError> {
        let prompt = self.validation_prompt(ctx);
        let parameters = content_parameters(&self.config);

        let response = self.model.generate_text(&prompt, Some(parameters)).await?;
        debug!(chars = response.content.len(), "Brand model responded");

        let report: BrandReport = json::parse_payload(&response.content)?;
        Ok(TaskOutput::BrandValidator(report))
    }
}
