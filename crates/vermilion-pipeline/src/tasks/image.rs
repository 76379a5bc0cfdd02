//! Image creation task.

use crate::config::PipelineConfig;
use crate::outcome::StageError;
use crate::request::ContentRequest;
use crate::store::ImageStore;
use crate::tasks::{ContentTask, ImageAsset, TaskContext, TaskKind, TaskOutput};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use vermilion_abstraction::{ImageModel, ModelParameters};

/// Generates a custom image for the content and saves it to disk.
pub struct ImageCreatorTask {
    model: Arc<dyn ImageModel>,
    store: ImageStore,
    config: Arc<PipelineConfig>,
}

impl ImageCreatorTask {
    pub fn new(model: Arc<dyn ImageModel>, store: ImageStore, config: Arc<PipelineConfig>) -> Self {
        Self { model, store, config }
    }

    fn image_prompt(&self, request: &ContentRequest, ctx: &TaskContext) -> String {
        let topic =
            if request.topic.is_empty() { "business content" } else { request.topic.as_str() };
        let brand = &self.config.brand;
        let colors = brand.color_palette.join(", ");
        let context_line = ctx.text_draft().map_or(topic, |draft| draft.title.as_str());

        format!(
            r#"Create a professional, high-quality image for {platform} content about: {topic}

Style Requirements:
- {style} design aesthetic
- Brand colors: {colors}
- Professional and engaging
- Suitable for business/professional audience
- Modern, clean composition

Content Context: {context_line}

Specifications:
- High resolution and quality
- Clear focal point
- Appropriate for social media sharing
- Visually appealing and professional
- On-brand visual elements

Create an image that complements the content and attracts audience attention."#,
            platform = ctx.platform,
            style = brand.style,
        )
    }
}

#[async_trait]
impl ContentTask for ImageCreatorTask {
    fn kind(&self) -> TaskKind {
        TaskKind::ImageCreator
    }

    async fn try_run(
        &self,
        request: &ContentRequest,
        ctx: &TaskContext,
    ) -> Result<TaskOutput, StageError> {
        let prompt = self.image_prompt(request, ctx);
        let parameters = ModelParameters {
            temperature: Some(self.config.models.temperature),
            top_p: None,
            max_tokens: Some(self.config.models.max_tokens),
            stop_sequences: None,
            response_format: None,
        };

        let image = self.model.generate_image(&prompt, Some(parameters)).await?;
        debug!(size = image.bytes.len(), mime = %image.mime_type, "Image model responded");

        let path = self
            .store
            .save_image(&image.bytes, &request.topic)
            .await
            .map_err(|e| StageError::ImageSave(e.to_string()))?;
        info!(path = %path.display(), "Generated image saved");

        Ok(TaskOutput::ImageCreator(ImageAsset {
            image_path: Some(path),
            prompt_used: Some(prompt),
            platform: Some(ctx.platform),
            success: true,
        }))
    }
}
