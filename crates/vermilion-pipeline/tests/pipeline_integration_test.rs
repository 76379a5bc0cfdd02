//! End-to-end pipeline tests against scripted models.
//!
//! The stub model answers each stage by matching the prompt's opening line,
//! so these tests drive the real router, dispatcher, reviewer and stores
//! without any network access.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use vermilion_abstraction::{
    ImageData, ImageModel, Model, ModelError, ModelParameters, ModelResponse,
};
use vermilion_pipeline::{
    ApprovalStatus, Complexity, ContentPipeline, ContentRequest, ExecutionOrder, Outcome,
    OutputSettings, PipelineConfig, Platform, TaskKind, TaskOutput,
};

const STUB_IMAGE_BYTES: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

/// Scripted text model. Answers each pipeline stage by prompt prefix and
/// records every prompt it sees.
struct StubModel {
    fail_routing: bool,
    fail_seo: bool,
    review_score: f64,
    approve: bool,
    seen: Mutex<Vec<String>>,
}

impl StubModel {
    fn scoring(review_score: f64, approve: bool) -> Self {
        Self {
            fail_routing: false,
            fail_seo: false,
            review_score,
            approve,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn approving() -> Self {
        Self::scoring(8.5, true)
    }

    fn prompts_starting_with(&self, prefix: &str) -> Vec<String> {
        self.seen
            .lock()
            .expect("prompt log lock")
            .iter()
            .filter(|prompt| prompt.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn routing_response() -> String {
        r#"{
            "required_agents": ["text_generator", "image_creator", "seo_optimizer", "brand_validator"],
            "content_type": "linkedin",
            "complexity": "complex",
            "requires_images": true,
            "requires_seo": true,
            "execution_order": "parallel",
            "platform_specs": {"max_length": 3000, "optimal_length": 1500}
        }"#
        .to_string()
    }

    fn review_response(&self) -> String {
        let status = if self.approve { "approved" } else { "needs_revision" };
        format!(
            r#"{{"overall_quality_score": {score}, "improvement_required": {improve}, "approval_status": "{status}"}}"#,
            score = self.review_score,
            improve = !self.approve,
        )
    }
}

#[async_trait]
impl Model for StubModel {
    async fn generate_text(
        &self,
        prompt: &str,
        _parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        self.seen.lock().expect("prompt log lock").push(prompt.to_string());

        let content = if prompt.starts_with("Analyze this content request") {
            if self.fail_routing {
                return Err(ModelError::RequestError("connection reset".to_string()));
            }
            Self::routing_response()
        } else if prompt.starts_with("Create high-quality content") {
            r##"{"title": "Stub Title", "content": "Stub body copy.", "hashtags": ["#stub"], "word_count": 3}"##
                .to_string()
        } else if prompt.starts_with("Analyze and optimize this content") {
            if self.fail_seo {
                return Err(ModelError::RequestError("seo backend down".to_string()));
            }
            r#"{"seo_score": 8.0, "optimized_title": "Stub Title, Optimized", "meta_description": "Stub meta.", "keywords": ["stub"]}"#
                .to_string()
        } else if prompt.starts_with("Validate this content against brand guidelines") {
            r#"{"brand_compliance_score": 9.0, "approved": true, "strengths": ["on brand"]}"#
                .to_string()
        } else if prompt.starts_with("Review and evaluate all content outputs") {
            self.review_response()
        } else {
            panic!("unexpected prompt: {}", prompt.lines().next().unwrap_or(""));
        };

        Ok(ModelResponse {
            content,
            model_id: Some("stub-text".to_string()),
            usage: None,
        })
    }

    fn model_id(&self) -> &str {
        "stub-text"
    }
}

struct StubImageModel;

#[async_trait]
impl ImageModel for StubImageModel {
    async fn generate_image(
        &self,
        _prompt: &str,
        _parameters: Option<ModelParameters>,
    ) -> Result<ImageData, ModelError> {
        Ok(ImageData {
            bytes: STUB_IMAGE_BYTES.to_vec(),
            mime_type: "image/png".to_string(),
            model_id: Some("stub-image".to_string()),
        })
    }

    fn model_id(&self) -> &str {
        "stub-image"
    }
}

fn test_config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        outputs: OutputSettings {
            images_dir: dir.join("images"),
            content_dir: dir.join("content"),
        },
        ..PipelineConfig::default()
    }
}

fn request() -> ContentRequest {
    ContentRequest {
        topic: "AI in Healthcare: Transforming Patient Care".to_string(),
        target_audience: "healthcare professionals".to_string(),
        platform: "linkedin".to_string(),
        content_type: "article".to_string(),
        include_images: true,
        tone: "professional, informative".to_string(),
        key_points: vec![
            "AI diagnostics accuracy".to_string(),
            "Patient data privacy".to_string(),
        ],
    }
}

fn read_artifact(result: &vermilion_pipeline::RunResult) -> serde_json::Value {
    let path = result.files_saved.as_ref().expect("artifact path");
    let raw = std::fs::read_to_string(path).expect("read artifact");
    serde_json::from_str(&raw).expect("artifact is valid JSON")
}

#[tokio::test]
async fn test_approved_run_stops_after_one_iteration() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let model = Arc::new(StubModel::approving());
    let pipeline =
        ContentPipeline::new(model, Arc::new(StubImageModel), test_config(dir.path()));

    let result = pipeline.run(&request()).await.expect("run succeeds");

    assert_eq!(result.total_iterations, 1);
    assert_eq!(result.iterations.len(), 1);
    assert!(!result.routing.is_degraded());
    assert_eq!(result.final_review.output().approval_status, ApprovalStatus::Approved);

    // All four routed tasks produced an output.
    assert_eq!(result.final_outputs.len(), 4);
    assert!(result.final_outputs.values().all(|outcome| !outcome.is_degraded()));

    // The generated image landed on disk under the configured directory.
    let Some(TaskOutput::ImageCreator(asset)) =
        result.final_outputs.get(&TaskKind::ImageCreator).map(Outcome::output)
    else {
        panic!("expected an image asset");
    };
    assert!(asset.success);
    assert_eq!(asset.platform, Some(Platform::Linkedin));
    let image_path = asset.image_path.as_ref().expect("image path");
    assert!(image_path.starts_with(dir.path().join("images")));
    assert_eq!(std::fs::read(image_path).expect("image bytes"), STUB_IMAGE_BYTES);
}

#[tokio::test]
async fn test_artifact_records_the_full_run() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let model = Arc::new(StubModel::approving());
    let pipeline =
        ContentPipeline::new(model, Arc::new(StubImageModel), test_config(dir.path()));

    let result = pipeline.run(&request()).await.expect("run succeeds");

    let path = result.files_saved.as_ref().expect("artifact path");
    let filename = path.file_name().and_then(|n| n.to_str()).expect("artifact filename");
    assert!(filename.starts_with("AI_in_Healthcare_Transforming_Patient_Care_"));
    assert!(filename.ends_with("_results.json"));

    let artifact = read_artifact(&result);
    assert!(artifact["run_id"].is_string());
    assert!(artifact["started_at"].is_string());
    assert!(artifact["completed_at"].is_string());
    assert_eq!(artifact["request"]["topic"], "AI in Healthcare: Transforming Patient Care");
    assert_eq!(artifact["total_iterations"], 1);
    assert_eq!(artifact["routing"]["content_type"], "linkedin");
    assert_eq!(artifact["iterations"][0]["iteration"], 1);
    assert_eq!(artifact["final_review"]["approval_status"], "approved");
    assert_eq!(
        artifact["final_outputs"]["text_generator"]["title"],
        "Stub Title"
    );
    // The artifact is written before the saved path is known.
    assert!(artifact.get("files_saved").is_none());
}

#[tokio::test]
async fn test_low_scores_run_to_the_iteration_cap() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let model = Arc::new(StubModel::scoring(4.0, false));
    let pipeline = ContentPipeline::new(
        Arc::clone(&model) as Arc<dyn Model>,
        Arc::new(StubImageModel),
        test_config(dir.path()),
    );

    let result = pipeline.run(&request()).await.expect("run succeeds");

    assert_eq!(result.total_iterations, 2);
    assert_eq!(result.iterations.len(), 2);
    assert_eq!(
        result.final_review.output().approval_status,
        ApprovalStatus::NeedsRevision
    );
    // The final verdict is the last iteration's, not a composite.
    assert_eq!(result.final_review, result.iterations[1].review);
    assert_eq!(result.final_outputs, result.iterations[1].outputs);
    for record in &result.iterations {
        assert_eq!(record.outputs.len(), 4);
    }

    // The first SEO pass sees no draft; the second sees iteration 1's draft
    // carried forward through the task context.
    let seo_prompts =
        model.prompts_starting_with("Analyze and optimize this content");
    assert_eq!(seo_prompts.len(), 2);
    assert!(!seo_prompts[0].contains("Stub Title"));
    assert!(seo_prompts[1].contains("Stub Title"));
}

#[tokio::test]
async fn test_routing_failure_falls_back_to_baseline_tasks() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let model = Arc::new(StubModel { fail_routing: true, ..StubModel::approving() });
    let pipeline =
        ContentPipeline::new(model, Arc::new(StubImageModel), test_config(dir.path()));

    let result = pipeline.run(&request()).await.expect("run succeeds");

    assert!(result.routing.is_degraded());
    let decision = result.routing.output();
    assert_eq!(
        decision.required_tasks,
        vec![TaskKind::TextGenerator, TaskKind::BrandValidator]
    );
    assert_eq!(decision.content_type, Platform::Blog);
    assert_eq!(decision.complexity, Complexity::Medium);
    assert_eq!(decision.execution_order, ExecutionOrder::Parallel);
    assert!(!decision.requires_images);
    assert_eq!(decision.platform_specs["min_words"], 800);

    // Only the fallback task set ran.
    assert_eq!(result.total_iterations, 1);
    let kinds: Vec<TaskKind> = result.final_outputs.keys().copied().collect();
    assert_eq!(kinds, vec![TaskKind::TextGenerator, TaskKind::BrandValidator]);

    let artifact = read_artifact(&result);
    assert!(artifact["routing"]["error"].is_string());
}

#[tokio::test]
async fn test_degraded_task_never_fails_its_siblings() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let model = Arc::new(StubModel { fail_seo: true, ..StubModel::approving() });
    let pipeline =
        ContentPipeline::new(model, Arc::new(StubImageModel), test_config(dir.path()));

    let result = pipeline.run(&request()).await.expect("run succeeds");

    assert_eq!(result.final_outputs.len(), 4);
    let seo = &result.final_outputs[&TaskKind::SeoOptimizer];
    assert!(seo.is_degraded());
    let TaskOutput::SeoOptimizer(report) = seo.output() else {
        panic!("expected an SEO report");
    };
    assert!((report.seo_score - 5.0).abs() < f64::EPSILON);
    assert!(!result.final_outputs[&TaskKind::TextGenerator].is_degraded());
    assert!(!result.final_outputs[&TaskKind::BrandValidator].is_degraded());

    // The artifact carries the error on the degraded entry only.
    let artifact = read_artifact(&result);
    let outputs = &artifact["iterations"][0]["outputs"];
    assert!(outputs["seo_optimizer"]["error"].is_string());
    assert!(outputs["text_generator"].get("error").is_none());
}
