//! Pipeline orchestration.
//!
//! [`ContentPipeline`] wires the router, dispatcher, reviewer and stores
//! together and drives the iterative improvement loop: route once, then
//! dispatch and review up to `max_iterations` times, stopping early when the
//! reviewer approves or stops asking for improvement. Every model failure
//! along the way is absorbed as a degraded outcome; the only error a run can
//! surface is a persistence failure while writing the final artifact.

use crate::config::PipelineConfig;
use crate::dispatcher::TaskDispatcher;
use crate::outcome::{Outcome, StageError};
use crate::request::ContentRequest;
use crate::review::{ApprovalStatus, ContentReviewer, ReviewOutput, should_iterate};
use crate::routing::{ContentRouter, RoutingDecision};
use crate::store::{ImageStore, RunStore, StoreError};
use crate::tasks::{
    BrandValidatorTask, ImageCreatorTask, SeoOptimizerTask, TaskContext, TaskKind, TaskOutput,
    TextGeneratorTask,
};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use vermilion_abstraction::{ImageModel, Model};

/// Errors that fail a pipeline run outright.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The final artifact could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One dispatch-and-review round.
#[derive(Debug, Clone, Serialize)]
pub struct IterationRecord {
    /// 1-based iteration index.
    pub iteration: u32,
    pub outputs: BTreeMap<TaskKind, Outcome<TaskOutput>>,
    pub review: Outcome<ReviewOutput>,
    pub timestamp: DateTime<Local>,
}

/// The finished run: every iteration's outputs plus the final verdict.
///
/// `files_saved` is folded in after the artifact is written, so the artifact
/// on disk records where the run's images went but not its own path.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: Uuid,
    pub request: ContentRequest,
    pub routing: Outcome<RoutingDecision>,
    pub iterations: Vec<IterationRecord>,
    pub total_iterations: u32,
    pub final_outputs: BTreeMap<TaskKind, Outcome<TaskOutput>>,
    pub final_review: Outcome<ReviewOutput>,
    pub started_at: DateTime<Local>,
    pub completed_at: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_saved: Option<PathBuf>,
}

/// The full content pipeline.
pub struct ContentPipeline {
    router: ContentRouter,
    dispatcher: TaskDispatcher,
    reviewer: ContentReviewer,
    run_store: RunStore,
    config: Arc<PipelineConfig>,
}

impl ContentPipeline {
    /// Builds a pipeline with all four task executors registered.
    pub fn new(
        text_model: Arc<dyn Model>,
        image_model: Arc<dyn ImageModel>,
        config: PipelineConfig,
    ) -> Self {
        let config = Arc::new(config);

        let mut dispatcher = TaskDispatcher::new();
        dispatcher.register(Arc::new(TextGeneratorTask::new(
            Arc::clone(&text_model),
            Arc::clone(&config),
        )));
        dispatcher.register(Arc::new(SeoOptimizerTask::new(
            Arc::clone(&text_model),
            Arc::clone(&config),
        )));
        dispatcher.register(Arc::new(BrandValidatorTask::new(
            Arc::clone(&text_model),
            Arc::clone(&config),
        )));
        dispatcher.register(Arc::new(ImageCreatorTask::new(
            image_model,
            ImageStore::new(config.outputs.images_dir.clone()),
            Arc::clone(&config),
        )));

        Self {
            router: ContentRouter::new(Arc::clone(&text_model), Arc::clone(&config)),
            dispatcher,
            reviewer: ContentReviewer::new(text_model, Arc::clone(&config)),
            run_store: RunStore::new(config.outputs.content_dir.clone()),
            config,
        }
    }

    /// Runs the pipeline for one request.
    ///
    /// # Errors
    /// Returns a `PipelineError` only if the run artifact cannot be written;
    /// model failures degrade individual outcomes instead.
    pub async fn run(&self, request: &ContentRequest) -> Result<RunResult, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Local::now();
        info!(%run_id, topic = %request.topic, "Pipeline run started");

        let routing = self.router.decide(request).await;
        let decision = routing.output().clone();

        let max_iterations = self.config.review.max_iterations;
        let min_score = self.config.review.min_score;

        let mut iterations: Vec<IterationRecord> = Vec::new();
        let mut previous: BTreeMap<TaskKind, Outcome<TaskOutput>> = BTreeMap::new();
        let mut iteration = 0u32;

        while iteration < max_iterations {
            iteration += 1;
            info!(iteration, "Iteration started");

            let ctx = TaskContext::from_decision(&decision, previous.clone());
            let outputs = self
                .dispatcher
                .dispatch(&decision.required_tasks, decision.execution_order, request, ctx)
                .await;

            let review = self.reviewer.review(request, &outputs, iteration).await;
            let approved = review.output().approval_status == ApprovalStatus::Approved;
            let iterate_again = should_iterate(review.output(), min_score);

            iterations.push(IterationRecord {
                iteration,
                outputs: outputs.clone(),
                review,
                timestamp: Local::now(),
            });

            if approved || !iterate_again {
                info!(iteration, "Content approved, run complete");
                break;
            }
            if iteration < max_iterations {
                info!(iteration, "Quality below threshold, scheduling another iteration");
                previous = outputs;
            } else {
                warn!(iteration, "Iteration budget exhausted, finalizing current version");
            }
        }

        let (final_outputs, final_review) = match iterations.last() {
            Some(record) => (record.outputs.clone(), record.review.clone()),
            None => (
                BTreeMap::new(),
                Outcome::Degraded {
                    output: ReviewOutput::fallback(),
                    error: StageError::Aborted("no iterations executed".to_string()),
                },
            ),
        };

        let mut result = RunResult {
            run_id,
            request: request.clone(),
            routing,
            iterations,
            total_iterations: iteration,
            final_outputs,
            final_review,
            started_at,
            completed_at: Local::now(),
            files_saved: None,
        };

        let path = self.run_store.save(&result).await?;
        info!(path = %path.display(), "Run artifact saved");
        result.files_saved = Some(path);

        Ok(result)
    }
}
