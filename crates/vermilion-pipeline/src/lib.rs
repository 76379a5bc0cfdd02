//! Vermilion Pipeline - multi-stage content generation.
//!
//! This crate provides the content pipeline for Vermilion, including:
//! - Request routing to the task set a request needs
//! - Parallel or sequential task dispatch
//! - Iterative quality review with a bounded improvement loop
//! - Artifact and image persistence
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vermilion_pipeline::{ContentPipeline, ContentRequest, PipelineConfig};
//! use vermilion_models::{MockImageModel, MockModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vermilion_pipeline::PipelineError> {
//!     let pipeline = ContentPipeline::new(
//!         Arc::new(MockModel::new("mock-text".to_string())),
//!         Arc::new(MockImageModel::new("mock-image".to_string())),
//!         PipelineConfig::default(),
//!     );
//!     let request = ContentRequest {
//!         topic: "Rust in production".to_string(),
//!         ..ContentRequest::default()
//!     };
//!     let result = pipeline.run(&request).await?;
//!     println!("finished after {} iterations", result.total_iterations);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatcher;
mod json;
pub mod outcome;
pub mod pipeline;
pub mod request;
pub mod review;
pub mod routing;
pub mod store;
pub mod tasks;

pub use config::{
    BrandGuidelines, ConfigError, ModelSettings, OutputSettings, PipelineConfig, PlatformCatalog,
    PlatformSpec, ReviewSettings,
};
pub use dispatcher::TaskDispatcher;
pub use outcome::{Outcome, StageError};
pub use pipeline::{ContentPipeline, IterationRecord, PipelineError, RunResult};
pub use request::ContentRequest;
pub use review::{
    ApprovalStatus, ContentReviewer, IndividualScores, ReviewOutput, SpecificFeedback,
    should_iterate,
};
pub use routing::{
    Complexity, ContentRouter, ExecutionOrder, Platform, RoutingDecision, UnrecognizedValue,
};
pub use store::{ImageStore, RunStore, StoreError};
pub use tasks::{
    BrandReport, BrandValidatorTask, ContentTask, ImageAsset, ImageCreatorTask, SeoOptimizerTask,
    SeoReport, TaskContext, TaskKind, TaskOutput, TextDraft, TextGeneratorTask,
};
