//! Vermilion CLI - Command-line interface for the Vermilion content pipeline
//!
//! This CLI provides a `verm` command for running the multi-stage content
//! creation pipeline against a configured model provider.

mod summary;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use vermilion_models::{ModelConfig, ModelFactory, ModelType};
use vermilion_pipeline::{ContentPipeline, ContentRequest, PipelineConfig};

/// Vermilion CLI - Multi-modal content creation pipeline
///
/// Vermilion (verm) routes a content request to the task set it needs, runs
/// those tasks against a model provider, and iterates until the quality
/// review approves the result or the iteration budget runs out.
#[derive(Parser, Debug)]
#[command(
    name = "verm",
    author,
    version,
    about = "Vermilion - multi-modal content creation pipeline",
    long_about = "Vermilion (verm) is a multi-agent content creation pipeline.\nIt routes each request to the tasks it needs, runs them concurrently, and\niterates on the output until a quality review approves it."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model provider override (mock, gemini)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Print the full run result as JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline for a content request
    Run {
        /// What the content should be about
        #[arg(long)]
        topic: String,

        /// Who the content is for
        #[arg(long, default_value = "")]
        audience: String,

        /// Target platform (linkedin, x, blog)
        #[arg(long, default_value = "blog")]
        platform: String,

        /// Content form (article, post)
        #[arg(long, default_value = "article")]
        content_type: String,

        /// Desired tone of voice
        #[arg(long, default_value = "")]
        tone: String,

        /// Key point the content should cover (repeatable)
        #[arg(long = "key-point")]
        key_points: Vec<String>,

        /// Generate a custom image as well
        #[arg(long)]
        images: bool,
    },

    /// Run the built-in demo request
    ///
    /// Runs a sample LinkedIn article request through the full pipeline.
    /// Useful for verifying provider credentials and configuration.
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    // Create models
    let provider = args.provider.as_deref().unwrap_or(&config.models.provider);
    let model_type = ModelType::from_str(provider)
        .with_context(|| format!("Unsupported model provider: {provider}"))?;

    let text_model = ModelFactory::create_text_model(ModelConfig::new(
        model_type,
        config.models.text_model.clone(),
    ))
    .context("Failed to create text model")?;
    let image_model = ModelFactory::create_image_model(ModelConfig::new(
        model_type,
        config.models.image_model.clone(),
    ))
    .context("Failed to create image model")?;

    let request = match args.command {
        Command::Run { topic, audience, platform, content_type, tone, key_points, images } => {
            ContentRequest {
                topic,
                target_audience: audience,
                platform,
                content_type,
                include_images: images,
                tone,
                key_points,
            }
        }
        Command::Demo => demo_request(),
    };

    let pipeline = ContentPipeline::new(text_model, image_model, config);
    let result = pipeline.run(&request).await.context("Pipeline run failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        summary::print_run_summary(&result);
    }

    Ok(())
}

/// The sample request used by `verm demo`.
fn demo_request() -> ContentRequest {
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
            "Cost reduction benefits".to_string(),
            "Implementation challenges".to_string(),
        ],
    }
}
