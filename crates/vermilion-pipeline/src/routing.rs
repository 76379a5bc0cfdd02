//! Request routing.
//!
//! The router inspects a content request and decides which tasks run, in
//! which mode, and for which platform. Routing never fails a run: any model
//! or parse error degrades to a fixed fallback decision, and the mandatory
//! baseline tasks are enforced on every decision regardless of source.

use crate::config::PipelineConfig;
use crate::json;
use crate::outcome::{Outcome, StageError};
use crate::request::ContentRequest;
use crate::tasks::TaskKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use vermilion_abstraction::{Model, ModelParameters, ResponseFormat};

/// Routing decisions use a lower temperature than content generation.
const ROUTING_TEMPERATURE: f32 = 0.3;

/// A value in model output that does not name a known variant.
#[derive(Debug, Error)]
#[error("unrecognized value: {0}")]
pub struct UnrecognizedValue(pub String);

/// Target publishing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Blog,
    Linkedin,
    X,
}

impl Platform {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Linkedin => "linkedin",
            Self::X => "x",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blog" => Ok(Self::Blog),
            "linkedin" => Ok(Self::Linkedin),
            "x" => Ok(Self::X),
            other => Err(UnrecognizedValue(other.to_string())),
        }
    }
}

/// How demanding the request is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "medium" => Ok(Self::Medium),
            "complex" => Ok(Self::Complex),
            other => Err(UnrecognizedValue(other.to_string())),
        }
    }
}

/// How the dispatcher runs the required tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionOrder {
    Parallel,
    Sequential,
}

impl ExecutionOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for ExecutionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionOrder {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parallel" => Ok(Self::Parallel),
            "sequential" => Ok(Self::Sequential),
            other => Err(UnrecognizedValue(other.to_string())),
        }
    }
}

/// The routing decision for one pipeline run.
///
/// Produced once by the router and read-only thereafter. `required_tasks`
/// is an ordered, duplicate-free list; order matters in sequential mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub required_tasks: Vec<TaskKind>,
    pub content_type: Platform,
    pub complexity: Complexity,
    pub requires_images: bool,
    pub requires_seo: bool,
    pub execution_order: ExecutionOrder,
    /// Platform-specific requirements as decided by the model, or the
    /// configured spec for the decided platform when the model omits them.
    pub platform_specs: serde_json::Value,
}

/// Routing decision as the model returns it, before validation.
#[derive(Debug, Deserialize)]
struct RawRoutingDecision {
    required_agents: Vec<String>,
    #[serde(default = "default_content_type")]
    content_type: String,
    #[serde(default = "default_complexity")]
    complexity: String,
    #[serde(default)]
    requires_images: bool,
    #[serde(default)]
    requires_seo: bool,
    #[serde(default = "default_execution_order")]
    execution_order: String,
    #[serde(default)]
    platform_specs: serde_json::Value,
}

fn default_content_type() -> String {
    "blog".to_string()
}

fn default_complexity() -> String {
    "medium".to_string()
}

fn default_execution_order() -> String {
    "parallel".to_string()
}

/// Decides which tasks a request needs.
pub struct ContentRouter {
    model: Arc<dyn Model>,
    config: Arc<PipelineConfig>,
}

impl ContentRouter {
    pub fn new(model: Arc<dyn Model>, config: Arc<PipelineConfig>) -> Self {
        Self { model, config }
    }

    /// Produces the routing decision for a request.
    ///
    /// Never fails: model or parse errors degrade to the fixed fallback
    /// decision. The baseline tasks are enforced on both paths.
    pub async fn decide(&self, request: &ContentRequest) -> Outcome<RoutingDecision> {
        match self.try_decide(request).await {
            Ok(mut decision) => {
                Self::ensure_baseline(&mut decision);
                info!(
                    tasks = ?decision.required_tasks,
                    platform = %decision.content_type,
                    order = %decision.execution_order,
                    "Routing decision made"
                );
                Outcome::Completed(decision)
            }
            Err(error) => {
                warn!(error = %error, "Routing failed, using fallback decision");
                let mut decision = self.fallback_decision();
                Self::ensure_baseline(&mut decision);
                Outcome::Degraded { output: decision, error }
            }
        }
    }

    async fn try_decide(&self, request: &ContentRequest) -> Result<RoutingDecision, StageError> {
        let prompt = self.routing_prompt(request);
        let parameters = ModelParameters {
            temperature: Some(ROUTING_TEMPERATURE),
            top_p: None,
            max_tokens: Some(self.config.models.max_tokens),
            stop_sequences: None,
            response_format: Some(ResponseFormat::Json),
        };

        let response = self.model.generate_text(&prompt, Some(parameters)).await?;
        debug!(raw = %response.content, "Routing model responded");
        self.parse_decision(&response.content)
    }

    fn routing_prompt(&self, request: &ContentRequest) -> String {
        format!(
            r#"Analyze this content request and determine which agents should be involved:

Request: {request}

Available Agents:
- text_generator: Creates written content
- image_creator: Generates custom images
- seo_optimizer: Optimizes for search engines
- brand_validator: Ensures brand compliance

Platform Capabilities: {platforms}
Brand Guidelines: {brand}

Return a JSON object with:
{{
    "required_agents": ["agent1", "agent2"],
    "content_type": "blog|linkedin|x",
    "complexity": "simple|medium|complex",
    "requires_images": true/false,
    "requires_seo": true/false,
    "execution_order": "parallel|sequential",
    "platform_specs": {{platform-specific requirements}}
}}

Be precise and only include necessary agents."#,
            request = json::to_pretty(request),
            platforms = json::to_pretty(&self.config.platforms),
            brand = json::to_pretty(&self.config.brand),
        )
    }

    fn parse_decision(&self, raw: &str) -> Result<RoutingDecision, StageError> {
        let raw_decision: RawRoutingDecision = json::parse_payload(raw)?;

        let mut required_tasks = Vec::new();
        for name in &raw_decision.required_agents {
            match name.parse::<TaskKind>() {
                Ok(kind) if required_tasks.contains(&kind) => {
                    debug!(task = %kind, "Dropping duplicate task from routing decision");
                }
                Ok(kind) => required_tasks.push(kind),
                Err(_) => {
                    warn!(name = %name, "Dropping unknown task name from routing decision");
                }
            }
        }

        let content_type =
            lenient_parse(&raw_decision.content_type, Platform::Blog, "content_type");
        let complexity = lenient_parse(&raw_decision.complexity, Complexity::Medium, "complexity");
        let execution_order = lenient_parse(
            &raw_decision.execution_order,
            ExecutionOrder::Parallel,
            "execution_order",
        );

        let platform_specs = if raw_decision.platform_specs.is_null() {
            serde_json::to_value(self.config.platforms.spec_for(content_type))
                .unwrap_or_default()
        } else {
            raw_decision.platform_specs
        };

        Ok(RoutingDecision {
            required_tasks,
            content_type,
            complexity,
            requires_images: raw_decision.requires_images,
            requires_seo: raw_decision.requires_seo,
            execution_order,
            platform_specs,
        })
    }

    fn fallback_decision(&self) -> RoutingDecision {
        RoutingDecision {
            required_tasks: vec![TaskKind::TextGenerator, TaskKind::BrandValidator],
            content_type: Platform::Blog,
            complexity: Complexity::Medium,
            requires_images: false,
            requires_seo: false,
            execution_order: ExecutionOrder::Parallel,
            platform_specs: serde_json::to_value(&self.config.platforms.blog)
                .unwrap_or_default(),
        }
    }

    /// Forces the mandatory baseline tasks into the decision.
    fn ensure_baseline(decision: &mut RoutingDecision) {
        if !decision.required_tasks.contains(&TaskKind::BrandValidator) {
            decision.required_tasks.push(TaskKind::BrandValidator);
        }
        if !decision.required_tasks.contains(&TaskKind::TextGenerator) {
            decision.required_tasks.push(TaskKind::TextGenerator);
        }
    }
}

/// Parses an enum-valued field, falling back with a warning on junk.
fn lenient_parse<T: FromStr>(value: &str, fallback: T, field: &'static str) -> T {
    match value.parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(field = field, value = %value, "Unknown value in routing decision, using fallback");
            fallback
        }
    }
}
