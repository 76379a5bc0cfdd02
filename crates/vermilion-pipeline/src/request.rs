//! The content creation request.

use serde::{Deserialize, Serialize};

/// A single content creation request.
///
/// Supplied once per pipeline run and never mutated. The `platform` and
/// `content_type` fields are free text from the caller's perspective; the
/// router interprets them when deciding which tasks to run and which
/// platform the content targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    /// What the content should be about. May be empty; consumers substitute
    /// a generic placeholder where a topic is required.
    #[serde(default)]
    pub topic: String,

    /// Who the content is for (e.g. "healthcare professionals").
    #[serde(default)]
    pub target_audience: String,

    /// Requested publishing platform (e.g. "linkedin", "x", "blog").
    #[serde(default)]
    pub platform: String,

    /// Requested content form (e.g. "article", "post").
    #[serde(default)]
    pub content_type: String,

    /// Whether a custom image should be generated.
    #[serde(default)]
    pub include_images: bool,

    /// Desired tone of voice.
    #[serde(default)]
    pub tone: String,

    /// Key points the content should cover.
    #[serde(default)]
    pub key_points: Vec<String>,
}
