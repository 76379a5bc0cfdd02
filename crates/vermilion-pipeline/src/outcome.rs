//! Stage outcome type.
//!
//! Every fallible pipeline stage (routing, task execution, review) returns an
//! [`Outcome`] instead of a bare `Result`: a failed stage still produces a
//! structurally valid value with conservative defaults, and the error that
//! caused the degradation travels alongside it. Callers must acknowledge the
//! degraded case explicitly; nothing short of artifact persistence can abort
//! a run.

use serde::{Serialize, Serializer};
use thiserror::Error;
use vermilion_abstraction::ModelError;

/// An error captured inside a pipeline stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// The underlying model call failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The model answered, but the payload could not be parsed.
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    /// A generated image could not be written to disk.
    #[error("Failed to save image: {0}")]
    ImageSave(String),

    /// A spawned task was cancelled or panicked before settling.
    #[error("Task aborted: {0}")]
    Aborted(String),
}

/// The result of a pipeline stage.
///
/// `Completed` carries the stage's normal output. `Degraded` carries a
/// conservative substitute output together with the error that forced the
/// substitution. Both variants hold a usable value, so downstream stages
/// never need an error branch for upstream failures.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The stage ran to completion.
    Completed(T),
    /// The stage failed and substituted a fallback value.
    Degraded {
        /// The fallback value standing in for the real output.
        output: T,
        /// What went wrong.
        error: StageError,
    },
}

impl<T> Outcome<T> {
    /// Returns the carried output, degraded or not.
    pub fn output(&self) -> &T {
        match self {
            Self::Completed(output) | Self::Degraded { output, .. } => output,
        }
    }

    /// Consumes the outcome, returning the carried output.
    pub fn into_output(self) -> T {
        match self {
            Self::Completed(output) | Self::Degraded { output, .. } => output,
        }
    }

    /// Returns the error behind a degraded outcome, if any.
    pub fn error(&self) -> Option<&StageError> {
        match self {
            Self::Completed(_) => None,
            Self::Degraded { error, .. } => Some(error),
        }
    }

    /// Whether this outcome came from the fallback path.
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Serializes as the output value itself; a degraded outcome additionally
/// folds the error description into the output's JSON object as an `error`
/// field, matching the run artifact format.
impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Completed(output) => output.serialize(serializer),
            Self::Degraded { output, error } => {
                let mut value =
                    serde_json::to_value(output).map_err(serde::ser::Error::custom)?;
                let Some(map) = value.as_object_mut() else {
                    return Err(serde::ser::Error::custom(
                        "degraded outcome payload must serialize to a JSON object",
                    ));
                };
                map.insert(
                    "error".to_string(),
                    serde_json::Value::String(error.to_string()),
                );
                value.serialize(serializer)
            }
        }
    }
}
