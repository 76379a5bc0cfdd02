//! Output persistence.
//!
//! Two small stores write pipeline outputs to disk: [`RunStore`] persists the
//! finished run artifact as pretty-printed JSON, [`ImageStore`] persists
//! generated image bytes as received. Filenames derive from the sanitized
//! request topic plus a local timestamp; output directories are created on
//! demand.

use crate::pipeline::RunResult;
use chrono::Local;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors from writing pipeline outputs.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not create the output directory.
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    /// Could not write the output file.
    #[error("Failed to write output file: {0}")]
    Write(std::io::Error),

    /// Could not serialize the run result.
    #[error("Failed to serialize run result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persists run artifacts to the content directory.
#[derive(Debug, Clone)]
pub struct RunStore {
    content_dir: PathBuf,
}

impl RunStore {
    pub fn new(content_dir: PathBuf) -> Self {
        Self { content_dir }
    }

    /// Writes the run artifact, returning the path it was saved under.
    ///
    /// # Errors
    /// Returns a `StoreError` if the directory cannot be created or the
    /// file cannot be serialized or written.
    pub async fn save(&self, result: &RunResult) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(&self.content_dir).await.map_err(StoreError::CreateDir)?;

        let filename = format!(
            "{}_{}_results.json",
            sanitize_topic(&result.request.topic),
            Local::now().format("%Y%m%d_%H%M%S"),
        );
        let path = self.content_dir.join(filename);

        let json = serde_json::to_string_pretty(result)?;
        tokio::fs::write(&path, json).await.map_err(StoreError::Write)?;

        debug!(path = %path.display(), "Run artifact written");
        Ok(path)
    }
}

/// Persists generated images to the images directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    images_dir: PathBuf,
}

impl ImageStore {
    pub fn new(images_dir: PathBuf) -> Self {
        Self { images_dir }
    }

    /// Writes image bytes as received, returning the path saved under.
    ///
    /// # Errors
    /// Returns a `StoreError` if the directory cannot be created or the
    /// file cannot be written.
    pub async fn save_image(&self, bytes: &[u8], topic: &str) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(&self.images_dir).await.map_err(StoreError::CreateDir)?;

        let filename =
            format!("{}_{}.png", sanitize_topic(topic), Local::now().format("%Y%m%d_%H%M%S"));
        let path = self.images_dir.join(filename);

        tokio::fs::write(&path, bytes).await.map_err(StoreError::Write)?;

        debug!(path = %path.display(), size = bytes.len(), "Image written");
        Ok(path)
    }
}

/// Turns a topic into a filename stem: whitespace becomes underscores,
/// path-hostile characters are dropped, and an empty topic becomes
/// "content".
pub(crate) fn sanitize_topic(topic: &str) -> String {
    let cleaned: String = topic
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
        .collect();

    if cleaned.is_empty() { "content".to_string() } else { cleaned }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_topic() {
        assert_eq!(
            sanitize_topic("AI in Healthcare: Transforming Patient Care"),
            "AI_in_Healthcare_Transforming_Patient_Care"
        );
        assert_eq!(sanitize_topic("a/b\\c"), "abc");
        assert_eq!(sanitize_topic("  spaced  out  "), "spaced__out");
        assert_eq!(sanitize_topic(""), "content");
        assert_eq!(sanitize_topic("???"), "content");
    }

    #[tokio::test]
    async fn test_image_store_writes_bytes_as_received() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = ImageStore::new(dir.path().join("images"));

        let bytes = [0x89, 0x50, 0x4E, 0x47];
        let path = store.save_image(&bytes, "Launch Post").await.expect("saves");

        assert!(path.file_name().and_then(|n| n.to_str()).is_some_and(|n| {
            n.starts_with("Launch_Post_") && n.ends_with(".png")
        }));
        let written = std::fs::read(&path).expect("read back");
        assert_eq!(written, bytes);
    }

    #[tokio::test]
    async fn test_image_store_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let blocker = dir.path().join("images");
        std::fs::write(&blocker, b"not a directory").expect("create blocking file");

        let store = ImageStore::new(blocker);
        let result = store.save_image(&[1, 2, 3], "topic").await;
        assert!(matches!(result, Err(StoreError::CreateDir(_))));
    }
}
