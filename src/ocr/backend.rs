//! OCR backend abstraction.
//!
//! The OCR engine is an external collaborator: given an image path it
//! returns the recognized text or fails. Backends implement [`OcrBackend`]
//! so the intake pipeline and the HTTP layer never depend on a concrete
//! engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("OCR timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized text for the whole image. May be empty.
    pub text: String,
    /// Name of the backend that produced this result.
    pub backend: &'static str,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for OCR backends.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Short backend name used in logs and health output.
    fn name(&self) -> &'static str;

    /// Check if this backend can run (executable present).
    fn is_available(&self) -> bool;

    /// Describe what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file.
    async fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError>;
}

/// Configuration for OCR backends.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Language for OCR (e.g., "eng", "deu").
    pub language: String,
    /// Explicit engine executable. When unset the engine is looked up on `PATH`.
    pub executable: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            executable: None,
        }
    }
}
