//! Tesseract OCR backend implementation.
//!
//! Runs the `tesseract` command-line tool as a child process and reads the
//! recognized text from its stdout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use super::backend::{OcrBackend, OcrConfig, OcrError, OcrResult};

/// Default executable name looked up on `PATH`.
const TESSERACT_BIN: &str = "tesseract";

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Locate the executable: the configured override if set, otherwise `PATH`.
    pub fn resolve_executable(&self) -> Result<PathBuf, OcrError> {
        let wanted = self
            .config
            .executable
            .as_deref()
            .unwrap_or_else(|| Path::new(TESSERACT_BIN));

        which::which(wanted).map_err(|e| {
            OcrError::BackendNotAvailable(format!(
                "{} not found ({}); install tesseract-ocr or set FIELDSCAN_TESSERACT",
                wanted.display(),
                e
            ))
        })
    }

    /// Run Tesseract on an image file.
    async fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let executable = self.resolve_executable()?;

        tracing::debug!(
            executable = %executable.display(),
            image = %image_path.display(),
            language = %self.config.language,
            "Running tesseract"
        );

        let output = Command::new(&executable)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!(
                        "tesseract exited with {}: {}",
                        output.status,
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                OcrError::BackendNotAvailable(format!("{} not found", executable.display())),
            ),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        self.resolve_executable().is_ok()
    }

    fn availability_hint(&self) -> String {
        match self.resolve_executable() {
            Ok(path) => format!("Tesseract is available at {}", path.display()),
            Err(_) => match self.config.executable {
                Some(ref path) => format!(
                    "Configured tesseract executable {} does not exist or is not executable",
                    path.display()
                ),
                None => "Tesseract not installed. Install with: apt install tesseract-ocr"
                    .to_string(),
            },
        }
    }

    async fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let text = self.run_tesseract(image_path).await?;
        let elapsed = start.elapsed();

        Ok(OcrResult {
            text,
            backend: self.name(),
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}
