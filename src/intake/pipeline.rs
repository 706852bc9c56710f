//! Image intake pipeline: persist upload, run OCR, extract fields.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use base64::prelude::*;
use thiserror::Error;

use super::image::{UploadedImage, ValidationError};
use super::transient::{TransientFileError, TransientImage};
use crate::extraction::{extract_fields, ExtractionError, StructuredResult};
use crate::ocr::{OcrBackend, OcrError};
use crate::utils::snippet;

/// Errors that end an extraction request.
///
/// None of these are retried and none degrade into a partial success.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("no image file uploaded")]
    NoImage,

    #[error("error saving image to file: {0}")]
    FileWrite(#[from] TransientFileError),

    #[error("error running OCR on image: {0}")]
    Ocr(#[from] OcrError),

    #[error("no structured data found in OCR text")]
    NoStructuredData,
}

impl From<ExtractionError> for ExtractError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::NoStructuredDataFound => ExtractError::NoStructuredData,
        }
    }
}

impl ExtractError {
    /// Fixed client-facing message. Underlying causes are only logged.
    pub fn client_message(&self) -> &'static str {
        match self {
            ExtractError::Validation(_) => "The given data was invalid.",
            ExtractError::NoImage => "No image file uploaded",
            ExtractError::FileWrite(_) => "Error saving image to file",
            ExtractError::Ocr(_) => "Error running OCR on image",
            ExtractError::NoStructuredData => "Failed to extract valid JSON from image",
        }
    }
}

/// Runs one upload through OCR and field extraction.
#[derive(Clone)]
pub struct ExtractionPipeline {
    backend: Arc<dyn OcrBackend>,
    temp_dir: PathBuf,
    ocr_timeout: Duration,
}

impl ExtractionPipeline {
    pub fn new(backend: Arc<dyn OcrBackend>, temp_dir: PathBuf, ocr_timeout: Duration) -> Self {
        Self {
            backend,
            temp_dir,
            ocr_timeout,
        }
    }

    /// The OCR backend used by this pipeline.
    pub fn backend(&self) -> &dyn OcrBackend {
        self.backend.as_ref()
    }

    /// Process an upload. `None` means no file was provided.
    pub async fn process_upload(
        &self,
        image: Option<UploadedImage>,
    ) -> Result<StructuredResult, ExtractError> {
        match image {
            Some(image) => self.process(&image).await,
            None => {
                tracing::error!("No file uploaded");
                Err(ExtractError::NoImage)
            }
        }
    }

    /// Persist the image, OCR it and extract fields.
    ///
    /// The transient file is removed before this returns, whatever the outcome.
    #[tracing::instrument(skip_all, fields(format = %image.format(), bytes = image.byte_len()))]
    pub async fn process(&self, image: &UploadedImage) -> Result<StructuredResult, ExtractError> {
        let encoded = BASE64_STANDARD.encode(image.bytes());
        tracing::info!(
            image_length = encoded.len(),
            "Image file successfully converted to base64"
        );

        let transient = TransientImage::from_base64(&self.temp_dir, &encoded, image.format())
            .map_err(|e| {
                tracing::error!(error = %e, "Error saving image to file");
                ExtractError::from(e)
            })?;
        tracing::info!(temp_path = %transient.path().display(), "Image saved to temporary path");

        let text = self.recognize(&transient).await?;

        Ok(extract_fields(&text)?)
    }

    async fn recognize(&self, image: &TransientImage) -> Result<String, ExtractError> {
        let ocr = tokio::time::timeout(self.ocr_timeout, self.backend.ocr_image(image.path()));

        let result = match ocr.await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::error!(
                    backend = self.backend.name(),
                    error = %e,
                    "Error running OCR on image"
                );
                return Err(e.into());
            }
            Err(_) => {
                let e = OcrError::Timeout(self.ocr_timeout);
                tracing::error!(
                    backend = self.backend.name(),
                    error = %e,
                    "Error running OCR on image"
                );
                return Err(e.into());
            }
        };

        tracing::info!(
            backend = result.backend,
            elapsed_ms = result.processing_time_ms,
            extracted_text = %snippet(&result.text),
            "OCR extraction successful"
        );
        Ok(result.text)
    }
}


#[cfg(test)]
mod tests {
    use super::stub::StubBackend;
    use super::*;
    use crate::extraction::Field;
    use crate::intake::image::fixtures::{JPEG_BYTES, PNG_BYTES};
    use crate::ocr::{OcrConfig, TesseractBackend};

    fn png() -> UploadedImage {
        UploadedImage::from_bytes(PNG_BYTES.to_vec(), None)
            .unwrap()
            .unwrap()
    }

    fn pipeline(backend: Arc<dyn OcrBackend>, dir: &std::path::Path) -> ExtractionPipeline {
        ExtractionPipeline::new(backend, dir.to_path_buf(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_success_extracts_fields() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::returning(
            "name: \"John Doe\"\norganization - \"Acme Corp\"",
        ));
        let result = pipeline(backend, dir.path()).process(&png()).await.unwrap();

        assert_eq!(result.get(Field::Name), Some("John Doe"));
        assert_eq!(result.get(Field::Organization), Some("Acme Corp"));
    }

    #[tokio::test]
    async fn test_transient_file_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::returning(r#"mobile: "555""#));
        pipeline(backend.clone(), dir.path())
            .process(&png())
            .await
            .unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with(dir.path()));
        assert!(!seen[0].exists());
    }

    #[tokio::test]
    async fn test_transient_file_removed_after_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::returning("nothing to see here"));
        let err = pipeline(backend.clone(), dir.path())
            .process(&png())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::NoStructuredData));
        assert_eq!(err.client_message(), "Failed to extract valid JSON from image");
        assert!(!backend.seen.lock().unwrap()[0].exists());
    }

    #[tokio::test]
    async fn test_ocr_failure() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::failing());
        let err = pipeline(backend.clone(), dir.path())
            .process(&png())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::Ocr(OcrError::BackendNotAvailable(_))));
        assert_eq!(err.client_message(), "Error running OCR on image");
        assert!(!backend.seen.lock().unwrap()[0].exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_tesseract_is_ocr_failure() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(TesseractBackend::with_config(OcrConfig {
            executable: Some("/nonexistent/tesseract".into()),
            ..OcrConfig::default()
        }));
        let err = pipeline(backend, dir.path()).process(&png()).await.unwrap_err();

        assert!(matches!(err, ExtractError::Ocr(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_ocr_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::slow(r#"name: "late""#, Duration::from_secs(5)));
        let pipeline =
            ExtractionPipeline::new(backend, dir.path().to_path_buf(), Duration::from_millis(20));
        let err = pipeline.process(&png()).await.unwrap_err();

        assert!(matches!(err, ExtractError::Ocr(OcrError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_unwritable_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::returning(r#"name: "x""#));
        let err = pipeline(backend.clone(), &dir.path().join("missing"))
            .process(&png())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::FileWrite(_)));
        assert_eq!(err.client_message(), "Error saving image to file");
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_upload() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::returning(r#"name: "x""#));
        let err = pipeline(backend.clone(), dir.path())
            .process_upload(None)
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::NoImage));
        assert_eq!(err.client_message(), "No image file uploaded");
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_jpeg_uses_jpg_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::returning(r#"address: "1 Main St""#));
        let image = UploadedImage::from_bytes(JPEG_BYTES.to_vec(), None)
            .unwrap()
            .unwrap();
        pipeline(backend.clone(), dir.path())
            .process(&image)
            .await
            .unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].extension().unwrap(), "jpg");
    }
}
