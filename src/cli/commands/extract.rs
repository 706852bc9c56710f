//! Local extraction command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::config::Settings;
use crate::intake::{ExtractError, ExtractionPipeline, UploadedImage};
use crate::ocr::{OcrBackend, TesseractBackend};
use crate::server::ExtractResponse;

/// Run the extraction pipeline on a local file and print the JSON response.
pub async fn cmd_extract(settings: &Settings, path: &Path, base64: bool) -> anyhow::Result<()> {
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let backend: Arc<dyn OcrBackend> =
        Arc::new(TesseractBackend::with_config(settings.ocr_config()));
    let pipeline =
        ExtractionPipeline::new(backend, settings.temp_dir.clone(), settings.ocr_timeout);

    let result = match load_image(contents, filename, base64) {
        Ok(image) => pipeline.process_upload(image).await,
        Err(e) => Err(e),
    };

    let failure = result.as_ref().err().map(|e| e.to_string());
    let response = ExtractResponse::from(result);
    println!("{}", serde_json::to_string_pretty(&response)?);

    match failure {
        Some(reason) => Err(anyhow::anyhow!(reason)),
        None => Ok(()),
    }
}

/// Validate file contents as an image, decoding base64 text first when asked.
fn load_image(
    contents: Vec<u8>,
    filename: Option<String>,
    base64: bool,
) -> Result<Option<UploadedImage>, ExtractError> {
    let image = if base64 {
        UploadedImage::from_base64(&String::from_utf8_lossy(&contents), filename)?
    } else {
        UploadedImage::from_bytes(contents, filename)?
    };
    Ok(image)
}
