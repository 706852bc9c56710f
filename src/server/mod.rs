//! Web server exposing the extraction endpoint.
//!
//! - `POST /api/extract-json`: multipart image upload, returns extracted fields
//! - `GET /api/health`: liveness plus OCR engine availability

mod handlers;
mod routes;

pub use handlers::{error_status, ExtractResponse, SUCCESS_MESSAGE};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::intake::ExtractionPipeline;
use crate::ocr::{OcrBackend, TesseractBackend};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ExtractionPipeline,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build state backed by Tesseract as configured in `settings`.
    pub fn new(settings: &Settings) -> Self {
        let backend = Arc::new(TesseractBackend::with_config(settings.ocr_config()));
        Self::with_backend(settings, backend)
    }

    /// Build state with an explicit OCR backend.
    pub fn with_backend(settings: &Settings, backend: Arc<dyn OcrBackend>) -> Self {
        Self {
            pipeline: ExtractionPipeline::new(
                backend,
                settings.temp_dir.clone(),
                settings.ocr_timeout,
            ),
            max_upload_bytes: settings.max_upload_bytes,
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);

    let backend = state.pipeline.backend();
    if !backend.is_available() {
        tracing::warn!("{}", backend.availability_hint());
    }

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
