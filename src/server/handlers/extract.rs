//! Image-to-fields extraction endpoint.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    response::IntoResponse,
    Json,
};

use super::super::AppState;
use super::types::ExtractResponse;
use crate::intake::{ExtractError, UploadedImage, ValidationError, IMAGE_FIELD};

/// Accept a multipart upload and return the fields found in the image.
///
/// Form data:
/// - `imageBase64`: a JPEG or PNG file
#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn extract_json(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    tracing::info!("Received request for JSON extraction");

    let image = match read_image(multipart).await {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!(error = %e, "Upload rejected");
            return e.into_response();
        }
    };

    if image.is_some() {
        tracing::info!("Validation passed for uploaded image");
    }

    match state.pipeline.process_upload(image).await {
        Ok(data) => {
            tracing::info!(fields = data.len(), "JSON data successfully extracted from text");
            Json(ExtractResponse::success(data)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Pull the image part out of the form and validate it.
///
/// Returns `Ok(None)` when no image part was sent or the file was empty.
async fn read_image(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<UploadedImage>, ExtractError> {
    let mut multipart =
        multipart.map_err(|rejection| ValidationError::Multipart(rejection.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping unrelated form field");
            continue;
        }

        let Some(filename) = field.file_name().map(str::to_string) else {
            return Err(ValidationError::NotAFile.into());
        };

        let bytes = field.bytes().await.map_err(multipart_error)?;
        tracing::debug!(filename = %filename, size = bytes.len(), "Read image part");

        return Ok(UploadedImage::from_bytes(bytes.to_vec(), Some(filename))?);
    }

    Ok(None)
}

fn multipart_error(err: MultipartError) -> ExtractError {
    ValidationError::Multipart(err.body_text()).into()
}
