//! Response bodies and error-to-response mapping.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::extraction::StructuredResult;
use crate::intake::{ExtractError, IMAGE_FIELD};

/// Message returned with a successful extraction.
pub const SUCCESS_MESSAGE: &str = "Successfully extracted JSON from image";

/// JSON body for the extraction endpoint, success or failure.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StructuredResult>,
    pub message: String,
    /// Field-level validation errors, only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<&'static str, Vec<String>>>,
}

impl ExtractResponse {
    pub fn success(data: StructuredResult) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: SUCCESS_MESSAGE.to_string(),
            errors: None,
        }
    }

    pub fn failure(err: &ExtractError) -> Self {
        let errors = match err {
            ExtractError::Validation(e) => {
                Some(BTreeMap::from([(IMAGE_FIELD, vec![e.to_string()])]))
            }
            _ => None,
        };
        Self {
            success: false,
            data: None,
            message: err.client_message().to_string(),
            errors,
        }
    }
}

impl From<Result<StructuredResult, ExtractError>> for ExtractResponse {
    fn from(result: Result<StructuredResult, ExtractError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(ref e) => Self::failure(e),
        }
    }
}

/// HTTP status for an extraction failure.
pub fn error_status(err: &ExtractError) -> StatusCode {
    match err {
        ExtractError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ExtractError::NoImage
        | ExtractError::FileWrite(_)
        | ExtractError::Ocr(_)
        | ExtractError::NoStructuredData => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (error_status(&self), Json(ExtractResponse::failure(&self))).into_response()
    }
}

/// OCR engine status in the health response.
#[derive(Debug, Serialize)]
pub struct OcrStatus {
    pub backend: &'static str,
    pub available: bool,
    pub hint: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ocr: OcrStatus,
}
