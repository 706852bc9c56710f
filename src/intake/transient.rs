//! Per-request transient image files.
//!
//! Every upload gets its own uniquely named file in the temp directory.
//! The file is removed when the [`TransientImage`] is dropped, so cleanup
//! happens on every exit path.

use std::io::Write;
use std::path::Path;

use base64::prelude::*;
use tempfile::NamedTempFile;
use thiserror::Error;

use super::image::ImageFormat;

/// Failures while persisting the transient image.
#[derive(Debug, Error)]
pub enum TransientFileError {
    #[error("failed to create temp file in {dir}: {source}")]
    Create {
        dir: String,
        source: std::io::Error,
    },

    #[error("failed to decode image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("failed to write temp file: {0}")]
    Write(#[source] std::io::Error),
}

/// A decoded image written to a unique temp file.
#[derive(Debug)]
pub struct TransientImage {
    file: NamedTempFile,
}

impl TransientImage {
    /// Decode base64 image data and write it to a new temp file in `dir`.
    pub fn from_base64(
        dir: &Path,
        encoded: &str,
        format: ImageFormat,
    ) -> Result<Self, TransientFileError> {
        let bytes = BASE64_STANDARD.decode(encoded)?;
        Self::write(dir, &bytes, format)
    }

    /// Write raw bytes to a new temp file in `dir`.
    pub fn write(
        dir: &Path,
        bytes: &[u8],
        format: ImageFormat,
    ) -> Result<Self, TransientFileError> {
        let suffix = format!(".{}", format.extension());
        let mut file = tempfile::Builder::new()
            .prefix("fieldscan-")
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(|source| TransientFileError::Create {
                dir: dir.display().to_string(),
                source,
            })?;

        file.write_all(bytes).map_err(TransientFileError::Write)?;
        file.flush().map_err(TransientFileError::Write)?;

        Ok(Self { file })
    }

    /// Path of the temp file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
