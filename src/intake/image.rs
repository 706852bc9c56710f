//! Uploaded image validation.

use std::fmt;

use base64::prelude::*;
use thiserror::Error;

/// Name of the multipart field carrying the image.
///
/// The field carries raw file bytes; the name is kept for client compatibility.
pub const IMAGE_FIELD: &str = "imageBase64";

/// Accepted image types, as listed to clients.
pub const ACCEPTED_TYPES: &str = "jpeg, png, jpg";

/// Upload validation failures. These are rejected before any side effect.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("The imageBase64 must be a file of type: {} (got {detected}).", ACCEPTED_TYPES)]
    UnsupportedType { detected: String },

    #[error("The imageBase64 must be a file of type: {}.", ACCEPTED_TYPES)]
    UnrecognizedContent,

    #[error("The imageBase64 must be a file.")]
    NotAFile,

    #[error("The imageBase64 is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("The request body could not be read: {0}")]
    Multipart(String),
}

/// Image formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Detect the format from file content. Returns `None` for empty input.
    pub fn detect(bytes: &[u8]) -> Result<Option<Self>, ValidationError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        match infer::get(bytes) {
            Some(kind) => match kind.mime_type() {
                "image/jpeg" => Ok(Some(ImageFormat::Jpeg)),
                "image/png" => Ok(Some(ImageFormat::Png)),
                other => Err(ValidationError::UnsupportedType {
                    detected: other.to_string(),
                }),
            },
            None => Err(ValidationError::UnrecognizedContent),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// A validated JPEG or PNG upload, owned by a single request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    filename: Option<String>,
}

impl UploadedImage {
    /// Validate raw upload bytes.
    ///
    /// Returns `Ok(None)` for an empty upload, which callers treat as a
    /// missing file.
    pub fn from_bytes(
        bytes: Vec<u8>,
        filename: Option<String>,
    ) -> Result<Option<Self>, ValidationError> {
        let Some(format) = ImageFormat::detect(&bytes)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            bytes,
            format,
            filename,
        }))
    }

    /// Validate a base64-encoded image (whitespace is ignored).
    pub fn from_base64(
        encoded: &str,
        filename: Option<String>,
    ) -> Result<Option<Self>, ValidationError> {
        let compact: String = encoded.split_whitespace().collect();
        let bytes = BASE64_STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ValidationError::InvalidBase64(e.to_string()))?;
        Self::from_bytes(bytes, filename)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Size of the image in bytes. Never zero.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_detect_png() {
        assert_eq!(ImageFormat::detect(PNG_BYTES).unwrap(), Some(ImageFormat::Png));
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(
            ImageFormat::detect(JPEG_BYTES).unwrap(),
            Some(ImageFormat::Jpeg)
        );
    }

    #[test]
    fn test_gif_rejected() {
        let err = ImageFormat::detect(GIF_BYTES).unwrap_err();
        match err {
            ValidationError::UnsupportedType { detected } => assert_eq!(detected, "image/gif"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_type_messages_list_accepted_types() {
        let err = ImageFormat::detect(GIF_BYTES).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The imageBase64 must be a file of type: jpeg, png, jpg (got image/gif)."
        );
        assert_eq!(
            ValidationError::UnrecognizedContent.to_string(),
            format!("The imageBase64 must be a file of type: {}.", ACCEPTED_TYPES)
        );
    }

    #[test]
    fn test_byte_len() {
        let image = UploadedImage::from_bytes(JPEG_BYTES.to_vec(), None)
            .unwrap()
            .unwrap();
        assert_eq!(image.byte_len(), JPEG_BYTES.len());
    }

    #[test]
    fn test_plain_text_rejected() {
        assert!(matches!(
            ImageFormat::detect(b"just some text"),
            Err(ValidationError::UnrecognizedContent)
        ));
    }

    #[test]
    fn test_empty_upload_is_missing() {
        assert!(UploadedImage::from_bytes(Vec::new(), None).unwrap().is_none());
    }

    #[test]
    fn test_from_base64() {
        let encoded = BASE64_STANDARD.encode(PNG_BYTES);
        let wrapped = format!("{}\n{}\n", &encoded[..10], &encoded[10..]);
        let image = UploadedImage::from_base64(&wrapped, Some("card.png".into()))
            .unwrap()
            .unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.bytes(), PNG_BYTES);
        assert_eq!(image.filename(), Some("card.png"));
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            UploadedImage::from_base64("not base64!!", None),
            Err(ValidationError::InvalidBase64(_))
        ));
    }
}
