//! Image intake and OCR invocation.
//!
//! Takes one validated upload through the whole request flow:
//! transient file, OCR engine, field extraction.

mod image;
mod pipeline;
mod transient;

pub use image::{ImageFormat, UploadedImage, ValidationError, IMAGE_FIELD};
pub use pipeline::{ExtractError, ExtractionPipeline};
pub use transient::{TransientFileError, TransientImage};

#[cfg(test)]
pub(crate) use image::fixtures;
#[cfg(test)]
pub(crate) use pipeline::stub;
