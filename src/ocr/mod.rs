//! OCR module.
//!
//! Converts an image on disk into plain text using an external OCR engine.
//! Tesseract is the only backend; it is invoked as a child process.

mod backend;
mod tesseract;

pub use backend::{OcrBackend, OcrConfig, OcrError, OcrResult};
pub use tesseract::TesseractBackend;
