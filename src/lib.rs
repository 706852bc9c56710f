//! fieldscan - extract contact fields from uploaded images via OCR.
//!
//! An uploaded JPEG or PNG is written to a per-request temp file, run
//! through Tesseract, and the recognized text is searched for labelled
//! `name`, `organization`, `address` and `mobile` values.

pub mod cli;
pub mod config;
pub mod extraction;
pub mod intake;
pub mod ocr;
pub mod server;
mod utils;
