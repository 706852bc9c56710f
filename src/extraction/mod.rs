//! Structured field extraction from OCR text.
//!
//! The extractor is a pure function of its input text and has no
//! knowledge of HTTP, files or the OCR engine.

mod fields;

pub use fields::{extract_fields, ExtractionError, Field, StructuredResult};
