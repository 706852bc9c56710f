//! Shared utility functions.
//!
//! - `text`: truncation of text for log output

mod text;

pub use text::snippet;
