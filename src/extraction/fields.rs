//! Labelled field extraction from recognized text.
//!
//! Each field is found by its own pattern: a lowercase label, an optional
//! separator (`:`, `|` or `-`) and a double-quoted value. Matching is
//! case-sensitive and only the first occurrence of each label is used.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::utils::snippet;

/// A field that can be extracted from recognized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Organization,
    Address,
    Mobile,
}

impl Field {
    /// All fields, in extraction order.
    pub const ALL: [Field; 4] = [
        Field::Name,
        Field::Organization,
        Field::Address,
        Field::Mobile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Organization => "organization",
            Field::Address => "address",
            Field::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field patterns, tried in order. Capture group 1 is the quoted value.
static FIELD_PATTERNS: LazyLock<Vec<(Regex, Field)>> = LazyLock::new(|| {
    Field::ALL
        .iter()
        .map(|field| {
            let pattern = format!(r#"{}\s*[:|-]?\s*"([^"]+)""#, field.as_str());
            (Regex::new(&pattern).unwrap(), *field)
        })
        .collect()
});

/// Errors from field extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no structured data found in text")]
    NoStructuredDataFound,
}

/// Fields extracted from a single text, keyed by field.
///
/// Only fields whose pattern matched are present. A successful extraction
/// never produces an empty result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StructuredResult(BTreeMap<Field, String>);

impl StructuredResult {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, field: Field, value: String) {
        self.0.insert(field, value);
    }
}

/// Extract the labelled fields from `text`.
///
/// Values are returned exactly as captured, without trimming.
pub fn extract_fields(text: &str) -> Result<StructuredResult, ExtractionError> {
    tracing::info!(text = %snippet(text), "Parsing text for structured data");

    let mut result = StructuredResult::default();

    for (pattern, field) in FIELD_PATTERNS.iter() {
        if let Some(value) = pattern.captures(text).and_then(|c| c.get(1)) {
            tracing::debug!(field = %field, "Field matched");
            result.insert(*field, value.as_str().to_string());
        }
    }

    if result.is_empty() {
        tracing::error!(extracted_text = %text, "Failed to parse structured data from text");
        return Err(ExtractionError::NoStructuredDataFound);
    }

    tracing::info!(fields = result.len(), "Successfully extracted structured data");
    Ok(result)
}
