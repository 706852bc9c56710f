//! Text helpers for log output.

/// Number of characters of recognized text included in log lines.
pub const SNIPPET_LEN: usize = 100;

/// Truncate `s` to at most `max` characters, appending `...` when cut.
///
/// Cuts on a char boundary so multi-byte OCR output never panics.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Log-friendly prefix of recognized text.
pub fn snippet(s: &str) -> String {
    truncate(s, SNIPPET_LEN)
}
