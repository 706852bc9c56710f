//! HTTP request handlers.

mod api;
mod extract;
mod types;

pub use api::health;
pub use extract::extract_json;
pub use types::{error_status, ExtractResponse, SUCCESS_MESSAGE};
