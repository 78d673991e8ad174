//! # Response Mapping
//!
//! Turns the raw HTTP response of an upload into an [`UploadResult`]. The
//! inference servers this talks to answer with a JSON array of predictions;
//! the last non-null element is what ends up in `post.results`.

use crate::types::UploadResult;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

/// The parts of an HTTP response the mapper needs, detached from the client.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RawResponse {
    /// Creates a response with the canonical reason phrase for `status_code`.
    pub fn new(status_code: u16, headers: HeaderMap, body: Option<String>) -> Self {
        Self {
            status_code,
            status_text: reason_phrase(status_code),
            headers,
            body,
        }
    }
}

/// The canonical reason phrase of a status code, empty when there is none.
pub fn reason_phrase(status_code: u16) -> String {
    StatusCode::from_u16(status_code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

/// Maps a raw response onto an [`UploadResult`].
///
/// A body that is missing, not JSON, not an array or an empty array leaves
/// `json_result_body` unset; that is never an error.
pub fn map_response(response: &RawResponse) -> UploadResult {
    UploadResult {
        header: render_headers(&response.headers),
        status: response.status_text.clone(),
        status_code: response.status_code,
        json_result_body: response.body.as_deref().and_then(last_non_null_element),
    }
}

/// Renders the header collection as one descriptive string.
pub fn render_headers(headers: &HeaderMap) -> String {
    format!("{headers:?}")
}

/// Scans a JSON array body and returns the string form of its last non-null element.
///
/// String elements are returned without their quotes; any other element is
/// rendered as compact JSON.
pub fn last_non_null_element(body: &str) -> Option<String> {
    let elements = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(elements)) => elements,
        Ok(_) => {
            debug!("Response body is JSON but not an array, leaving results empty.");
            return None;
        }
        Err(e) => {
            debug!("Response body is not JSON ({e}), leaving results empty.");
            return None;
        }
    };

    elements
        .into_iter()
        .rev()
        .find(|element| !element.is_null())
        .map(|element| match element {
            Value::String(s) => s,
            other => other.to_string(),
        })
}
