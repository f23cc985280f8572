use reqwest::StatusCode;
use serde::Deserialize;

/// Error body shape the server uses for API failures.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<String>,
}

/// Extracts a human-readable message from a non-2xx response body.
///
/// API endpoints answer with `{"error": "..."}`; anything else (HTML error
/// pages, empty bodies) falls back to the raw body or the status line reason.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload.error.filter(|message| !message.is_empty()) {
            return message;
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
