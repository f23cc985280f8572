use game_backend::BackendError;
use url::Url;

/// Default base URL for a locally hosted game server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Joins a base URL with an absolute endpoint path.
///
/// An empty base falls back to [`DEFAULT_BASE_URL`]; trailing slashes on the
/// base are dropped so `https://host/` and `https://host` resolve identically.
pub fn join_endpoint(base: &str, path: &'static str) -> Result<Url, BackendError> {
    let base = if base.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        base.trim()
    };

    let trimmed = base.trim_end_matches('/');
    Url::parse(&format!("{trimmed}{path}"))
        .map_err(|error| BackendError::InvalidBaseUrl(format!("{base}: {error}")))
}
