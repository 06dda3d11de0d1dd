use thiserror::Error;

/// Failure of a single backend exchange.
///
/// The UI collapses every variant into one fixed message per screen; the
/// variants exist so the log can tell them apart.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("response body is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
