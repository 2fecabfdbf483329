use thiserror::Error;

/// Failure kinds of the primary refresh cycle. All three surface as a single
/// error placeholder replacing the rendered entries; none are retried.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("retrieval failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unexpected response shape: missing post_data")]
    Shape,
}
