//! Error types for remote access.

/// Error talking to the remote host.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// Server returned an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Tree listing could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested repository or file does not exist on the host.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Host returned only part of the tree listing.
    #[error("Tree listing of {repo} truncated after {entries} entries")]
    Truncated {
        /// Repository whose listing was cut short.
        repo: String,
        /// Entries received before the cut.
        entries: usize,
    },

    /// File body exceeds the accepted size.
    #[error("{path} exceeds the {limit} byte limit")]
    TooLarge {
        /// Remote path of the file.
        path: String,
        /// Limit in bytes.
        limit: u64,
    },
}
