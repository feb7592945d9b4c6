use thiserror::Error;

/// Errors that abort a validation call as a whole. Per-number probe
/// failures never surface here; they classify as `unknown`.
#[derive(Debug, Error)]
pub enum ReachabilityError {
    /// The selected provider needs a credential that is not configured.
    #[error("missing credential: {0} must be set for this validation provider")]
    MissingCredential(String),

    /// The batch API answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
