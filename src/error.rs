use thiserror::Error;

/// Errors surfaced by the trends client and request driver.
///
/// The driver distinguishes retryable conditions (rate limits, transport
/// hiccups, upstream 5xx) from fatal ones (bad cookie, malformed input,
/// unparseable payloads); see [`crate::retry::is_retriable`].
#[derive(Debug, Error)]
pub enum TrendsError {
    #[error("rate limited by upstream (HTTP 429)")]
    RateLimited,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("unauthorized (HTTP {status}); cookie missing, stale, or rejected")]
    Unauthorized { status: u16 },

    #[error("deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected payload for {context}: {reason}")]
    UnexpectedPayload { context: String, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
