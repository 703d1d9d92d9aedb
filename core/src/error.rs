//! Error types for the leaderboard API client.
//!
//! # Design
//! Every accessor either returns a fully decoded result or one of these
//! variants. Nothing is retried and there is no partial success. A non-2xx
//! status is not an error on its own: the body still goes to the decoder,
//! which reports `Decode` if it is not the expected envelope.

/// Errors returned by `MmrtaClient` builders, transports and accessors.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The configured base address cannot be used to build endpoint URLs.
    #[error("malformed base address `{address}`: {reason}")]
    MalformedBaseAddress { address: String, reason: String },

    /// Connection, TLS, timeout or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The (apostrophe-corrected) body is not a valid response envelope.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A lookup by identifier did not return exactly one game.
    #[error("got {count} games for id {id}, expected exactly 1")]
    UnexpectedResultCount { count: usize, id: i64 },
}
