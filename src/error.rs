//! Error types.
//!
//! Protocol-level rejections (`stale_client`, `invalid_position`, ...) are not
//! errors; see [`crate::protocol::EventReply`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// A GET answered with a non-success status.
    #[error("request_failed_{status}:{url}")]
    Http { status: u16, url: String },

    /// Connection, TLS or body read failure.
    #[error("{0}")]
    Transport(String),

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid url: {0}")]
    Url(String),
}

/// Bootstrap failure. Fatal for the session.
#[derive(Debug, Error)]
#[error("town load failed: {0}")]
pub struct LoadError(#[from] pub ClientError);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
