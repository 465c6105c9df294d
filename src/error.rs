//! Error types for the client.

use bytes::Bytes;
use hyper::StatusCode;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the daemon.
///
/// Every variant carries enough context to diagnose a daemon/version
/// mismatch from the error alone: raw response bytes, HTTP status, or the
/// name of the type that failed to decode. The client never retries on its
/// own; callers decide whether an error is worth retrying.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection-level failure (dial, timeout, read).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The daemon answered with a non-2xx status.
    ///
    /// The raw response body is preserved; daemons report failures as a
    /// JSON `{"message": …}` document, available via
    /// [`Error::daemon_message`].
    #[error("daemon returned status {status}")]
    Status {
        /// HTTP status code of the response.
        status: StatusCode,
        /// Raw response body.
        body: Bytes,
    },

    /// A response payload did not parse into the expected type.
    #[error("failed to decode response as {target}: {message}")]
    Decode {
        /// Name of the type the payload was expected to decode into.
        target: &'static str,
        /// Raw payload that failed to decode.
        body: Bytes,
        /// Parser diagnostic.
        message: String,
    },

    /// The wire stream violated the daemon's framing protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A request body could not be encoded.
    ///
    /// Surfaces before any network activity takes place.
    #[error("failed to encode request body")]
    Serialization(#[source] serde_json::Error),
}

impl Error {
    /// Extracts the daemon's error message from a [`Error::Status`] body.
    ///
    /// Returns `None` for other variants or when the body is not the
    /// daemon's `{"message": …}` JSON document.
    #[must_use]
    pub fn daemon_message(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    }

    /// Returns the HTTP status for [`Error::Status`] errors.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Transport-level failures, split by phase so callers can tell a daemon
/// that is down from one that is slow or misbehaving.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish a connection to the daemon.
    #[error("failed to connect to daemon: {0}")]
    Connect(String),

    /// Connection establishment exceeded the configured timeout.
    #[error("timed out connecting to daemon")]
    ConnectTimeout,

    /// The request exchange failed after the connection was established.
    #[error("request failed: {0}")]
    Http(String),

    /// Reading the response failed mid-body.
    #[error("failed to read response: {0}")]
    Read(String),

    /// Reading the response exceeded the configured timeout.
    #[error("timed out reading response")]
    ReadTimeout,

    /// The daemon address could not be parsed or is unsupported.
    #[error("invalid daemon address: {0}")]
    InvalidAddress(String),
}
