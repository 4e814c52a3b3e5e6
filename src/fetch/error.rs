//! Error types for transport and retry outcomes.

use std::error::Error as _;

use thiserror::Error;

/// Transport-level failure: no response was received.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection failed (DNS, refused, reset, TLS, body read).
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request did not complete within the transport timeout.
    #[error("Request timed out")]
    Timeout,

    /// The URL could not be used to build a request.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// Returns true if this error's message, or any error in its source
    /// chain, mentions the 401 status code.
    #[must_use]
    pub fn mentions_unauthorized(&self) -> bool {
        const MARKER: &str = "401";

        if self.to_string().contains(MARKER) {
            return true;
        }
        let mut source = self.source();
        while let Some(err) = source {
            if err.to_string().contains(MARKER) {
                return true;
            }
            source = err.source();
        }
        false
    }
}

/// Terminal outcome of a retried fetch.
///
/// Each variant is a distinct failure kind so callers can choose between
/// asking the user to re-authenticate and falling back to default content.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered 401. Never retried.
    #[error("Authentication rejected (HTTP 401)")]
    AuthenticationRejected {
        /// Response body, if it was valid UTF-8
        body: Option<String>,
    },

    /// The server kept answering 429 or 5xx until the attempt budget ran out.
    #[error("Exhausted {attempts} attempt(s) on transient status {status}")]
    TransientStatus {
        /// Status of the final attempt
        status: http::StatusCode,
        /// Total attempts made
        attempts: u32,
        /// Body of the final response, if it was valid UTF-8
        body: Option<String>,
    },

    /// The server answered with a client error that retrying cannot fix.
    #[error("Non-retryable status {status}")]
    NonRetryableStatus {
        /// Response status
        status: http::StatusCode,
        /// Response body, if it was valid UTF-8
        body: Option<String>,
    },

    /// The transport failed on the final attempt, or with an
    /// authentication-related message.
    #[error("Transport failure after {attempts} attempt(s): {source}")]
    Transport {
        /// Total attempts made
        attempts: u32,
        /// The transport error of the final attempt
        #[source]
        source: HttpError,
    },
}

impl FetchError {
    /// Returns true if the failure means the credentials were rejected.
    ///
    /// This covers a real 401 response and a transport error whose message
    /// mentions 401.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        match self {
            Self::AuthenticationRejected { .. } => true,
            Self::Transport { source, .. } => source.mentions_unauthorized(),
            Self::TransientStatus { .. } | Self::NonRetryableStatus { .. } => false,
        }
    }

    /// Returns the HTTP status behind the failure, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::AuthenticationRejected { .. } => Some(http::StatusCode::UNAUTHORIZED),
            Self::TransientStatus { status, .. } | Self::NonRetryableStatus { status, .. } => {
                Some(*status)
            }
            Self::Transport { .. } => None,
        }
    }
}
