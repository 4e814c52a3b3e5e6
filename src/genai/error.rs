//! Error type for generative-text calls.

use thiserror::Error;

use crate::fetch::FetchError;

/// Failure of a call to the generative-text endpoint.
#[derive(Debug, Error)]
pub enum GenAiError {
    /// The HTTP exchange failed terminally.
    #[error("Generative endpoint call failed: {0}")]
    Fetch(#[from] FetchError),

    /// The request body could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response, or the JSON text inside it, did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The response carried no usable text.
    #[error("Response was empty or malformed")]
    EmptyResponse,

    /// A prompt template failed to render.
    #[error("Failed to render prompt: {0}")]
    Prompt(String),
}

impl GenAiError {
    /// Returns true if the endpoint rejected the credentials.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Fetch(e) if e.is_authentication())
    }
}
