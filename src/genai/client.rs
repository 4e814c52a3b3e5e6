//! Client for the `generateContent` endpoint.

use std::fmt;

use url::Url;

use crate::fetch::{HttpClient, HttpRequest, ResilientFetcher};
use crate::time::{Sleeper, TokioSleeper};

use super::GenAiError;
use super::wire::{GenerateContentRequest, GenerateContentResponse};

/// Sends `generateContent` requests through a [`ResilientFetcher`].
///
/// The API key, when configured, is appended to the endpoint URL as a
/// `key` query parameter before the request reaches the fetcher; the
/// fetcher itself never adds credentials.
///
/// # Example
///
/// ```no_run
/// use mindconnect::fetch::{ReqwestClient, ResilientFetcher};
/// use mindconnect::genai::{GenerateContentRequest, GenerativeClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GenerativeClient::new(
///     ResilientFetcher::new(ReqwestClient::new()),
///     Url::parse("https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent")?,
/// )
/// .with_api_key("secret");
///
/// let text = client.generate(&GenerateContentRequest::from_prompt("Say hi")).await?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
pub struct GenerativeClient<H, S = TokioSleeper> {
    fetcher: ResilientFetcher<H, S>,
    endpoint: Url,
    api_key: Option<String>,
}

impl<H, S> GenerativeClient<H, S> {
    /// Creates a client for `endpoint` with no API key.
    #[must_use]
    pub const fn new(fetcher: ResilientFetcher<H, S>, endpoint: Url) -> Self {
        Self {
            fetcher,
            endpoint,
            api_key: None,
        }
    }

    /// Sets the API key. An empty key is treated as no key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Returns the endpoint without credentials.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the fetcher used for requests.
    #[must_use]
    pub const fn fetcher(&self) -> &ResilientFetcher<H, S> {
        &self.fetcher
    }

    /// Returns the URL requests are sent to, including the API key if set.
    #[must_use]
    pub fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        url
    }
}

impl<H: HttpClient, S: Sleeper> GenerativeClient<H, S> {
    /// Sends `request` and returns the first candidate's text.
    ///
    /// # Errors
    ///
    /// - [`GenAiError::Encode`] if the request cannot be serialized
    /// - [`GenAiError::Fetch`] if the HTTP exchange fails terminally
    /// - [`GenAiError::Decode`] if the response is not valid JSON
    /// - [`GenAiError::EmptyResponse`] if the response carries no text
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<String, GenAiError> {
        let http_request = HttpRequest::post(self.request_url())
            .with_json(request)
            .map_err(GenAiError::Encode)?;

        let response = self.fetcher.fetch_with_retry(&http_request).await?;

        let decoded: GenerateContentResponse = response.json().map_err(GenAiError::Decode)?;
        decoded
            .first_text()
            .map(ToString::to_string)
            .ok_or(GenAiError::EmptyResponse)
    }
}

impl<H: fmt::Debug, S: fmt::Debug> fmt::Debug for GenerativeClient<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerativeClient")
            .field("fetcher", &self.fetcher)
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
