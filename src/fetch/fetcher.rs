//! Retrying fetch wrapper.

use crate::time::{Sleeper, TokioSleeper};

use super::retry::Disposition;
use super::{FetchError, HttpClient, HttpError, HttpRequest, HttpResponse, RetryPolicy};

/// Issues HTTP requests and retries transient failures with exponential backoff.
///
/// Attempts run strictly one after another. Each call owns its attempt
/// counter and its delay, so one fetcher can serve concurrent calls.
///
/// | Outcome of an attempt | Action |
/// |---|---|
/// | 2xx | return the response |
/// | 401 | [`FetchError::AuthenticationRejected`] |
/// | 429, >= 500 | retry, or [`FetchError::TransientStatus`] on the last attempt |
/// | other status | [`FetchError::NonRetryableStatus`] |
/// | transport error | retry, or [`FetchError::Transport`] on the last attempt or if it mentions 401 |
///
/// The backoff delay is shared by the status and transport paths: it
/// doubles after every retry no matter which path triggered it.
///
/// # Type Parameters
///
/// - `H`: the transport
/// - `S`: the sleeper used for backoff (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```no_run
/// use mindconnect::fetch::{HttpRequest, ReqwestClient, ResilientFetcher};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = ResilientFetcher::new(ReqwestClient::new());
/// let request = HttpRequest::get(Url::parse("https://example.com/")?);
/// let response = fetcher.fetch_with_retry(&request).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResilientFetcher<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    policy: RetryPolicy,
}

impl<H> ResilientFetcher<H, TokioSleeper> {
    /// Creates a fetcher with the default policy and the tokio sleeper.
    #[must_use]
    pub const fn new(client: H) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            policy: RetryPolicy::new(),
        }
    }
}

impl<H, S> ResilientFetcher<H, S> {
    /// Replaces the sleeper used between attempts.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> ResilientFetcher<H, S2> {
        ResilientFetcher {
            client: self.client,
            sleeper,
            policy: self.policy,
        }
    }

    /// Sets the policy used by [`fetch_with_retry`](Self::fetch_with_retry).
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the default policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn client(&self) -> &H {
        &self.client
    }
}

/// What to do after one attempt.
enum Step {
    Done(Result<HttpResponse, FetchError>),
    Retry,
}

impl<H: HttpClient, S: Sleeper> ResilientFetcher<H, S> {
    /// Sends `request` under the fetcher's own policy.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing the terminal failure kind.
    pub async fn fetch_with_retry(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        self.fetch_with_policy(request, &self.policy).await
    }

    /// Sends `request` under an explicit policy.
    ///
    /// The policy is copied up front and cannot change mid-sequence.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing the terminal failure kind.
    pub async fn fetch_with_policy(
        &self,
        request: &HttpRequest,
        policy: &RetryPolicy,
    ) -> Result<HttpResponse, FetchError> {
        let policy = *policy;
        let mut delay = policy.initial_delay;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let is_last = !policy.should_retry(attempt);

            let step = match self.client.request(request.clone()).await {
                Ok(response) => on_response(response, attempt, is_last),
                Err(error) => on_transport_error(error, attempt, is_last),
            };

            match step {
                Step::Done(outcome) => return outcome,
                Step::Retry => {
                    tracing::warn!(
                        "Attempt {attempt}/{} failed, retrying in {}ms",
                        policy.max_attempts,
                        delay.as_millis()
                    );
                    self.sleeper.sleep(delay).await;
                    delay = policy.next_delay(delay);
                }
            }
        }
    }
}

fn on_response(response: HttpResponse, attempt: u32, is_last: bool) -> Step {
    let status = response.status;
    let body = || response.body_text().map(ToString::to_string);

    match Disposition::of(status) {
        Disposition::Success => {
            tracing::debug!("Request succeeded with status {status} on attempt {attempt}");
            Step::Done(Ok(response))
        }
        Disposition::Unauthorized => {
            tracing::error!("Authentication rejected (401), not retrying");
            Step::Done(Err(FetchError::AuthenticationRejected { body: body() }))
        }
        Disposition::NonRetryable => {
            tracing::debug!("Non-retryable status {status} on attempt {attempt}");
            Step::Done(Err(FetchError::NonRetryableStatus {
                status,
                body: body(),
            }))
        }
        Disposition::Transient if is_last => Step::Done(Err(FetchError::TransientStatus {
            status,
            attempts: attempt,
            body: body(),
        })),
        Disposition::Transient => {
            tracing::debug!("Transient status {status} on attempt {attempt}");
            Step::Retry
        }
    }
}

fn on_transport_error(error: HttpError, attempt: u32, is_last: bool) -> Step {
    if is_last || error.mentions_unauthorized() {
        return Step::Done(Err(FetchError::Transport {
            attempts: attempt,
            source: error,
        }));
    }
    tracing::debug!("Transport error on attempt {attempt}: {error}");
    Step::Retry
}
