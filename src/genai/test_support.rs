//! Shared fixtures for generative-client tests.

use std::sync::Mutex;

use crate::fetch::{HttpClient, HttpError, HttpRequest, HttpResponse, ResilientFetcher, RetryPolicy};
use crate::time::InstantSleeper;

use super::GenerativeClient;

/// Transport that replays scripted outcomes and records requests.
#[derive(Debug, Default)]
pub struct MockEndpoint {
    script: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockEndpoint {
    pub fn new(script: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(candidate_response(text))])
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Decodes the JSON body of the `index`th request.
    pub fn request_json(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.lock().unwrap();
        serde_json::from_slice(requests[index].body.as_ref().unwrap()).unwrap()
    }
}

impl HttpClient for MockEndpoint {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req);
        let mut script = self.script.lock().unwrap();
        assert!(!script.is_empty(), "endpoint called more often than scripted");
        script.remove(0)
    }
}

/// A `generateContent` response whose first candidate says `text`.
pub fn candidate_response(text: &str) -> HttpResponse {
    json_response(
        200,
        &serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        }),
    )
}

pub fn json_response(code: u16, body: &serde_json::Value) -> HttpResponse {
    HttpResponse::new(
        http::StatusCode::from_u16(code).unwrap(),
        http::HeaderMap::new(),
        serde_json::to_vec(body).unwrap(),
    )
}

pub fn status(code: u16) -> HttpResponse {
    HttpResponse::with_status(http::StatusCode::from_u16(code).unwrap())
}

pub fn endpoint_url() -> url::Url {
    url::Url::parse("https://example.com/v1beta/models/test:generateContent").unwrap()
}

/// Client over `endpoint` with instant backoff and three attempts.
pub fn client(endpoint: MockEndpoint) -> GenerativeClient<MockEndpoint, InstantSleeper> {
    let fetcher = ResilientFetcher::new(endpoint)
        .with_sleeper(InstantSleeper)
        .with_retry_policy(RetryPolicy::new().with_max_attempts(3));
    GenerativeClient::new(fetcher, endpoint_url())
}
