//! Resilient HTTP layer for calls to the generative-text endpoint.
//!
//! This module provides:
//! - Request/response values ([`HttpRequest`], [`HttpResponse`])
//! - The transport abstraction ([`HttpClient`]) and its reqwest implementation ([`ReqwestClient`])
//! - Backoff configuration ([`RetryPolicy`])
//! - The retrying wrapper ([`ResilientFetcher`]) and its failure taxonomy ([`FetchError`])

mod client;
mod error;
mod fetcher;
mod http;
mod retry;

#[cfg(test)]
mod http_tests;

pub use client::ReqwestClient;
pub use error::{FetchError, HttpError};
pub use fetcher::ResilientFetcher;
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use retry::{Disposition, RetryPolicy};
