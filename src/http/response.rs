//! Response envelope.
//!
//! # Responsibilities
//! - Hold status, headers and body of a settled request
//! - Keep the originating request metadata for diagnostics
//! - Represent network failures (no status) with the same type
//!
//! # Design Decisions
//! - Body kept as text; decoding is the caller's choice via `json()`
//! - Envelope is passed by value through the postRequest chain

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

use crate::http::request::{Headers, RequestSummary};

/// Settled request, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    /// `None` when no response was received.
    pub status: Option<StatusCode>,
    pub headers: Headers,
    pub body: String,
    pub request: RequestSummary,
    /// Time spent in the transport.
    pub latency: Duration,
    /// Transport failure message, if any.
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn new(request: RequestSummary, status: StatusCode) -> Self {
        Self {
            status: Some(status),
            headers: Headers::new(),
            body: String::new(),
            request,
            latency: Duration::ZERO,
            error: None,
        }
    }

    /// Envelope for a request that never got a response.
    pub fn failed(request: RequestSummary, error: impl fmt::Display) -> Self {
        Self {
            status: None,
            headers: Headers::new(),
            body: String::new(),
            request,
            latency: Duration::ZERO,
            error: Some(error.to_string()),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.map(|s| s.is_success()).unwrap_or(false)
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status.map(|s| s.as_u16())
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

impl fmt::Display for ResponseEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.error) {
            (Some(status), _) => write!(
                f,
                "{} {} returned {}",
                self.request.method, self.request.url, status
            ),
            (None, Some(error)) => write!(
                f,
                "{} {} failed: {}",
                self.request.method, self.request.url, error
            ),
            (None, None) => write!(
                f,
                "{} {} failed without a response",
                self.request.method, self.request.url
            ),
        }
    }
}
