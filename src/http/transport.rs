//! Transport abstraction and the default reqwest implementation.
//!
//! # Responsibilities
//! - Define the single "send" capability the dispatcher depends on
//! - Map non-2xx statuses and network errors to `TransportError`
//! - Apply connect/request timeouts and the user agent
//!
//! # Design Decisions
//! - Object-safe trait returning boxed futures (shared via `Arc<dyn _>`)
//! - Non-2xx responses still carry a full envelope
//! - No retries, no caching

use futures_util::future::{BoxFuture, FutureExt};
use std::time::Duration;
use thiserror::Error;

use crate::config::TimeoutConfig;
use crate::error::BoxError;
use crate::http::request::{Headers, OutgoingRequest, Payload, RequestSummary};
use crate::http::response::ResponseEnvelope;

/// Failure reported by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("{0}")]
    Status(Box<ResponseEnvelope>),

    /// No response was received.
    #[error("{} {} failed: {source}", .request.method, .request.url)]
    Network {
        request: RequestSummary,
        #[source]
        source: BoxError,
    },
}

impl TransportError {
    /// Convert into an envelope suitable for the postRequest chain.
    pub fn into_envelope(self) -> ResponseEnvelope {
        match self {
            TransportError::Status(envelope) => *envelope,
            TransportError::Network { request, source } => ResponseEnvelope::failed(request, source),
        }
    }
}

/// Sends fully resolved requests.
pub trait Transport: Send + Sync {
    fn send(&self, request: OutgoingRequest) -> BoxFuture<'_, Result<ResponseEnvelope, TransportError>>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default timeouts.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::from_config(&TimeoutConfig::default(), None)
    }

    /// Create a transport from timeout settings and an optional user agent.
    pub fn from_config(timeouts: &TimeoutConfig, user_agent: Option<&str>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .pool_idle_timeout(Duration::from_secs(timeouts.idle_secs));
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn execute(&self, request: OutgoingRequest) -> Result<ResponseEnvelope, TransportError> {
        let summary = request.summary();
        let network = |e: reqwest::Error| TransportError::Network {
            request: summary.clone(),
            source: Box::new(e),
        };

        let mut builder = self.client.request(request.method.as_method(), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.payload {
            Payload::Empty => builder,
            Payload::Query(params) => builder.query(&Payload::query_pairs(params)),
            Payload::Json(body) => builder.json(body),
        };

        let response = builder.send().await.map_err(network)?;
        let status = response.status();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(network)?;

        let mut envelope = ResponseEnvelope::new(summary.clone(), status).with_body(body);
        envelope.headers = headers;

        if status.is_success() {
            Ok(envelope)
        } else {
            Err(TransportError::Status(Box::new(envelope)))
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: OutgoingRequest) -> BoxFuture<'_, Result<ResponseEnvelope, TransportError>> {
        self.execute(request).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::Verb;
    use reqwest::StatusCode;

    fn summary() -> RequestSummary {
        RequestSummary {
            method: Verb::Post,
            url: "http://localhost/items".to_string(),
            headers: Headers::new(),
        }
    }

    #[test]
    fn test_status_error_keeps_envelope() {
        let env = ResponseEnvelope::new(summary(), StatusCode::CONFLICT).with_body("taken");
        let err = TransportError::Status(Box::new(env.clone()));
        assert_eq!(err.to_string(), "POST http://localhost/items returned 409 Conflict");
        assert_eq!(err.into_envelope(), env);
    }

    #[test]
    fn test_network_error_envelope() {
        let err = TransportError::Network {
            request: summary(),
            source: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "POST http://localhost/items failed: connection refused");

        let env = err.into_envelope();
        assert_eq!(env.status, None);
        assert_eq!(env.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_builds_with_default_timeouts() {
        assert!(ReqwestTransport::new().is_ok());
    }
}
