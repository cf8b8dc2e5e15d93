//! Verb dispatch.
//!
//! # Responsibilities
//! - Turn a node + verb + sub-pattern into a reusable request factory
//! - On invocation: resolve the path, merge headers, run beforeSend
//! - Place residual params per verb and call the transport
//! - Run postRequest on every settled call, then succeed or fail
//!
//! # Design Decisions
//! - Building a factory never performs I/O
//! - Missing path params fail before the transport is touched
//! - Transport failures still flow through postRequest (`succeeded = false`)
//! - Middleware errors replace whatever outcome the request had

use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Instant;
use url::Url;

use crate::error::RouteError;
use crate::http::request::{merge_headers, Headers, OutgoingRequest, Payload, RequestDescriptor, Verb};
use crate::http::response::ResponseEnvelope;
use crate::routing::RouteNode;
use crate::template::{join_paths, resolve, Params, PathTemplate};

/// Deferred, reusable request for one verb and route.
#[derive(Debug, Clone)]
pub struct RequestFactory {
    node: RouteNode,
    verb: Verb,
    template: PathTemplate,
    headers: Headers,
}

impl RequestFactory {
    pub(crate) fn new(node: RouteNode, verb: Verb, template: PathTemplate) -> Self {
        Self {
            node,
            verb,
            template,
            headers: Headers::new(),
        }
    }

    /// Add per-call headers; they override every route-level header.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn node(&self) -> &RouteNode {
        &self.node
    }

    /// Absolute URL with patterns left unsubstituted.
    pub fn url(&self) -> String {
        join_paths(&self.node.url(), self.template.source())
    }

    /// Resolve path and headers for `params` without running middleware.
    pub fn describe(&self, params: &Params) -> Result<RequestDescriptor, RouteError> {
        let lineage = self.node.lineage();
        let mut templates: Vec<&PathTemplate> = lineage.iter().map(|node| node.template()).collect();
        templates.push(&self.template);
        let resolved = resolve(&templates, params)?;

        let mut headers = self.node.merged_headers();
        merge_headers(&mut headers, &self.headers);

        Ok(RequestDescriptor::new(
            self.verb,
            resolved.path,
            resolved.residual,
            headers,
        ))
    }

    /// Invoke without parameters.
    pub async fn send(&self) -> Result<ResponseEnvelope, RouteError> {
        self.dispatch(Params::new()).await
    }

    /// Invoke with parameters; `params` must serialize to a map or null.
    pub fn invoke<P: Serialize>(
        &self,
        params: P,
    ) -> impl Future<Output = Result<ResponseEnvelope, RouteError>> + Send + '_ {
        let params = to_params(params);
        async move { self.dispatch(params?).await }
    }

    async fn dispatch(&self, params: Params) -> Result<ResponseEnvelope, RouteError> {
        let descriptor = self.describe(&params)?;
        let middleware = self.node.merged_middleware();

        let descriptor = middleware.run_before_send(descriptor).await.map_err(|e| {
            tracing::warn!(method = %self.verb, error = %e, "beforeSend middleware failed");
            RouteError::Middleware(e)
        })?;

        let request = self.outgoing(descriptor)?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            "Dispatching request"
        );

        let start = Instant::now();
        let result = self.node.transport().send(request).await;
        let latency = start.elapsed();

        let (mut envelope, succeeded) = match result {
            Ok(envelope) => (envelope, true),
            Err(e) => {
                tracing::warn!(error = %e, latency_ms = latency.as_millis() as u64, "Transport failure");
                (e.into_envelope(), false)
            }
        };
        envelope.latency = latency;

        let envelope = middleware
            .run_post_request(envelope, succeeded)
            .await
            .map_err(|e| {
                tracing::warn!(method = %self.verb, error = %e, "postRequest middleware failed");
                RouteError::Middleware(e)
            })?;

        if succeeded {
            Ok(envelope)
        } else {
            Err(RouteError::Transport(Box::new(envelope)))
        }
    }

    fn outgoing(&self, descriptor: RequestDescriptor) -> Result<OutgoingRequest, RouteError> {
        let raw = join_paths(self.node.root_url(), &descriptor.path);
        let url = Url::parse(&raw).map_err(|source| RouteError::InvalidUrl { url: raw, source })?;

        if self.verb == Verb::Delete && !descriptor.params.is_empty() {
            tracing::debug!(
                dropped = descriptor.params.len(),
                "Residual params are not sent with DELETE"
            );
        }

        Ok(OutgoingRequest {
            method: self.verb,
            url,
            headers: descriptor.headers,
            payload: Payload::for_verb(self.verb, descriptor.params),
        })
    }
}

fn to_params<P: Serialize>(params: P) -> Result<Params, RouteError> {
    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Params::new()),
        Ok(other) => Err(RouteError::InvalidParams(format!(
            "expected a map of parameters, got {}",
            other
        ))),
        Err(e) => Err(RouteError::InvalidParams(e.to_string())),
    }
}
