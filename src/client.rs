//! Client construction.
//!
//! # Responsibilities
//! - Validate the root URL
//! - Build (or accept) the transport shared by the whole tree
//! - Produce the root RouteNode with base headers and middleware
//!
//! # Design Decisions
//! - One transport per client, shared by every node via `Arc`
//! - Config-driven builds attach built-in middleware at the root

use std::sync::Arc;
use url::Url;

use crate::config::{ClientConfig, TimeoutConfig};
use crate::error::RouteError;
use crate::http::request::Headers;
use crate::http::transport::{ReqwestTransport, Transport};
use crate::middleware::{builtin, Middleware};
use crate::routing::node::{ClientCore, RouteNode};

/// Create a root node backed by the default reqwest transport.
pub fn create_client(
    root_url: &str,
    headers: Headers,
    middleware: Middleware,
) -> Result<RouteNode, RouteError> {
    ClientBuilder::new(root_url)
        .headers(headers)
        .middleware(middleware)
        .build()
}

/// Builder for a route client.
pub struct ClientBuilder {
    root_url: String,
    headers: Headers,
    middleware: Middleware,
    transport: Option<Arc<dyn Transport>>,
    timeouts: TimeoutConfig,
    user_agent: Option<String>,
}

impl ClientBuilder {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            headers: Headers::new(),
            middleware: Middleware::new(),
            transport: None,
            timeouts: TimeoutConfig::default(),
            user_agent: None,
        }
    }

    /// Start from a validated config.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut middleware = Middleware::new();
        if config.request_id {
            middleware = middleware.before_send(builtin::request_id());
        }
        if config.observability.metrics_enabled {
            middleware = middleware.post_request(builtin::record_metrics());
        }

        Self {
            root_url: config.base_url.clone(),
            headers: config.headers.clone(),
            middleware,
            transport: None,
            timeouts: config.timeouts.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Add base headers; later calls win on collisions.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Append root-level middleware after anything already configured.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.extend(&middleware);
        self
    }

    /// Use a custom transport instead of reqwest.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the root node.
    pub fn build(self) -> Result<RouteNode, RouteError> {
        Url::parse(&self.root_url).map_err(|source| RouteError::InvalidUrl {
            url: self.root_url.clone(),
            source,
        })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let transport = ReqwestTransport::from_config(&self.timeouts, self.user_agent.as_deref())
                    .map_err(|e| RouteError::Client(e.to_string()))?;
                Arc::new(transport)
            }
        };

        tracing::debug!(
            root_url = %self.root_url,
            headers = self.headers.len(),
            before_send = self.middleware.before_send_len(),
            post_request = self.middleware.post_request_len(),
            "Route client created"
        );

        let core = Arc::new(ClientCore {
            root_url: self.root_url,
            transport,
        });
        Ok(RouteNode::root(core, self.headers, self.middleware))
    }
}
