//! Route tree nodes.
//!
//! # Responsibilities
//! - Hold one compiled path fragment with its own headers and middleware
//! - Derive children without touching the parent
//! - Resolve merged headers and middleware by walking to the root
//! - Hand out verb-specific request factories
//!
//! # Design Decisions
//! - Nodes are immutable and shared via `Arc`; cloning a node is cheap
//! - A child points at its parent; parents do not track children
//! - Merges are folds over the root-to-leaf lineage, computed per request

use std::fmt;
use std::sync::Arc;

use crate::http::dispatch::RequestFactory;
use crate::http::request::{merge_headers, Headers, Verb};
use crate::http::transport::Transport;
use crate::middleware::Middleware;
use crate::template::{join_paths, PathTemplate, TemplateError};

/// State shared by every node of one client.
pub(crate) struct ClientCore {
    pub(crate) root_url: String,
    pub(crate) transport: Arc<dyn Transport>,
}

struct NodeInner {
    template: PathTemplate,
    headers: Headers,
    middleware: Middleware,
    parent: Option<RouteNode>,
    core: Arc<ClientCore>,
}

/// Handle to a node of the route tree.
#[derive(Clone)]
pub struct RouteNode {
    inner: Arc<NodeInner>,
}

impl RouteNode {
    pub(crate) fn root(core: Arc<ClientCore>, headers: Headers, middleware: Middleware) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                template: PathTemplate::default(),
                headers,
                middleware,
                parent: None,
                core,
            }),
        }
    }

    /// Derive a child route.
    pub fn at(&self, pattern: &str) -> Result<RouteNode, TemplateError> {
        self.at_with(pattern, Headers::new(), Middleware::new())
    }

    /// Derive a child route with its own headers and middleware.
    pub fn at_with(
        &self,
        pattern: &str,
        headers: Headers,
        middleware: Middleware,
    ) -> Result<RouteNode, TemplateError> {
        let template = PathTemplate::compile(pattern)?;
        Ok(Self {
            inner: Arc::new(NodeInner {
                template,
                headers,
                middleware,
                parent: Some(self.clone()),
                core: self.inner.core.clone(),
            }),
        })
    }

    /// Build a request factory for `verb` on `pattern` below this node.
    pub fn request(&self, verb: Verb, pattern: &str) -> Result<RequestFactory, TemplateError> {
        let template = PathTemplate::compile(pattern)?;
        Ok(RequestFactory::new(self.clone(), verb, template))
    }

    pub fn get(&self, pattern: &str) -> Result<RequestFactory, TemplateError> {
        self.request(Verb::Get, pattern)
    }

    pub fn post(&self, pattern: &str) -> Result<RequestFactory, TemplateError> {
        self.request(Verb::Post, pattern)
    }

    pub fn put(&self, pattern: &str) -> Result<RequestFactory, TemplateError> {
        self.request(Verb::Put, pattern)
    }

    pub fn patch(&self, pattern: &str) -> Result<RequestFactory, TemplateError> {
        self.request(Verb::Patch, pattern)
    }

    pub fn delete(&self, pattern: &str) -> Result<RequestFactory, TemplateError> {
        self.request(Verb::Delete, pattern)
    }

    /// Absolute URL of this node with patterns left unsubstituted.
    pub fn url(&self) -> String {
        self.lineage()
            .iter()
            .fold(self.inner.core.root_url.clone(), |url, node| {
                join_paths(&url, node.template().source())
            })
    }

    /// This node's own template.
    pub fn template(&self) -> &PathTemplate {
        &self.inner.template
    }

    /// This node's own headers, not merged with ancestors.
    pub fn own_headers(&self) -> &Headers {
        &self.inner.headers
    }

    /// This node's own middleware, not merged with ancestors.
    pub fn own_middleware(&self) -> &Middleware {
        &self.inner.middleware
    }

    pub fn parent(&self) -> Option<&RouteNode> {
        self.inner.parent.as_ref()
    }

    pub fn root_url(&self) -> &str {
        &self.inner.core.root_url
    }

    pub fn depth(&self) -> usize {
        self.lineage().len() - 1
    }

    /// Nodes from the root down to `self`, inclusive.
    pub fn lineage(&self) -> Vec<&RouteNode> {
        let mut chain = Vec::new();
        let mut node = Some(self);
        while let Some(current) = node {
            chain.push(current);
            node = current.parent();
        }
        chain.reverse();
        chain
    }

    /// Headers of every ancestor and this node, later levels winning.
    pub fn merged_headers(&self) -> Headers {
        self.lineage().iter().fold(Headers::new(), |mut merged, node| {
            merge_headers(&mut merged, node.own_headers());
            merged
        })
    }

    /// Middleware of every ancestor and this node, root first.
    pub fn merged_middleware(&self) -> Middleware {
        Middleware::concat(self.lineage().iter().map(|node| node.own_middleware()))
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.core.transport
    }

    /// True when both handles point at the same node.
    pub fn same_node(&self, other: &RouteNode) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("url", &self.url())
            .field("headers", &self.inner.headers)
            .field("middleware", &self.inner.middleware)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::OutgoingRequest;
    use crate::http::response::ResponseEnvelope;
    use crate::http::transport::TransportError;
    use futures_util::future::{BoxFuture, FutureExt};
    use reqwest::StatusCode;

    struct NullTransport;

    impl Transport for NullTransport {
        fn send(&self, request: OutgoingRequest) -> BoxFuture<'_, Result<ResponseEnvelope, TransportError>> {
            async move { Ok(ResponseEnvelope::new(request.summary(), StatusCode::OK)) }.boxed()
        }
    }

    fn root(url: &str, headers: &[(&str, &str)]) -> RouteNode {
        let core = Arc::new(ClientCore {
            root_url: url.to_string(),
            transport: Arc::new(NullTransport),
        });
        let headers = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RouteNode::root(core, headers, Middleware::new())
    }

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_url_joins_patterns() {
        let api = root("http://localhost:3000/api/", &[]);
        let service = api.at("/service/:uuid/").unwrap();
        let typed = service.at("(:type/)").unwrap();

        assert_eq!(api.url(), "http://localhost:3000/api/");
        assert_eq!(service.url(), "http://localhost:3000/api/service/:uuid/");
        assert_eq!(typed.url(), "http://localhost:3000/api/service/:uuid/(:type/)");
        assert_eq!(typed.depth(), 2);
    }

    #[test]
    fn test_child_url_is_parent_plus_pattern() {
        let api = root("https://example.com", &[]);
        for (parent, child) in [("users", "/:id"), ("users/", ":id"), ("users/", "/:id/")] {
            let p = api.at(parent).unwrap();
            let c = p.at(child).unwrap();
            assert_eq!(c.url(), join_paths(&p.url(), child));
            assert!(!c.url()["https://".len()..].contains("//"));
        }
    }

    #[test]
    fn test_headers_merge_root_to_leaf() {
        let api = root("http://localhost", &[("accept", "application/json"), ("x-level", "root")]);
        let users = api
            .at_with("users", headers(&[("x-level", "users"), ("x-users", "1")]), Middleware::new())
            .unwrap();
        let user = users
            .at_with(":id", headers(&[("x-level", "user")]), Middleware::new())
            .unwrap();

        assert_eq!(
            user.merged_headers(),
            headers(&[
                ("accept", "application/json"),
                ("x-level", "user"),
                ("x-users", "1"),
            ])
        );
        // parents are untouched
        assert_eq!(users.merged_headers()["x-level"], "users");
        assert_eq!(api.own_headers().len(), 2);
    }

    #[test]
    fn test_header_names_merge_case_insensitively() {
        let api = root("http://localhost", &[("Accept", "a/root")]);
        let child = api
            .at_with("files", headers(&[("accept", "b/child")]), Middleware::new())
            .unwrap();

        assert_eq!(child.merged_headers(), headers(&[("accept", "b/child")]));
        assert_eq!(api.merged_headers(), headers(&[("accept", "a/root")]));
    }

    #[test]
    fn test_siblings_are_independent() {
        let api = root("http://localhost", &[]);
        let a = api
            .at_with("a", Headers::new(), Middleware::new().before_send(|req| Ok(req)))
            .unwrap();
        let b = api.at("b").unwrap();

        assert_eq!(a.merged_middleware().before_send_len(), 1);
        assert!(b.merged_middleware().is_empty());
        assert!(a.parent().unwrap().same_node(&api));
        assert!(b.parent().unwrap().same_node(&api));
        assert!(!a.same_node(&b));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let api = root("http://localhost", &[]);
        assert!(api.at("users/(:id").is_err());
        assert!(api.get("files/*").is_err());
    }
}
