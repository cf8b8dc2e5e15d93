//! Middleware chains.
//!
//! # Responsibilities
//! - Store beforeSend and postRequest stages in declaration order
//! - Concatenate per-node middleware root-to-leaf
//! - Drive each chain sequentially, feeding every stage the previous output
//!
//! # Design Decisions
//! - Stages are `Arc<dyn Fn>` returning boxed futures; sync closures are
//!   wrapped in a ready future
//! - Stages return new values; nothing relies on shared mutation
//! - First error aborts the rest of the chain

use futures_util::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::BoxError;
use crate::http::request::RequestDescriptor;
use crate::http::response::ResponseEnvelope;

/// A pre-send stage.
pub type BeforeSendFn =
    Arc<dyn Fn(RequestDescriptor) -> BoxFuture<'static, Result<RequestDescriptor, BoxError>> + Send + Sync>;

/// A post-response stage; the flag tells whether the transport call succeeded.
pub type PostRequestFn =
    Arc<dyn Fn(ResponseEnvelope, bool) -> BoxFuture<'static, Result<ResponseEnvelope, BoxError>> + Send + Sync>;

/// Ordered middleware declared on one node, or merged along a lineage.
#[derive(Clone, Default)]
pub struct Middleware {
    before_send: Vec<BeforeSendFn>,
    post_request: Vec<PostRequestFn>,
}

impl Middleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a synchronous beforeSend stage.
    pub fn before_send<F>(mut self, f: F) -> Self
    where
        F: Fn(RequestDescriptor) -> Result<RequestDescriptor, BoxError> + Send + Sync + 'static,
    {
        let stage: BeforeSendFn = Arc::new(move |req: RequestDescriptor| future::ready(f(req)).boxed());
        self.before_send.push(stage);
        self
    }

    /// Append an asynchronous beforeSend stage.
    pub fn before_send_async<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RequestDescriptor) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestDescriptor, BoxError>> + Send + 'static,
    {
        let stage: BeforeSendFn = Arc::new(move |req: RequestDescriptor| f(req).boxed());
        self.before_send.push(stage);
        self
    }

    /// Append a synchronous postRequest stage.
    pub fn post_request<F>(mut self, f: F) -> Self
    where
        F: Fn(ResponseEnvelope, bool) -> Result<ResponseEnvelope, BoxError> + Send + Sync + 'static,
    {
        let stage: PostRequestFn =
            Arc::new(move |res: ResponseEnvelope, ok: bool| future::ready(f(res, ok)).boxed());
        self.post_request.push(stage);
        self
    }

    /// Append an asynchronous postRequest stage.
    pub fn post_request_async<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ResponseEnvelope, bool) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResponseEnvelope, BoxError>> + Send + 'static,
    {
        let stage: PostRequestFn = Arc::new(move |res: ResponseEnvelope, ok: bool| f(res, ok).boxed());
        self.post_request.push(stage);
        self
    }

    /// Append every stage of `other` after the stages already present.
    pub fn extend(&mut self, other: &Middleware) {
        self.before_send.extend(other.before_send.iter().cloned());
        self.post_request.extend(other.post_request.iter().cloned());
    }

    /// Concatenate middleware in iteration order.
    pub fn concat<'a>(levels: impl IntoIterator<Item = &'a Middleware>) -> Middleware {
        levels.into_iter().fold(Middleware::new(), |mut acc, level| {
            acc.extend(level);
            acc
        })
    }

    pub fn before_send_len(&self) -> usize {
        self.before_send.len()
    }

    pub fn post_request_len(&self) -> usize {
        self.post_request.len()
    }

    pub fn is_empty(&self) -> bool {
        self.before_send.is_empty() && self.post_request.is_empty()
    }

    /// Run the beforeSend chain.
    pub async fn run_before_send(&self, mut request: RequestDescriptor) -> Result<RequestDescriptor, BoxError> {
        for (index, stage) in self.before_send.iter().enumerate() {
            request = stage(request).await?;
            tracing::trace!(stage = index, path = %request.path, "beforeSend stage completed");
        }
        Ok(request)
    }

    /// Run the postRequest chain with a fixed `succeeded` flag.
    pub async fn run_post_request(
        &self,
        mut response: ResponseEnvelope,
        succeeded: bool,
    ) -> Result<ResponseEnvelope, BoxError> {
        for (index, stage) in self.post_request.iter().enumerate() {
            response = stage(response, succeeded).await?;
            tracing::trace!(stage = index, succeeded, "postRequest stage completed");
        }
        Ok(response)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("before_send", &self.before_send.len())
            .field("post_request", &self.post_request.len())
            .finish()
    }
}
