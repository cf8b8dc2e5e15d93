//! HTTP request handling subsystem.
//!
//! # Data Flow
//! ```text
//! RouteNode.get("users/:id")
//!     → dispatch.rs (RequestFactory, no I/O yet)
//!
//! RequestFactory.invoke(params)
//!     → request.rs (RequestDescriptor through beforeSend)
//!     → request.rs (Payload placement per verb)
//!     → transport.rs (send over reqwest or a custom Transport)
//!     → response.rs (ResponseEnvelope through postRequest)
//!     → Ok(envelope) / Err(RouteError)
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod transport;

pub use dispatch::RequestFactory;
pub use request::{merge_headers, Headers, OutgoingRequest, Payload, Placement, RequestDescriptor, RequestSummary, Verb};
pub use response::ResponseEnvelope;
pub use transport::{ReqwestTransport, Transport, TransportError};
