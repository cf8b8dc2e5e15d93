//! Middleware subsystem.
//!
//! # Data Flow
//! ```text
//! Route tree (root → leaf), each node with its own Middleware
//!     → pipeline.rs (concatenate levels in lineage order)
//!     → beforeSend: RequestDescriptor → … → RequestDescriptor → transport
//!     → postRequest: (ResponseEnvelope, succeeded) → … → ResponseEnvelope
//! ```
//!
//! # Design Decisions
//! - Ancestors always run before descendants
//! - Within a node, stages run in declaration order
//! - Stages are awaited one at a time, never in parallel
//! - builtin.rs offers common stages (request id, auth, logging, metrics)

pub mod builtin;
pub mod pipeline;

pub use pipeline::{BeforeSendFn, Middleware, PostRequestFn};
