//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Tree construction:
//!     ClientBuilder::build → root RouteNode (base URL, base headers)
//!     → node.at("service/:uuid/") → child (own template/headers/middleware)
//!     → child.at(...) → ...
//!
//! Per request (from any node):
//!     walk parent links → lineage [root, ..., node]
//!     → templates, merged headers, merged middleware
//! ```
//!
//! # Design Decisions
//! - Nodes immutable after construction (thread-safe without locks)
//! - Children hold their parent; parents hold no children
//! - Deterministic: ancestors always resolved before descendants

pub mod node;

pub use node::RouteNode;
