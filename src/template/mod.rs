//! Path template subsystem.
//!
//! # Data Flow
//! ```text
//! Route declaration (at startup):
//!     "service/:uuid/(:type/)"
//!     → parser.rs (tokenize, build segment tree)
//!     → PathTemplate (immutable, reused by every request)
//!
//! Request invocation:
//!     [PathTemplate] (root → leaf) + caller params
//!     → render.rs (check required params, substitute, drop empty groups)
//!     → Resolved { path, residual }
//! ```
//!
//! # Design Decisions
//! - Templates compiled once, never re-parsed per request
//! - Syntax errors surface at declaration time, missing values at request time
//! - Optional groups render all-or-nothing, never partially
//! - Residual params are whatever the templates never mention

pub mod parser;
pub mod render;

pub use parser::{PathTemplate, Segment, TemplateError, WILDCARD_KEY};
pub use render::{join_paths, resolve, MissingParameterError, Params, ResolveError, Resolved};
