//! Declarative HTTP route client.
//!
//! Build a tree of route templates from a base URL, attach headers and
//! middleware at any level, and get reusable request factories per verb.
//!
//! ```no_run
//! use routekit::{create_client, Headers, Middleware};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), routekit::RouteError> {
//! let api = create_client("https://api.example.com", Headers::new(), Middleware::new())?;
//! let service = api.at("service/:uuid/")?;
//! let list = service.get("items")?;
//!
//! // GET https://api.example.com/service/qwerty/items?count=25
//! let res = list.invoke(json!({"uuid": "qwerty", "count": 25})).await?;
//! println!("{}", res.body);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod observability;
pub mod routing;
pub mod template;

pub use client::{create_client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{BoxError, RouteError, RouteResult};
pub use http::{
    Headers, OutgoingRequest, Payload, RequestDescriptor, RequestFactory, ResponseEnvelope,
    Transport, TransportError, Verb,
};
pub use middleware::Middleware;
pub use routing::RouteNode;
pub use template::{MissingParameterError, Params, PathTemplate, ResolveError, TemplateError};
