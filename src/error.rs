//! Error types surfaced by request factories.

use thiserror::Error;

use crate::http::response::ResponseEnvelope;
use crate::template::{MissingParameterError, ResolveError, TemplateError};

/// Boxed error produced by middleware and transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building or invoking a request.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A required path parameter had no value. Raised before any I/O.
    #[error(transparent)]
    MissingParameter(#[from] MissingParameterError),

    /// A route pattern failed to compile.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Invocation params were not a map, or a value cannot be placed in a path.
    #[error("invalid request parameters: {0}")]
    InvalidParams(String),

    /// Root URL or resolved URL could not be parsed.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A beforeSend or postRequest stage failed; carries that stage's error.
    #[error(transparent)]
    Middleware(BoxError),

    /// The transport reported a failure; the envelope has been through the
    /// postRequest chain.
    #[error("{0}")]
    Transport(Box<ResponseEnvelope>),

    /// The default HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<ResolveError> for RouteError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Missing(e) => RouteError::MissingParameter(e),
            other => RouteError::InvalidParams(other.to_string()),
        }
    }
}

impl RouteError {
    /// Envelope of a failed transport call, if that is what this is.
    pub fn response(&self) -> Option<&ResponseEnvelope> {
        match self {
            RouteError::Transport(envelope) => Some(envelope),
            _ => None,
        }
    }

    /// Error raised by a middleware stage, for downcasting.
    pub fn middleware_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            RouteError::Middleware(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Shorthand result type.
pub type RouteResult<T> = Result<T, RouteError>;
