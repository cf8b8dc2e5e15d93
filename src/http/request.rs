//! Request-side types.
//!
//! # Responsibilities
//! - Name the supported verbs and where each puts residual params
//! - Carry the mutable request descriptor through the beforeSend chain
//! - Describe the final request handed to the transport
//!
//! # Design Decisions
//! - Headers are a sorted map; merges lowercase the names, later wins
//! - `get` sends residual params as query, write verbs as a JSON body,
//!   `delete` drops them

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::template::Params;

/// Header map used throughout the route tree.
pub type Headers = BTreeMap<String, String>;

/// Merge `from` into `into`, lowercasing names so case variants collide.
pub fn merge_headers(into: &mut Headers, from: &Headers) {
    into.extend(from.iter().map(|(k, v)| (k.to_ascii_lowercase(), v.clone())));
}

/// Supported HTTP verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Where residual params end up for a given verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Query,
    Body,
    Discard,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Verb::Get => Placement::Query,
            Verb::Post | Verb::Put | Verb::Patch => Placement::Body,
            Verb::Delete => Placement::Discard,
        }
    }

    pub fn as_method(&self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Patch => reqwest::Method::PATCH,
            Verb::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Verb::Get),
            "post" => Ok(Verb::Post),
            "put" => Ok(Verb::Put),
            "patch" => Ok(Verb::Patch),
            "delete" | "del" => Ok(Verb::Delete),
            other => Err(format!("unsupported verb '{}'", other)),
        }
    }
}

/// Request state threaded through the beforeSend chain.
///
/// Each stage receives the previous stage's output and may rewrite any
/// public field. The verb is fixed by the factory and read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Params not consumed by the path.
    pub params: Params,
    /// Path relative to the client root.
    pub path: String,
    /// Fully merged headers.
    pub headers: Headers,
    method: Verb,
}

impl RequestDescriptor {
    pub fn new(method: Verb, path: impl Into<String>, params: Params, headers: Headers) -> Self {
        Self {
            params,
            path: path.into(),
            headers,
            method,
        }
    }

    pub fn method(&self) -> Verb {
        self.method
    }
}

/// Residual params in their final placement.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Query(Params),
    Json(Value),
}

impl Payload {
    /// Build the payload for `verb` out of the residual params.
    pub fn for_verb(verb: Verb, params: Params) -> Self {
        match verb.placement() {
            Placement::Query if params.is_empty() => Payload::Empty,
            Placement::Query => Payload::Query(params),
            Placement::Body => Payload::Json(Value::Object(params)),
            Placement::Discard => Payload::Empty,
        }
    }

    /// Flatten query params into string pairs.
    ///
    /// Arrays repeat the key, `null` is skipped, objects are sent as JSON text.
    pub fn query_pairs(params: &Params) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(params.len());
        for (key, value) in params {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items.iter().filter(|v| !v.is_null()) {
                        pairs.push((key.clone(), scalar_text(item)));
                    }
                }
                other => pairs.push((key.clone(), scalar_text(other))),
            }
        }
        pairs
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Final request handed to a [`Transport`](crate::http::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Verb,
    pub url: Url,
    pub headers: Headers,
    pub payload: Payload,
}

impl OutgoingRequest {
    pub fn summary(&self) -> RequestSummary {
        RequestSummary {
            method: self.method,
            url: self.url.to_string(),
            headers: self.headers.clone(),
        }
    }
}

/// Request metadata attached to every response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub method: Verb,
    pub url: String,
    pub headers: Headers,
}
