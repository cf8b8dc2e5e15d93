//! Parameter substitution.
//!
//! # Responsibilities
//! - Report the first missing required parameter across a template chain
//! - Render each template, dropping optional groups that cannot be filled
//! - Join rendered fragments with single slashes
//! - Split caller params into consumed (path) and residual (query/body)
//!
//! # Design Decisions
//! - Required params are checked for the whole chain before any rendering
//! - `null` is treated the same as an absent key
//! - Values are percent-encoded as single path segments; template literals
//!   are trusted and emitted as written
//! - A value of `.` or `..` is rejected, since URL parsing would collapse it

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::template::parser::{PathTemplate, Segment};

/// Caller-supplied parameters.
pub type Params = Map<String, Value>;

/// A required path parameter had no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no values provided for key `{name}`")]
pub struct MissingParameterError {
    pub name: String,
}

/// Why a template chain could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Missing(#[from] MissingParameterError),

    /// The value would render as a whole `.` or `..` path segment.
    #[error("value `{value}` for key `{name}` is not a valid path segment")]
    DotSegment { name: String, value: String },
}

/// Bytes escaped when a value is rendered into a path.
const PATH_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Output of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Path relative to the client root.
    pub path: String,
    /// Params not referenced by any template.
    pub residual: Params,
}

/// Resolve a root-to-leaf chain of templates against `params`.
pub fn resolve(templates: &[&PathTemplate], params: &Params) -> Result<Resolved, ResolveError> {
    for template in templates {
        if let Some(name) = template.required_params().find(|name| lookup(params, name).is_none()) {
            return Err(MissingParameterError {
                name: name.to_string(),
            }
            .into());
        }
    }

    let mut path = String::new();
    let mut consumed: BTreeSet<&str> = BTreeSet::new();
    for template in templates {
        let mut fragment = String::new();
        render_segments(template.segments(), params, &mut fragment)?;
        path = join_paths(&path, &fragment);
        consumed.extend(template.param_names().iter().map(String::as_str));
    }

    let residual = params
        .iter()
        .filter(|(key, _)| !consumed.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Resolved { path, residual })
}

/// Join two path fragments with exactly one `/` between them.
///
/// An empty side yields the other side unchanged, so trailing slashes
/// of the last non-empty fragment survive.
pub fn join_paths(base: &str, tail: &str) -> String {
    if base.is_empty() {
        return tail.to_string();
    }
    if tail.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        tail.trim_start_matches('/')
    )
}

fn lookup<'a>(params: &'a Params, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

fn render_value(name: &str, value: &Value) -> Result<String, ResolveError> {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if raw == "." || raw == ".." {
        return Err(ResolveError::DotSegment {
            name: name.to_string(),
            value: raw,
        });
    }
    Ok(utf8_percent_encode(&raw, PATH_VALUE).to_string())
}

/// A group is renderable when every param directly inside it is bound.
fn group_satisfied(segments: &[Segment], params: &Params) -> bool {
    segments.iter().all(|s| match s {
        Segment::Param(name) => lookup(params, name).is_some(),
        _ => true,
    })
}

fn render_segments(segments: &[Segment], params: &Params, out: &mut String) -> Result<(), ResolveError> {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Param(name) => {
                if let Some(value) = lookup(params, name) {
                    out.push_str(&render_value(name, value)?);
                }
            }
            Segment::Group(inner) => {
                if group_satisfied(inner, params) {
                    render_segments(inner, params, out)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: Value) -> Params {
        match v {
            Value::Object(map) => map,
            _ => Params::new(),
        }
    }

    fn render(pattern: &str, v: Value) -> Result<Resolved, ResolveError> {
        let t = PathTemplate::compile(pattern).unwrap();
        resolve(&[&t], &params(v))
    }

    fn missing(err: ResolveError) -> String {
        match err {
            ResolveError::Missing(e) => e.name,
            other => panic!("expected a missing parameter, got {:?}", other),
        }
    }

    #[test]
    fn test_required_param() {
        let r = render("service/:uuid/", json!({"uuid": "qwerty"})).unwrap();
        assert_eq!(r.path, "service/qwerty/");
        assert!(r.residual.is_empty());
    }

    #[test]
    fn test_optional_groups() {
        let pattern = "service/id_:uuid/v:major(.:minor)/(*/)";

        let r = render(pattern, json!({"uuid": "qwerty", "major": 1, "_": "extra"})).unwrap();
        assert_eq!(r.path, "service/id_qwerty/v1/extra/");

        let r = render(pattern, json!({"uuid": "qwerty", "major": 2, "minor": 5})).unwrap();
        assert_eq!(r.path, "service/id_qwerty/v2.5/");
        assert!(r.residual.is_empty());
    }

    #[test]
    fn test_outer_required_wins_over_group() {
        let pattern = "service/:uuid/(:type/)";

        let err = render(pattern, json!({})).unwrap_err();
        assert_eq!(err.to_string(), "no values provided for key `uuid`");

        let err = render(pattern, json!({"type": "x"})).unwrap_err();
        assert_eq!(missing(err), "uuid");

        let r = render(pattern, json!({"uuid": "id"})).unwrap();
        assert_eq!(r.path, "service/id/");
    }

    #[test]
    fn test_first_missing_in_template_order() {
        let err = render(":a/:b/:c", json!({"a": 1})).unwrap_err();
        assert_eq!(missing(err), "b");
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err = render("users/:id", json!({"id": null})).unwrap_err();
        assert_eq!(missing(err), "id");

        let r = render("users(/:id)", json!({"id": null})).unwrap();
        assert_eq!(r.path, "users");
    }

    #[test]
    fn test_group_never_renders_partially() {
        let r = render("a(/:b/:c)", json!({"b": "x"})).unwrap();
        assert_eq!(r.path, "a");
        // `b` is still consumed even though its group was dropped
        assert!(r.residual.is_empty());

        let r = render("a(/:b(/:c))", json!({"b": "x"})).unwrap();
        assert_eq!(r.path, "a/x");

        let r = render("a(/:b(/:c))", json!({"c": "y"})).unwrap();
        assert_eq!(r.path, "a");
    }

    #[test]
    fn test_residual_params_untouched() {
        let r = render(
            "users/:id",
            json!({"id": 7, "order": "descending", "count": 25, "limit": -1}),
        )
        .unwrap();
        assert_eq!(r.path, "users/7");
        assert_eq!(
            Value::Object(r.residual),
            json!({"order": "descending", "count": 25, "limit": -1})
        );
    }

    #[test]
    fn test_chain_joins_with_single_slash() {
        let a = PathTemplate::compile("service/").unwrap();
        let b = PathTemplate::compile("/:uuid/").unwrap();
        let c = PathTemplate::compile("(:type/)").unwrap();
        let d = PathTemplate::compile("items").unwrap();

        let p = params(json!({"uuid": "u1"}));
        assert_eq!(resolve(&[&a, &b, &c], &p).unwrap().path, "service/u1/");
        assert_eq!(resolve(&[&a, &b, &c, &d], &p).unwrap().path, "service/u1/items");

        let err = resolve(&[&a, &d, &b], &Params::new()).unwrap_err();
        assert_eq!(missing(err), "uuid");
    }

    #[test]
    fn test_no_tokens_left_when_required_bound() {
        let patterns = [
            "service/id_:uuid/v:major(.:minor)/(*/)",
            "a/:b(/:c(/:d))/e",
            "(:x)/:y(-:z)",
        ];
        for pattern in patterns {
            let t = PathTemplate::compile(pattern).unwrap();
            let mut p = Params::new();
            for name in t.required_params() {
                p.insert(name.to_string(), json!("v"));
            }
            let r = resolve(&[&t], &p).unwrap();
            assert!(!r.path.contains(':'), "{}", r.path);
            assert!(!r.path.contains('('), "{}", r.path);
            assert!(!r.path.contains(')'), "{}", r.path);
        }
    }

    #[test]
    fn test_values_are_escaped_as_one_segment() {
        let r = render("files/:name/meta", json!({"name": "a?admin=1#x"})).unwrap();
        assert_eq!(r.path, "files/a%3Fadmin=1%23x/meta");

        let r = render("files/:name/meta", json!({"name": "../../secret"})).unwrap();
        assert_eq!(r.path, "files/..%2F..%2Fsecret/meta");

        let r = render("files/:name", json!({"name": "50% off\\now"})).unwrap();
        assert_eq!(r.path, "files/50%25%20off%5Cnow");

        let r = render("(*/)", json!({"_": "a/b"})).unwrap();
        assert_eq!(r.path, "a%2Fb/");
    }

    #[test]
    fn test_dot_segment_values_rejected() {
        for value in [".", ".."] {
            let err = render("files/:name/meta", json!({ "name": value })).unwrap_err();
            assert_eq!(
                err,
                ResolveError::DotSegment {
                    name: "name".to_string(),
                    value: value.to_string(),
                }
            );
        }

        let r = render("v:name", json!({"name": "1.2"})).unwrap();
        assert_eq!(r.path, "v1.2");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "a/"), "a/");
        assert_eq!(join_paths("a/", ""), "a/");
        assert_eq!(join_paths("a/", "/b"), "a/b");
        assert_eq!(join_paths("a", "b/"), "a/b/");
        assert_eq!(join_paths("http://host/api", "users"), "http://host/api/users");
    }
}
