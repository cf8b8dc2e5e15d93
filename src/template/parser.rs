//! Path template compilation.
//!
//! # Grammar
//! ```text
//! pattern  := item*
//! item     := literal | param | group | wildcard
//! param    := ':' [A-Za-z0-9_]+
//! group    := '(' item* ')'
//! wildcard := '*'            (inside a group only, bound to `_`)
//! ```

use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Key under which a `*` wildcard is bound.
pub const WILDCARD_KEY: &str = "_";

/// One piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim into the path.
    Literal(String),
    /// Named parameter, required within its enclosing scope.
    Param(String),
    /// Optional group, rendered only when all of its own params are bound.
    Group(Vec<Segment>),
}

/// Errors raised while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `:` that is not followed by a parameter name.
    #[error("missing parameter name after ':' at offset {offset} in `{pattern}`")]
    EmptyParamName { pattern: String, offset: usize },

    /// A `)` without a matching `(`.
    #[error("unmatched ')' at offset {offset} in `{pattern}`")]
    UnmatchedClose { pattern: String, offset: usize },

    /// A `(` that is never closed.
    #[error("unclosed '(' in `{pattern}`")]
    UnclosedGroup { pattern: String },

    /// The same parameter name appears twice.
    #[error("parameter `{name}` appears more than once in `{pattern}`")]
    DuplicateParam { pattern: String, name: String },

    /// `*` used outside of an optional group.
    #[error("wildcard '*' outside an optional group at offset {offset} in `{pattern}`")]
    WildcardOutsideGroup { pattern: String, offset: usize },
}

/// Immutable compiled form of a route pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
    names: Vec<String>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl PathTemplate {
    /// Compile a pattern string.
    pub fn compile(pattern: &str) -> Result<Self, TemplateError> {
        // Stack of open groups; the bottom entry is the top level.
        let mut stack: Vec<Vec<Segment>> = vec![Vec::new()];
        let mut literal = String::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut names = Vec::new();
        let mut chars = pattern.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                ':' => {
                    let mut name = String::new();
                    while let Some(&(_, n)) = chars.peek() {
                        if !is_name_char(n) {
                            break;
                        }
                        name.push(n);
                        chars.next();
                    }
                    if name.is_empty() {
                        return Err(TemplateError::EmptyParamName {
                            pattern: pattern.to_string(),
                            offset,
                        });
                    }
                    flush_literal(&mut literal, &mut stack);
                    register(pattern, &name, &mut seen, &mut names)?;
                    push(&mut stack, Segment::Param(name));
                }
                '*' => {
                    if stack.len() == 1 {
                        return Err(TemplateError::WildcardOutsideGroup {
                            pattern: pattern.to_string(),
                            offset,
                        });
                    }
                    flush_literal(&mut literal, &mut stack);
                    register(pattern, WILDCARD_KEY, &mut seen, &mut names)?;
                    push(&mut stack, Segment::Param(WILDCARD_KEY.to_string()));
                }
                '(' => {
                    flush_literal(&mut literal, &mut stack);
                    stack.push(Vec::new());
                }
                ')' => {
                    if stack.len() == 1 {
                        return Err(TemplateError::UnmatchedClose {
                            pattern: pattern.to_string(),
                            offset,
                        });
                    }
                    flush_literal(&mut literal, &mut stack);
                    let group = stack.pop().unwrap_or_default();
                    push(&mut stack, Segment::Group(group));
                }
                other => literal.push(other),
            }
        }

        if stack.len() > 1 {
            return Err(TemplateError::UnclosedGroup {
                pattern: pattern.to_string(),
            });
        }
        flush_literal(&mut literal, &mut stack);

        Ok(Self {
            source: pattern.to_string(),
            segments: stack.pop().unwrap_or_default(),
            names,
        })
    }

    /// The pattern this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every parameter name in the template, grouped or not, in order.
    pub fn param_names(&self) -> &[String] {
        &self.names
    }

    /// Parameters outside any group, in order. These must always be bound.
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for PathTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

fn push(stack: &mut [Vec<Segment>], segment: Segment) {
    if let Some(top) = stack.last_mut() {
        top.push(segment);
    }
}

fn flush_literal(literal: &mut String, stack: &mut [Vec<Segment>]) {
    if !literal.is_empty() {
        push(stack, Segment::Literal(std::mem::take(literal)));
    }
}

fn register(
    pattern: &str,
    name: &str,
    seen: &mut BTreeSet<String>,
    names: &mut Vec<String>,
) -> Result<(), TemplateError> {
    if !seen.insert(name.to_string()) {
        return Err(TemplateError::DuplicateParam {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }
    names.push(name.to_string());
    Ok(())
}
