//! Route pattern compilation and reverse routing
//!
//! A route spec is a path with `:name` placeholders, an optional trailing
//! `/:name?`, and `*` for "anything". Specs compile to anchored regular
//! expressions with one named group per parameter. Hand-written regexes are
//! accepted as-is.
//!
//! # Example
//!
//! ```rust
//! use quill_core::routing::Pattern;
//!
//! let pattern = Pattern::compile("/user/:id/:msg?").unwrap();
//! let params = pattern.match_path("/user/3").unwrap();
//! assert_eq!(params.get("id").map(String::as_str), Some("3"));
//! assert!(params.get("msg").is_none());
//! ```

use std::collections::{HashMap, HashSet};
use std::ops::BitOr;

use regex::Regex;

use crate::error::RouteError;

/// Parameters extracted from a matched path
pub type PathParams = HashMap<String, String>;

/// Default route priority; higher wins when routes are sorted
pub const DEFAULT_PRIORITY: i32 = 10;

const PARAM_CLASS: &str = "[A-Za-z0-9_.,-]+";

/// A named parameter declared by a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternParam {
    pub name: String,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    /// `/:name?` at the very end; the slash belongs to the segment
    OptionalParam(String),
    Wildcard,
}

/// Compiled, immutable path matcher
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    params: Vec<PatternParam>,
    /// `None` for hand-written regexes
    segments: Option<Vec<Segment>>,
}

impl Pattern {
    /// Compile a route spec such as `/posts/:slug` or `/user/:id/:msg?`
    pub fn compile(spec: &str) -> Result<Self, RouteError> {
        let segments = tokenize(spec)?;

        let mut expr = String::from("^");
        let mut params = Vec::new();
        for segment in &segments {
            match segment {
                Segment::Literal(text) => expr.push_str(&regex::escape(text)),
                Segment::Param(name) => {
                    expr.push_str(&format!("(?P<{}>{})", name, PARAM_CLASS));
                    params.push(PatternParam { name: name.clone(), optional: false });
                }
                Segment::OptionalParam(name) => {
                    expr.push_str(&format!("(?:/(?P<{}>{}))?/?", name, PARAM_CLASS));
                    params.push(PatternParam { name: name.clone(), optional: true });
                }
                Segment::Wildcard => expr.push_str(".*"),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| invalid(spec, e.to_string()))?;

        Ok(Self { source: spec.to_string(), regex, params, segments: Some(segments) })
    }

    /// Use a hand-written regex; every named group becomes a parameter
    pub fn from_regex(regex: Regex) -> Self {
        let params = regex
            .capture_names()
            .flatten()
            .map(|name| PatternParam { name: name.to_string(), optional: false })
            .collect();

        Self { source: regex.as_str().to_string(), regex, params, segments: None }
    }

    /// The route spec or regex this pattern was built from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    pub fn params(&self) -> &[PatternParam] {
        &self.params
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match a path, returning the captured parameters
    ///
    /// Optional parameters that did not participate are left out.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let captures = self.regex.captures(path)?;
        let params = self
            .params
            .iter()
            .filter_map(|param| {
                captures
                    .name(&param.name)
                    .map(|m| (param.name.clone(), m.as_str().to_string()))
            })
            .collect();
        Some(params)
    }

    /// Build a concrete path from parameter values
    pub fn reverse(&self, params: &PathParams) -> Result<String, RouteError> {
        let Some(segments) = &self.segments else {
            return reverse_regex(&self.source, params);
        };

        let mut path = String::new();
        for segment in segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Param(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| RouteError::MissingParameter(name.clone()))?;
                    path.push_str(value);
                }
                Segment::OptionalParam(name) => {
                    if let Some(value) = params.get(name) {
                        path.push('/');
                        path.push_str(value);
                    }
                }
                Segment::Wildcard => return Err(RouteError::NotReversible(self.source.clone())),
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Several patterns tried in order, sharing one priority
///
/// Built by `|`-ing patterns together.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternList {
    patterns: Vec<Pattern>,
    priority: i32,
}

impl PatternList {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns, priority: DEFAULT_PRIORITY }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First pattern that matches wins
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        self.patterns.iter().find_map(|pattern| pattern.match_path(path))
    }

    /// Reverse through the first pattern of the list
    pub fn reverse(&self, params: &PathParams) -> Result<String, RouteError> {
        match self.patterns.first() {
            Some(pattern) => pattern.reverse(params),
            None => Err(RouteError::NotReversible("<empty pattern list>".to_string())),
        }
    }
}

impl From<Pattern> for PatternList {
    fn from(pattern: Pattern) -> Self {
        PatternList::new(vec![pattern])
    }
}

impl BitOr for Pattern {
    type Output = PatternList;

    fn bitor(self, rhs: Pattern) -> PatternList {
        PatternList::new(vec![self, rhs])
    }
}

impl BitOr<Pattern> for PatternList {
    type Output = PatternList;

    fn bitor(mut self, rhs: Pattern) -> PatternList {
        self.patterns.push(rhs);
        self
    }
}

fn invalid(spec: &str, reason: impl Into<String>) -> RouteError {
    RouteError::InvalidPattern { pattern: spec.to_string(), reason: reason.into() }
}

fn tokenize(spec: &str) -> Result<Vec<Segment>, RouteError> {
    if spec == "*" {
        return Ok(vec![Segment::Wildcard]);
    }

    let chars: Vec<char> = spec.chars().collect();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut seen = HashSet::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ':' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                if end == start {
                    return Err(invalid(spec, "parameter without a name"));
                }
                let name: String = chars[start..end].iter().collect();
                if name.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(invalid(spec, format!("parameter name {} starts with a digit", name)));
                }
                if !seen.insert(name.clone()) {
                    return Err(invalid(spec, format!("duplicate parameter {}", name)));
                }

                let optional = chars.get(end) == Some(&'?');
                if optional {
                    if end + 1 != chars.len() || !literal.ends_with('/') {
                        return Err(invalid(spec, "only a trailing /:name segment may be optional"));
                    }
                    literal.pop();
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                if optional {
                    segments.push(Segment::OptionalParam(name));
                    i = end + 1;
                } else {
                    segments.push(Segment::Param(name));
                    i = end;
                }
            }
            '*' => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Wildcard);
                i += 1;
            }
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Reverse a hand-written regex by replacing named groups with values
///
/// Only literal text and named groups are supported; any other regex syntax
/// outside a group makes the pattern irreversible.
fn reverse_regex(source: &str, params: &PathParams) -> Result<String, RouteError> {
    let body = source.strip_prefix('^').unwrap_or(source);
    let body = match body.strip_suffix('$') {
        Some(stripped) if !stripped.ends_with('\\') => stripped,
        _ => body,
    };
    let not_reversible = || RouteError::NotReversible(source.to_string());

    let chars: Vec<char> = body.chars().collect();
    let mut path = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let next = *chars.get(i + 1).ok_or_else(not_reversible)?;
                if next.is_ascii_alphanumeric() {
                    // \d, \w and friends are classes, not literals
                    return Err(not_reversible());
                }
                path.push(next);
                i += 2;
            }
            '(' => {
                let (name, close) = named_group(&chars, i).ok_or_else(not_reversible)?;
                let optional = chars.get(close + 1) == Some(&'?');
                match params.get(&name) {
                    Some(value) => path.push_str(value),
                    None if optional => {}
                    None => return Err(RouteError::MissingParameter(name)),
                }
                i = if optional { close + 2 } else { close + 1 };
            }
            '.' | '*' | '+' | '?' | '[' | ']' | '{' | '}' | '|' | '^' | '$' | ')' => {
                return Err(not_reversible());
            }
            c => {
                path.push(c);
                i += 1;
            }
        }
    }

    Ok(path)
}

/// Name and closing-paren index of a `(?P<name>...)` or `(?<name>...)` group
fn named_group(chars: &[char], open: usize) -> Option<(String, usize)> {
    let rest: String = chars[open..].iter().take(4).collect();
    let name_start = if rest.starts_with("(?P<") {
        open + 4
    } else if rest.starts_with("(?<") {
        open + 3
    } else {
        return None;
    };

    let name_len = chars[name_start..].iter().position(|&c| c == '>')?;
    let name: String = chars[name_start..name_start + name_len].iter().collect();

    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((name, i));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
