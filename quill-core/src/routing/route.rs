//! A single registered route

use std::sync::Arc;

use regex::Regex;

use super::pattern::{PathParams, Pattern, PatternList};
use crate::error::RouteError;
use crate::http::RawRequest;
use crate::pipeline::{Handler, Middleware};

/// Extra matching condition evaluated before the pattern, given the raw path and request
pub type Predicate = Arc<dyn Fn(&str, &RawRequest) -> bool + Send + Sync>;

/// Anything a route can be registered with: a spec string, a compiled
/// pattern, a pattern list or a hand-written regex
#[derive(Debug, Clone)]
pub enum PatternSource {
    Spec(String),
    Compiled(PatternList),
}

impl PatternSource {
    /// Compile into a pattern list
    pub fn compile(self) -> Result<PatternList, RouteError> {
        match self {
            PatternSource::Spec(spec) => Ok(Pattern::compile(&spec)?.into()),
            PatternSource::Compiled(list) => Ok(list),
        }
    }

    fn describe(&self) -> String {
        match self {
            PatternSource::Spec(spec) => spec.clone(),
            PatternSource::Compiled(list) => list
                .patterns()
                .iter()
                .map(Pattern::source)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

impl From<&str> for PatternSource {
    fn from(spec: &str) -> Self {
        PatternSource::Spec(spec.to_string())
    }
}

impl From<String> for PatternSource {
    fn from(spec: String) -> Self {
        PatternSource::Spec(spec)
    }
}

impl From<Pattern> for PatternSource {
    fn from(pattern: Pattern) -> Self {
        PatternSource::Compiled(pattern.into())
    }
}

impl From<PatternList> for PatternSource {
    fn from(list: PatternList) -> Self {
        PatternSource::Compiled(list)
    }
}

impl From<Regex> for PatternSource {
    fn from(regex: Regex) -> Self {
        PatternSource::Compiled(Pattern::from_regex(regex).into())
    }
}

/// Everything needed to register a route
///
/// # Example
///
/// ```rust
/// use quill_core::pipeline::Handler;
/// use quill_core::routing::{RouteSpec, RouteTable, Verb};
///
/// let mut table = RouteTable::new();
/// let spec = RouteSpec::new("/posts/:slug")
///     .handler(Handler::new(|cx| Ok(format!("post {}", cx.param("slug").unwrap_or_default()))))
///     .named("post")
///     .priority(20);
/// table.register(Verb::Get, spec).unwrap();
/// ```
#[derive(Clone)]
pub struct RouteSpec {
    pattern: PatternSource,
    middleware: Vec<Middleware>,
    handler: Option<Handler>,
    predicate: Option<Predicate>,
    name: Option<String>,
    priority: Option<i32>,
}

impl RouteSpec {
    pub fn new(pattern: impl Into<PatternSource>) -> Self {
        Self {
            pattern: pattern.into(),
            middleware: Vec::new(),
            handler: None,
            predicate: None,
            name: None,
            priority: None,
        }
    }

    /// Route-scoped interceptor; runs inside the app-wide ones
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &RawRequest) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the priority carried by the pattern (default 10)
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub(crate) fn name_ref(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Compile the pattern and check the route is complete
    pub fn build(self) -> Result<Route, RouteError> {
        let handler = self
            .handler
            .ok_or_else(|| RouteError::MissingHandler(self.pattern.describe()))?;
        let patterns = self.pattern.compile()?;
        let priority = self.priority.unwrap_or_else(|| patterns.priority());

        Ok(Route {
            patterns,
            priority,
            middleware: self.middleware,
            handler,
            predicate: self.predicate,
            name: self.name,
        })
    }
}

/// A compiled pattern bound to a handler and its interceptors
///
/// Immutable once registered and shared read-only by every request it matches.
#[derive(Clone)]
pub struct Route {
    patterns: PatternList,
    priority: i32,
    middleware: Vec<Middleware>,
    handler: Handler,
    predicate: Option<Predicate>,
    name: Option<String>,
}

impl Route {
    pub fn patterns(&self) -> &PatternList {
        &self.patterns
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Evaluate the predicate, then the patterns
    pub fn matches(&self, raw: &RawRequest) -> Option<PathParams> {
        if let Some(predicate) = &self.predicate {
            if !predicate(&raw.path, raw) {
                return None;
            }
        }
        self.patterns.match_path(&raw.path)
    }

    /// Build a concrete path from parameter values
    pub fn reverse(&self, params: &PathParams) -> Result<String, RouteError> {
        self.patterns.reverse(params)
    }

    /// Route that matches nothing by pattern; used for the synthetic 404/500 routes
    pub(crate) fn synthetic(name: &str, handler: Handler) -> Self {
        Self {
            patterns: PatternList::new(Vec::new()),
            priority: 0,
            middleware: Vec::new(),
            handler,
            predicate: None,
            name: Some(name.to_string()),
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("patterns", &self.patterns)
            .field("priority", &self.priority)
            .field("middleware", &self.middleware.len())
            .field("handler", &self.handler)
            .field("has_predicate", &self.predicate.is_some())
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_handler() -> Handler {
        Handler::new(|_| Ok("ok"))
    }

    #[test]
    fn test_missing_handler() {
        let err = RouteSpec::new("/posts").build().unwrap_err();
        assert_eq!(err, RouteError::MissingHandler("/posts".to_string()));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RouteSpec::new("/a/:b?/c").handler(ok_handler()).build().unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[test]
    fn test_priority_from_pattern_list() {
        let list = (Pattern::compile("/a").unwrap() | Pattern::compile("/b").unwrap()).with_priority(3);
        let route = RouteSpec::new(list).handler(ok_handler()).build().unwrap();
        assert_eq!(route.priority(), 3);

        let route = RouteSpec::new("/c").handler(ok_handler()).priority(42).build().unwrap();
        assert_eq!(route.priority(), 42);
    }

    #[test]
    fn test_predicate_runs_first() {
        let route = RouteSpec::new("/admin")
            .handler(ok_handler())
            .when(|_, raw| raw.headers.contains("x-admin"))
            .build()
            .unwrap();

        assert!(route.matches(&RawRequest::new("GET", "/admin")).is_none());
        let raw = RawRequest::new("GET", "/admin").with_header("X-Admin", "1");
        assert!(route.matches(&raw).is_some());
    }

    #[test]
    fn test_regex_route() {
        let regex = Regex::new(r"^/archive/(?P<year>\d{4})$").unwrap();
        let route = RouteSpec::new(regex).handler(ok_handler()).build().unwrap();
        let params = route.matches(&RawRequest::new("GET", "/archive/2014")).unwrap();
        assert_eq!(params.get("year").map(String::as_str), Some("2014"));
    }
}
