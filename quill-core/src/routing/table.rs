//! Per-verb route buckets and request matching

use std::collections::HashMap;
use std::sync::Arc;

use super::pattern::PathParams;
use super::route::{Route, RouteSpec};
use crate::app::errors;
use crate::error::RouteError;
use crate::http::{HttpRequest, HttpResponse, RawRequest, ResponseHeaders, Status};
use crate::pipeline::{Handler, Middleware};

/// Route buckets; `All` holds the catch-all routes tried after the verb's own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    All,
}

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete, Verb::All];

    /// Bucket for a request method, case-insensitive
    ///
    /// Methods without a bucket of their own (HEAD, PATCH, ...) only reach
    /// catch-all routes.
    pub fn from_method(method: &str) -> Option<Verb> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(Verb::Get),
            "POST" => Some(Verb::Post),
            "PUT" => Some(Verb::Put),
            "DELETE" => Some(Verb::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::All => "ALL",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of matching one request
#[derive(Debug)]
pub struct RouteMatch {
    pub request: HttpRequest,
    pub response: HttpResponse,
    pub route: Arc<Route>,
}

impl RouteMatch {
    /// Whether nothing matched and the built-in not-found route was used
    pub fn is_not_found(&self) -> bool {
        self.response.status() == Status::NOT_FOUND && self.route.patterns().is_empty()
    }
}

/// Ordered route collections, one per verb, plus the synthetic 404/500 routes
///
/// Built once at startup and only read afterwards. Within a bucket the first
/// structural match wins; routes are tried in registration order unless
/// [`RouteTable::sort_by_priority`] was called.
///
/// # Example
///
/// ```rust
/// use quill_core::http::RawRequest;
/// use quill_core::pipeline::Handler;
/// use quill_core::routing::RouteTable;
///
/// let mut table = RouteTable::new();
/// table.get("/user/:id/:msg?", Vec::new(), Handler::new(|_| Ok("user"))).unwrap();
///
/// let matched = table.match_request(RawRequest::new("get", "/user/3/4"));
/// assert_eq!(matched.request.param("msg"), Some("4"));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable {
    buckets: HashMap<Verb, Vec<Arc<Route>>>,
    names: HashMap<String, Arc<Route>>,
    not_found: Arc<Route>,
    internal_error: Arc<Route>,
    default_headers: ResponseHeaders,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    pub fn new() -> Self {
        let buckets = Verb::ALL.iter().map(|verb| (*verb, Vec::new())).collect();
        Self {
            buckets,
            names: HashMap::new(),
            not_found: Arc::new(Route::synthetic("not_found", errors::not_found_handler())),
            internal_error: Arc::new(Route::synthetic(
                "internal_error",
                errors::internal_error_handler(),
            )),
            default_headers: ResponseHeaders::new(),
        }
    }

    /// Register a route in the bucket for `verb`
    ///
    /// # Errors
    ///
    /// Fails when the route spec has no handler, its pattern does not compile, or
    /// its name is already taken.
    pub fn register(&mut self, verb: Verb, spec: RouteSpec) -> Result<Arc<Route>, RouteError> {
        if let Some(name) = spec.name_ref() {
            if self.names.contains_key(name) {
                return Err(RouteError::DuplicateName(name.to_string()));
            }
        }

        let route = Arc::new(spec.build()?);
        if let Some(name) = route.name() {
            self.names.insert(name.to_string(), Arc::clone(&route));
        }
        self.buckets.entry(verb).or_default().push(Arc::clone(&route));

        log::debug!(
            "Registered {} route {} (priority {})",
            verb,
            route.patterns().patterns().first().map(|p| p.source()).unwrap_or_default(),
            route.priority()
        );
        Ok(route)
    }

    /// Positional form of [`RouteTable::register`]
    pub fn register_route(
        &mut self,
        verb: Verb,
        pattern: &str,
        middleware: Vec<Middleware>,
        handler: Option<Handler>,
        name: Option<&str>,
    ) -> Result<Arc<Route>, RouteError> {
        let mut spec = RouteSpec::new(pattern);
        for m in middleware {
            spec = spec.middleware(m);
        }
        if let Some(handler) = handler {
            spec = spec.handler(handler);
        }
        if let Some(name) = name {
            spec = spec.named(name);
        }
        self.register(verb, spec)
    }

    pub fn get(
        &mut self,
        pattern: &str,
        middleware: Vec<Middleware>,
        handler: Handler,
    ) -> Result<Arc<Route>, RouteError> {
        self.register_route(Verb::Get, pattern, middleware, Some(handler), None)
    }

    pub fn post(
        &mut self,
        pattern: &str,
        middleware: Vec<Middleware>,
        handler: Handler,
    ) -> Result<Arc<Route>, RouteError> {
        self.register_route(Verb::Post, pattern, middleware, Some(handler), None)
    }

    pub fn put(
        &mut self,
        pattern: &str,
        middleware: Vec<Middleware>,
        handler: Handler,
    ) -> Result<Arc<Route>, RouteError> {
        self.register_route(Verb::Put, pattern, middleware, Some(handler), None)
    }

    pub fn delete(
        &mut self,
        pattern: &str,
        middleware: Vec<Middleware>,
        handler: Handler,
    ) -> Result<Arc<Route>, RouteError> {
        self.register_route(Verb::Delete, pattern, middleware, Some(handler), None)
    }

    /// Catch-all route, tried after the verb-specific ones
    pub fn all(
        &mut self,
        pattern: &str,
        middleware: Vec<Middleware>,
        handler: Handler,
    ) -> Result<Arc<Route>, RouteError> {
        self.register_route(Verb::All, pattern, middleware, Some(handler), None)
    }

    /// Routes of one bucket, in match order
    pub fn routes(&self, verb: Verb) -> &[Arc<Route>] {
        self.buckets.get(&verb).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Headers every fresh response starts with
    pub fn set_default_headers(&mut self, headers: ResponseHeaders) {
        self.default_headers = headers;
    }

    pub fn default_headers(&self) -> &ResponseHeaders {
        &self.default_headers
    }

    pub fn not_found_route(&self) -> &Arc<Route> {
        &self.not_found
    }

    pub fn internal_error_route(&self) -> &Arc<Route> {
        &self.internal_error
    }

    pub fn set_not_found(&mut self, handler: Handler) {
        self.not_found = Arc::new(Route::synthetic("not_found", handler));
    }

    pub fn set_internal_error(&mut self, handler: Handler) {
        self.internal_error = Arc::new(Route::synthetic("internal_error", handler));
    }

    /// Find the route for a request
    ///
    /// Tries the method's bucket, then the catch-all bucket. When nothing
    /// matches the result is bound to the not-found route, carries no
    /// parameters and has its status preset to 404.
    pub fn match_request(&self, raw: RawRequest) -> RouteMatch {
        let found = Verb::from_method(&raw.method)
            .and_then(|verb| self.find(verb, &raw))
            .or_else(|| self.find(Verb::All, &raw));

        match found {
            Some((route, params)) => RouteMatch {
                request: HttpRequest::new(raw, params),
                response: self.new_response(),
                route,
            },
            None => {
                log::debug!("No route for {} {}", raw.method, raw.path);
                let mut response = self.new_response();
                response.set_status_line(Status::NOT_FOUND);
                RouteMatch {
                    request: HttpRequest::new(raw, PathParams::new()),
                    response,
                    route: Arc::clone(&self.not_found),
                }
            }
        }
    }

    fn find(&self, verb: Verb, raw: &RawRequest) -> Option<(Arc<Route>, PathParams)> {
        self.routes(verb)
            .iter()
            .find_map(|route| route.matches(raw).map(|params| (Arc::clone(route), params)))
    }

    pub fn new_response(&self) -> HttpResponse {
        HttpResponse::with_headers(self.default_headers.clone())
    }

    /// Route registered under `name`
    pub fn lookup_by_name(&self, name: &str) -> Result<&Arc<Route>, RouteError> {
        self.names.get(name).ok_or_else(|| RouteError::UnknownName(name.to_string()))
    }

    /// Reverse-route a named route
    pub fn url_for(&self, name: &str, params: &PathParams) -> Result<String, RouteError> {
        self.lookup_by_name(name)?.reverse(params)
    }

    /// Stable sort of every bucket by descending priority
    pub fn sort_by_priority(&mut self) {
        for routes in self.buckets.values_mut() {
            routes.sort_by_key(|route| std::cmp::Reverse(route.priority()));
        }
    }
}
