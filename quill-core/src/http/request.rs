//! Inbound request data
//!
//! [`RawRequest`] is what a transport hands to the framework: method, target,
//! headers and body bytes. Once a route matched, it becomes an [`HttpRequest`]
//! carrying the extracted parameters, parsed negotiation lists and the fields
//! interceptors attach (cookies, session, parsed bodies).

use std::collections::HashMap;
use std::net::SocketAddr;

use super::headers::RequestHeaders;
use super::query::QueryString;
use super::{constants, ParseError, ParseResult};
use crate::app::ErrorDetail;
use crate::negotiation::{AcceptedList, ContentType, MatchStrategy};
use crate::routing::PathParams;
use crate::session::Session;

/// Request line, headers and body as received from the transport
///
/// # Example
///
/// ```rust
/// use quill_core::http::RawRequest;
///
/// let raw = RawRequest::new("GET", "/users?page=1").with_header("Accept", "application/json");
/// assert_eq!(raw.path, "/users");
/// assert_eq!(raw.query, "page=1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: RequestHeaders,
    pub body: Vec<u8>,
    pub remote_addr: Option<SocketAddr>,
}

impl RawRequest {
    /// Create from a method and a request target (`/path?query`)
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            method: method.to_ascii_uppercase(),
            path,
            query,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Parse an HTTP/1.x request from raw bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the request line or a header line is malformed
    pub fn parse(raw_request: &[u8]) -> ParseResult<Self> {
        let request_str = std::str::from_utf8(raw_request)
            .map_err(|e| ParseError::InvalidRequest(format!("Invalid UTF-8: {}", e)))?;

        let (head, body) = request_str
            .split_once(constants::DOUBLE_CRLF)
            .unwrap_or((request_str, ""));

        let mut lines = head.split(constants::CRLF);
        let request_line = lines
            .next()
            .filter(|line| !line.is_empty())
            .ok_or_else(|| ParseError::InvalidRequest("No request line".to_string()))?;
        let (method, target) = parse_request_line(request_line)?;

        let mut request = RawRequest::new(&method, &target);
        for line in lines.filter(|line| !line.is_empty()) {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::InvalidHeaders(format!("Invalid header line: {}", line)))?;
            request.headers.append(name.trim(), value.trim());
        }
        request.body = body.as_bytes().to_vec();

        Ok(request)
    }
}

/// Parse the request line (e.g. `"GET /path HTTP/1.1"`)
fn parse_request_line(line: &str) -> ParseResult<(String, String)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(ParseError::InvalidRequest(format!("Invalid request line: {}", line)));
    }
    if !parts[2].starts_with("HTTP/1.") {
        return Err(ParseError::InvalidRequest(format!("Unsupported HTTP version: {}", parts[2])));
    }

    Ok((parts[0].to_string(), parts[1].to_string()))
}

fn split_target(target: &str) -> (String, String) {
    match target.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (target.to_string(), String::new()),
    }
}

/// A matched request, owned by the task processing it
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: String,
    path: String,
    query: QueryString,
    headers: RequestHeaders,
    body: Vec<u8>,
    remote_addr: Option<SocketAddr>,
    params: PathParams,
    accept: AcceptedList,
    accept_language: AcceptedList,
    accept_charset: AcceptedList,
    accept_encoding: AcceptedList,
    // Attached by interceptors
    cookies: HashMap<String, String>,
    session: Option<Session>,
    json: Option<serde_json::Value>,
    form: Option<QueryString>,
    error: Option<ErrorDetail>,
}

impl HttpRequest {
    /// Build the request descriptor for a matched route
    pub fn new(raw: RawRequest, params: PathParams) -> Self {
        let list = |name: &str, strategy| {
            raw.headers
                .get(name)
                .map(|value| AcceptedList::parse(value, strategy))
                .unwrap_or_else(|| AcceptedList::empty(strategy))
        };
        let accept = list("accept", MatchStrategy::Mime);
        let accept_language = list("accept-language", MatchStrategy::Token);
        let accept_charset = list("accept-charset", MatchStrategy::Token);
        let accept_encoding = list("accept-encoding", MatchStrategy::Token);

        Self {
            method: raw.method,
            path: raw.path,
            query: QueryString::parse(&raw.query),
            headers: raw.headers,
            body: raw.body,
            remote_addr: raw.remote_addr,
            params,
            accept,
            accept_language,
            accept_charset,
            accept_encoding,
            cookies: HashMap::new(),
            session: None,
            json: None,
            form: None,
            error: None,
        }
    }

    // Accessors

    /// Upper-cased request method
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryString {
        &self.query
    }

    pub fn headers(&self) -> &RequestHeaders {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Get the request body as a string (if valid UTF-8)
    pub fn body_str(&self) -> ParseResult<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| ParseError::InvalidRequest(format!("Body is not valid UTF-8: {}", e)))
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Parameters captured by the route pattern
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    // Negotiation

    pub fn accept(&self) -> &AcceptedList {
        &self.accept
    }

    pub fn accept_language(&self) -> &AcceptedList {
        &self.accept_language
    }

    pub fn accept_charset(&self) -> &AcceptedList {
        &self.accept_charset
    }

    pub fn accept_encoding(&self) -> &AcceptedList {
        &self.accept_encoding
    }

    /// Whether the client accepts `media`; an absent Accept header accepts anything
    pub fn accepts(&self, media: &str) -> bool {
        !self.headers.contains("accept") || self.accept.contains(media)
    }

    pub fn accepts_language(&self, language: &str) -> bool {
        !self.headers.contains("accept-language") || self.accept_language.contains(language)
    }

    pub fn accepts_charset(&self, charset: &str) -> bool {
        !self.headers.contains("accept-charset") || self.accept_charset.contains(charset)
    }

    pub fn accepts_encoding(&self, encoding: &str) -> bool {
        self.accept_encoding.contains(encoding)
    }

    /// Whether the request body is of the given media type
    ///
    /// `candidate` may be a full type (`application/json`), a bare type
    /// (`json`) or a wildcard (`application/*`).
    pub fn is_type(&self, candidate: &str) -> bool {
        let Some(declared) = self.header("content-type") else {
            return false;
        };
        match (ContentType::parse(declared), ContentType::parse(candidate)) {
            (Ok(declared), Ok(candidate)) => declared.matches(&candidate),
            _ => false,
        }
    }

    /// Whether the request was made by `XMLHttpRequest`
    pub fn xhr(&self) -> bool {
        self.header("x-requested-with")
            .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false)
    }

    // Interceptor-attached state

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|s| s.as_str())
    }

    pub fn set_cookies(&mut self, cookies: HashMap<String, String>) {
        self.cookies = cookies;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub fn take_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// Body parsed by the JSON interceptor
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    pub fn set_json(&mut self, value: serde_json::Value) {
        self.json = Some(value);
    }

    /// Body parsed by the urlencoded interceptor
    pub fn form(&self) -> Option<&QueryString> {
        self.form.as_ref()
    }

    pub fn set_form(&mut self, form: QueryString) {
        self.form = Some(form);
    }

    /// Failure being rendered, set while an error handler runs
    pub fn error(&self) -> Option<&ErrorDetail> {
        self.error.as_ref()
    }

    pub fn set_error(&mut self, detail: ErrorDetail) {
        self.error = Some(detail);
    }
}
