//! HTTP response model and serialization
//!
//! An [`HttpResponse`] is created alongside its request, mutated by
//! interceptors and the handler, and finalized once before the transport
//! writes it. The body stays in the shape the handler produced until
//! [`HttpResponse::finalize`] materializes it into bytes.

use std::borrow::Cow;
use std::fmt::Write;

use super::constants::{content_types, headers, CRLF, HTTP_1_1};
use super::cookie::{format_clear_cookie, format_set_cookie, CookieOptions};
use super::headers::ResponseHeaders;
use super::status::Status;
use crate::error::StatusError;
use crate::negotiation::ContentType;

/// Response payload, materialized lazily
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Text(String),
    Bytes(Vec<u8>),
    /// Structured data waiting for a render step; serialized as JSON if
    /// nothing renders it first
    Json(serde_json::Value),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Text(text) => text.is_empty(),
            Body::Bytes(bytes) => bytes.is_empty(),
            Body::Json(_) => false,
        }
    }

    /// Wire bytes for this body
    pub fn as_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Body::Empty => Cow::Borrowed(&[]),
            Body::Text(text) => Cow::Borrowed(text.as_bytes()),
            Body::Bytes(bytes) => Cow::Borrowed(bytes),
            Body::Json(value) => Cow::Owned(value.to_string().into_bytes()),
        }
    }

    /// Text view, if the body is valid UTF-8
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Body::Empty => Some(Cow::Borrowed("")),
            Body::Text(text) => Some(Cow::Borrowed(text)),
            Body::Bytes(bytes) => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Body::Json(value) => Some(Cow::Owned(value.to_string())),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Body::Empty
    }
}

/// Mutable response state for one request
///
/// # Example
///
/// ```rust
/// use quill_core::http::{CookieOptions, HttpResponse, Status};
///
/// let mut response = HttpResponse::new();
/// response.set_header("Content-Type", "application/json");
/// response.set_cookie("a", "b", &CookieOptions::new().with_domain("x.com"));
/// response.redirect_to("/login");
/// assert_eq!(response.status(), Status::FOUND);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    status: Status,
    headers: ResponseHeaders,
    body: Body,
    finalized: bool,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a set of default headers (usually the app's)
    pub fn with_headers(headers: ResponseHeaders) -> Self {
        Self { headers, ..Self::default() }
    }

    // Status

    pub fn status(&self) -> Status {
        self.status
    }

    /// Set the status by code; codes outside the phrase table are rejected
    pub fn set_status(&mut self, code: u16) -> Result<(), StatusError> {
        self.status = Status::from_code(code)?;
        Ok(())
    }

    pub fn set_status_line(&mut self, status: Status) {
        self.status = status;
    }

    // Headers

    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut ResponseHeaders {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    /// Add another instance of a header
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.add(name, value);
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    /// `(name, value)` pairs in the order they will be written
    pub fn header_lines(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter()
    }

    // Convenience mutators

    /// Redirect with an explicit status code
    pub fn redirect(&mut self, location: &str, code: u16) -> Result<(), StatusError> {
        self.set_status(code)?;
        self.set_header(headers::LOCATION, location);
        Ok(())
    }

    /// `302 Found` redirect
    pub fn redirect_to(&mut self, location: &str) {
        self.status = Status::FOUND;
        self.set_header(headers::LOCATION, location);
    }

    /// Add a Set-Cookie header; each cookie is its own header instance
    pub fn set_cookie(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.append_header(headers::SET_COOKIE, format_set_cookie(name, value, options));
    }

    /// Expire a cookie on the client
    pub fn clear_cookie(&mut self, name: &str) {
        self.clear_cookie_with(name, &CookieOptions::default());
    }

    pub fn clear_cookie_with(&mut self, name: &str, options: &CookieOptions) {
        self.append_header(headers::SET_COOKIE, format_clear_cookie(name, options));
    }

    /// Serve the body as a download named `filename`
    ///
    /// The Content-Type is guessed from the extension.
    pub fn set_attachment(&mut self, filename: &str) {
        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        self.set_header(
            headers::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename.replace('"', "\\\"")),
        );
        self.set_header(headers::CONTENT_TYPE, mime.essence_str());
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.header(headers::CONTENT_TYPE).and_then(|ct| ContentType::parse(ct).ok())
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        self.set_header(headers::CONTENT_TYPE, content_type);
    }

    /// Charset embedded in the Content-Type header
    pub fn charset(&self) -> Option<String> {
        self.content_type()
            .filter(|ct| ct.has_charset())
            .map(|ct| ct.charset().to_string())
    }

    /// Rewrite the charset parameter of the Content-Type header
    ///
    /// Without a Content-Type, `text/html` is assumed.
    pub fn set_charset(&mut self, charset: &str) {
        let current = self
            .header(headers::CONTENT_TYPE)
            .unwrap_or(content_types::HTML_ESSENCE)
            .to_string();

        let charset_param = format!("charset={}", charset);
        let mut params: Vec<&str> = current
            .split(';')
            .skip(1)
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.to_ascii_lowercase().starts_with("charset="))
            .collect();
        params.push(&charset_param);

        let essence = current.split(';').next().unwrap_or_default().trim().to_string();
        self.set_header(headers::CONTENT_TYPE, format!("{}; {}", essence, params.join("; ")));
    }

    /// Set an RFC 5988 Link header from `rel -> url` pairs, sorted by rel
    pub fn set_links<I, K, V>(&mut self, links: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut links: Vec<(String, String)> =
            links.into_iter().map(|(rel, url)| (rel.into(), url.into())).collect();
        links.sort_by(|a, b| a.0.cmp(&b.0));

        let value = links
            .iter()
            .map(|(rel, url)| format!("<{}>; rel=\"{}\"", url, rel))
            .collect::<Vec<_>>()
            .join(", ");
        self.set_header(headers::LINK, value);
    }

    // Body

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Replace the body; a structured JSON body also sets its Content-Type
    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
        if matches!(self.body, Body::Json(_)) {
            self.set_content_type(content_types::JSON);
        }
    }

    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Set a JSON body together with its Content-Type
    pub fn set_json(&mut self, value: serde_json::Value) {
        self.set_content_type(content_types::JSON);
        self.body = Body::Text(value.to_string());
    }

    /// Materialized body bytes
    pub fn body_bytes(&self) -> Cow<'_, [u8]> {
        self.body.as_bytes()
    }

    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        self.body.as_text()
    }

    // Finalization

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Materialize the body and fix up Content-Type and Content-Length
    ///
    /// Runs once; later calls are no-ops.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }

        if let Body::Json(value) = &self.body {
            if !self.headers.contains(headers::CONTENT_TYPE) {
                self.headers.set(headers::CONTENT_TYPE, content_types::JSON);
            }
            self.body = Body::Bytes(value.to_string().into_bytes());
        }

        let length = self.body.as_bytes().len();
        self.headers.set(headers::CONTENT_LENGTH, length.to_string());
        self.finalized = true;
    }

    /// Convert the response to raw HTTP bytes for transmission
    pub fn to_bytes(&mut self) -> Vec<u8> {
        self.finalize();

        let mut head = String::new();
        let _ = write!(&mut head, "{} {}{}", HTTP_1_1, self.status, CRLF);
        head.push_str(&self.headers.render());

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body.as_bytes());
        bytes
    }
}
