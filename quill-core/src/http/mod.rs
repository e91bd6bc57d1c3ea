//! HTTP building blocks
//!
//! Request and response models, typed header maps, cookies, query strings and
//! the status table, plus the hyper-based transport adapter.
//!
//! # Architecture
//!
//! - [`request`] - raw request source and the matched request descriptor
//! - [`response`] - response model and wire serialization
//! - [`headers`] - case-insensitive request and ordered response header maps
//! - [`status`] - code to reason phrase table
//! - [`server`] - tokio/hyper transport adapter
//!
//! # Example
//!
//! ```rust
//! use quill_core::http::{HttpResponse, RawRequest};
//!
//! let raw = RawRequest::parse(b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
//! assert_eq!(raw.path, "/hello");
//!
//! let mut response = HttpResponse::new();
//! response.set_body("hi");
//! ```

pub mod cookie;
pub mod headers;
pub mod query;
pub mod request;
pub mod response;
pub mod server;
pub mod status;

pub use cookie::{format_set_cookie, parse_cookie_header, CookieOptions};
pub use headers::{RequestHeaders, ResponseHeaders};
pub use query::QueryString;
pub use request::{HttpRequest, RawRequest};
pub use response::{Body, HttpResponse};
pub use server::{BoundServer, Server};
pub use status::Status;

/// Result type for request parsing
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors raised while turning transport input into a [`RawRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid HTTP request format
    InvalidRequest(String),
    /// Invalid HTTP headers
    InvalidHeaders(String),
    /// Request body too large
    BodyTooLarge(usize),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidRequest(msg) => write!(f, "Invalid HTTP request: {}", msg),
            ParseError::InvalidHeaders(msg) => write!(f, "Invalid headers: {}", msg),
            ParseError::BodyTooLarge(limit) => {
                write!(f, "Request body exceeds the limit of {} bytes", limit)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Maximum request body size (default: 10MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// HTTP/1.1 protocol constants
pub mod constants {
    /// HTTP/1.1 version string
    pub const HTTP_1_1: &str = "HTTP/1.1";

    /// Common HTTP headers
    pub mod headers {
        pub const ACCEPT: &str = "Accept";
        pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
        pub const CONNECTION: &str = "Connection";
        pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
        pub const CONTENT_ENCODING: &str = "Content-Encoding";
        pub const CONTENT_LENGTH: &str = "Content-Length";
        pub const CONTENT_TYPE: &str = "Content-Type";
        pub const COOKIE: &str = "Cookie";
        pub const LINK: &str = "Link";
        pub const LOCATION: &str = "Location";
        pub const SERVER: &str = "Server";
        pub const SET_COOKIE: &str = "Set-Cookie";
        pub const VARY: &str = "Vary";
    }

    /// Common content types
    pub mod content_types {
        pub const JSON: &str = "application/json";
        pub const HTML: &str = "text/html; charset=utf-8";
        pub const HTML_ESSENCE: &str = "text/html";
        pub const TEXT: &str = "text/plain; charset=utf-8";
        pub const FORM: &str = "application/x-www-form-urlencoded";
        pub const BINARY: &str = "application/octet-stream";
    }

    /// HTTP line ending
    pub const CRLF: &str = "\r\n";
    pub const DOUBLE_CRLF: &str = "\r\n\r\n";
}
