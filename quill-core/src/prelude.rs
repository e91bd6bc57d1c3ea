//! Prelude module for convenient imports.
//!
//! Import everything you need with a single line:
//!
//! ```rust,ignore
//! use quill_core::prelude::*;
//! ```
//!
//! This re-exports the most commonly used types, traits, and functions
//! so you can get started quickly without hunting for import paths.

// === Application ===
pub use crate::app::{App, ErrorDetail};

// === Configuration ===
pub use crate::config::{Environment, QuillConfig};
pub use crate::logging::{init_logging, LoggingConfig};

// === Errors ===
pub use crate::error::{AbortSignal, Failure, HttpError, RouteError, TemplateError};

// === HTTP types ===
pub use crate::http::{Body, CookieOptions, HttpRequest, HttpResponse, RawRequest, Server, Status};

// === Routing ===
pub use crate::routing::{PathParams, Pattern, PatternList, RouteSpec, Verb};

// === Pipeline ===
pub use crate::pipeline::{
    middleware, Controller, Handler, Interceptor, MiddlewareFactory, Outcome, RequestContext,
};

// === Middleware and rendering ===
pub use crate::middleware::{AccessLog, Compress, CookieParser, DefaultHeaders, JsonBody, UrlEncodedBody};
pub use crate::render::{PlaceholderEngine, Renderer, TemplateEngine};
pub use crate::session::{MemorySessionStore, SessionMiddleware};
