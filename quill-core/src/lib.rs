//! Quill Framework - Core
//!
//! A micro web framework: pattern routing, interceptor pipelines, content
//! negotiation and a small response model on top of a hyper transport.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quill_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> quill_core::Result<()> {
//!     let mut app = App::load()?;
//!     app.use_middleware(middleware(AccessLog));
//!
//!     app.get("/", Handler::new(|_| Ok("Hello world")))?;
//!     app.get("/user/:id/:tab?", Handler::new(|cx| {
//!         Ok(serde_json::json!({ "id": cx.param("id"), "tab": cx.param("tab") }))
//!     }))?;
//!
//!     app.listen().await
//! }
//! ```
//!
//! # Architecture
//!
//! - [`routing`] - pattern compilation, routes, per-verb route table
//! - [`negotiation`] - Accept-style header parsing and matching
//! - [`pipeline`] - interceptors, handlers, controllers and the two-phase chain
//! - [`app`] - the application, error handlers and error escalation
//! - [`http`] - request/response models and the hyper transport
//! - [`render`] - template engines and result renderers
//! - [`middleware`] - built-in interceptors
//! - [`session`] - sessions with change tracking
//! - [`config`] / [`logging`] - ambient configuration and logging

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod negotiation;
pub mod pipeline;
pub mod render;
pub mod routing;
pub mod session;

// Prelude module for convenient imports
pub mod prelude;

pub use app::App;
pub use error::{Failure, HttpError};

// Main result type for the framework
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for startup and serving
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Route registration or reverse routing failed
    #[error(transparent)]
    Route(#[from] error::RouteError),
    /// Template rendering outside a request
    #[error(transparent)]
    Template(#[from] error::TemplateError),
    #[error(transparent)]
    Status(#[from] error::StatusError),
    /// Raw request could not be parsed
    #[error(transparent)]
    Parse(#[from] http::ParseError),
    /// Configuration loading or validation
    #[error("Configuration error: {0:#}")]
    Config(#[from] anyhow::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Hyper(#[from] hyper::Error),
}
