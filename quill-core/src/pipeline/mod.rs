//! Middleware pipeline
//!
//! Each matched request runs through a [`Pipeline`]: the app-wide
//! interceptors, then the route's own, then the route's [`Handler`].
//! Interceptors are created per request by a [`MiddlewareFactory`] and see the
//! request and response through a [`RequestContext`].
//!
//! # Example
//!
//! ```rust
//! use quill_core::app::App;
//! use quill_core::error::Failure;
//! use quill_core::http::{HttpRequest, HttpResponse};
//! use quill_core::pipeline::{middleware, Handler, Interceptor, Outcome, RequestContext};
//!
//! struct PoweredBy;
//!
//! impl Interceptor for PoweredBy {
//!     fn exit(&mut self, cx: &mut RequestContext<'_>, _outcome: Outcome) -> Result<(), Failure> {
//!         cx.response.set_header("X-Powered-By", "quill");
//!         Ok(())
//!     }
//! }
//!
//! let mut app = App::new();
//! app.use_middleware(middleware(|_: &App, _: &HttpRequest, _: &HttpResponse| {
//!     Box::new(PoweredBy) as Box<dyn Interceptor>
//! }));
//! app.get("/", Handler::new(|_| Ok("hello"))).unwrap();
//! ```

pub mod chain;
pub mod controller;
pub mod handler;
pub mod interceptor;

pub use chain::{Pipeline, PipelineState};
pub use controller::{Controller, ControllerRegistry};
pub use handler::Handler;
pub use interceptor::{middleware, Interceptor, Middleware, MiddlewareFactory, Outcome};

use crate::app::App;
use crate::error::{Failure, TemplateError};
use crate::http::{HttpRequest, HttpResponse};
use crate::routing::PathParams;

/// What a handler or interceptor gets to work with for one request
pub struct RequestContext<'a> {
    pub app: &'a App,
    pub request: &'a mut HttpRequest,
    pub response: &'a mut HttpResponse,
}

impl<'a> RequestContext<'a> {
    pub fn new(app: &'a App, request: &'a mut HttpRequest, response: &'a mut HttpResponse) -> Self {
        Self { app, request, response }
    }

    /// Route parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.request.param(name)
    }

    /// Render a template through the app's engines
    pub fn render(&self, template: &str, data: &serde_json::Value) -> Result<String, TemplateError> {
        self.app.render(template, data)
    }

    /// Reverse-route a named route
    pub fn url_for(&self, name: &str, params: &PathParams) -> Result<String, Failure> {
        self.app.url_for(name, params).map_err(|err| Failure::Internal(err.into()))
    }

    /// Send a 302 to `location` and stop the chain
    pub fn redirect(&mut self, location: &str) -> Failure {
        self.response.redirect_to(location);
        Failure::abort()
    }
}
