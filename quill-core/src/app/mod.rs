//! The quill application
//!
//! An [`App`] owns everything a request needs: the route table, the global
//! middleware, the template engines, the error handlers and the controller
//! registry. It is built mutably at startup and shared read-only once the
//! server runs.
//!
//! # Example
//!
//! ```no_run
//! use quill_core::app::App;
//! use quill_core::pipeline::Handler;
//!
//! # async fn example() -> quill_core::Result<()> {
//! let mut app = App::new();
//! app.get("/hello/:name", Handler::new(|cx| {
//!     Ok(format!("Hello {}", cx.param("name").unwrap_or("stranger")))
//! }))?;
//!
//! app.listen().await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
mod escalation;

pub use escalation::ErrorDetail;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::{Environment, QuillConfig};
use crate::error::{RouteError, TemplateError};
use crate::http::{HttpResponse, RawRequest, ResponseHeaders, Server};
use crate::middleware::DefaultHeaders;
use crate::pipeline::{middleware, Controller, ControllerRegistry, Handler, Middleware, Pipeline, RequestContext};
use crate::render::{PlaceholderEngine, TemplateEngine};
use crate::routing::{PathParams, PatternSource, Route, RouteMatch, RouteSpec, RouteTable, Verb};

/// A web application: routes, middleware, engines and settings
pub struct App {
    routes: RouteTable,
    middleware: Vec<Middleware>,
    engines: HashMap<String, Arc<dyn TemplateEngine>>,
    config: QuillConfig,
    settings: HashMap<String, Value>,
    error_handlers: HashMap<u16, Handler>,
    controllers: ControllerRegistry,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// App with the default configuration
    pub fn new() -> Self {
        Self::with_config(QuillConfig::default())
    }

    /// App configured from `quill.toml` and `QUILL_*` variables
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::with_config(QuillConfig::load()?))
    }

    /// App with an explicit configuration
    ///
    /// The configured default headers seed every response, and a
    /// [`PlaceholderEngine`] reading from the views directory serves the
    /// default view extension until another engine is registered for it.
    pub fn with_config(config: QuillConfig) -> Self {
        let mut routes = RouteTable::new();
        routes.set_default_headers(
            config.app.default_headers.iter().map(|(name, value)| (name, value.as_str())).collect::<ResponseHeaders>(),
        );

        let mut engines: HashMap<String, Arc<dyn TemplateEngine>> = HashMap::new();
        engines.insert(
            config.app.view_engine.clone(),
            Arc::new(PlaceholderEngine::from_dir(&config.app.views)),
        );

        Self {
            routes,
            middleware: vec![middleware(DefaultHeaders::new())],
            engines,
            config,
            settings: HashMap::new(),
            error_handlers: HashMap::new(),
            controllers: ControllerRegistry::new(),
        }
    }

    pub fn config(&self) -> &QuillConfig {
        &self.config
    }

    pub fn is_development(&self) -> bool {
        self.config.app.is_development()
    }

    /// Run `setup` only when the app runs in `env`
    pub fn configure(&mut self, env: Environment, setup: impl FnOnce(&mut App)) {
        if self.config.app.env == env {
            setup(self);
        }
    }

    // Routes

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut RouteTable {
        &mut self.routes
    }

    /// Register a fully described route
    pub fn route(&mut self, verb: Verb, spec: RouteSpec) -> Result<Arc<Route>, RouteError> {
        self.routes.register(verb, spec)
    }

    pub fn get(&mut self, pattern: impl Into<PatternSource>, handler: Handler) -> Result<Arc<Route>, RouteError> {
        self.route(Verb::Get, RouteSpec::new(pattern).handler(handler))
    }

    pub fn post(&mut self, pattern: impl Into<PatternSource>, handler: Handler) -> Result<Arc<Route>, RouteError> {
        self.route(Verb::Post, RouteSpec::new(pattern).handler(handler))
    }

    pub fn put(&mut self, pattern: impl Into<PatternSource>, handler: Handler) -> Result<Arc<Route>, RouteError> {
        self.route(Verb::Put, RouteSpec::new(pattern).handler(handler))
    }

    pub fn delete(&mut self, pattern: impl Into<PatternSource>, handler: Handler) -> Result<Arc<Route>, RouteError> {
        self.route(Verb::Delete, RouteSpec::new(pattern).handler(handler))
    }

    /// Route for any method, tried after the method-specific ones
    pub fn all(&mut self, pattern: impl Into<PatternSource>, handler: Handler) -> Result<Arc<Route>, RouteError> {
        self.route(Verb::All, RouteSpec::new(pattern).handler(handler))
    }

    /// Reverse-route a named route
    pub fn url_for(&self, name: &str, params: &PathParams) -> Result<String, RouteError> {
        self.routes.url_for(name, params)
    }

    // Middleware and handlers

    /// Append an app-wide interceptor; the first one registered is the outermost
    pub fn use_middleware(&mut self, middleware: Middleware) {
        self.middleware.push(middleware);
    }

    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    /// Handler rendering failures with status `code`
    ///
    /// Overriding 404 also replaces the handler for unmatched requests, and
    /// overriding 500 the one for unclassified failures.
    pub fn error_handler(&mut self, code: u16, handler: Handler) {
        match code {
            404 => self.routes.set_not_found(handler.clone()),
            500 => self.routes.set_internal_error(handler.clone()),
            _ => {}
        }
        self.error_handlers.insert(code, handler);
    }

    /// Handler for failures with status `code`, falling back to the built-ins
    pub fn error_handler_for(&self, code: u16) -> Handler {
        if let Some(handler) = self.error_handlers.get(&code) {
            return handler.clone();
        }
        match code {
            404 => self.routes.not_found_route().handler().clone(),
            500 => self.routes.internal_error_route().handler().clone(),
            _ => errors::generic_handler(),
        }
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Construct `C` with `factory` instead of [`Controller::create`]
    pub fn controller<C, F>(&mut self, factory: F)
    where
        C: Controller,
        F: Fn(&App) -> C + Send + Sync + 'static,
    {
        self.controllers.register::<C, F>(factory);
    }

    // Rendering

    /// Register the template engine for a file extension
    pub fn engine(&mut self, extension: &str, engine: Arc<dyn TemplateEngine>) {
        self.engines.insert(extension.trim_start_matches('.').to_string(), engine);
    }

    /// Render a template with the engine registered for its extension
    ///
    /// Names without an extension get the configured view extension.
    ///
    /// # Errors
    ///
    /// [`TemplateError::NoEngine`] when no engine serves the extension, or
    /// whatever the engine reports.
    pub fn render(&self, template: &str, data: &Value) -> Result<String, TemplateError> {
        let (name, extension) = match Path::new(template).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => (template.to_string(), ext.to_string()),
            None => {
                let ext = self.config.app.view_engine.clone();
                (format!("{}.{}", template, ext), ext)
            }
        };

        let engine = self.engines.get(&extension).ok_or(TemplateError::NoEngine(extension))?;
        engine.render(&name, data)
    }

    // Settings

    /// Store an application setting
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), serde_json::Error> {
        self.settings.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    // Dispatch

    /// Run one request through routing, the pipeline and error escalation
    ///
    /// Always yields a finalized response; failures never reach the caller.
    pub fn handle(&self, raw: RawRequest) -> HttpResponse {
        let RouteMatch { mut request, mut response, route } = self.routes.match_request(raw);

        let chain: Vec<Middleware> = self.middleware.iter().chain(route.middleware()).cloned().collect();
        let mut pipeline = Pipeline::new(chain, route.handler().clone());
        let result = {
            let mut cx = RequestContext::new(self, &mut request, &mut response);
            pipeline.run(&mut cx)
        };

        let mut response = match result {
            Ok(_) => response,
            Err(failure) => escalation::escalate(self, &mut request, response, failure),
        };
        response.finalize();
        response
    }

    /// Freeze the app for serving, applying priority sorting if configured
    pub fn into_shared(mut self) -> Arc<App> {
        if self.config.app.sort_routes {
            self.routes.sort_by_priority();
        }
        Arc::new(self)
    }

    /// Serve on the configured address until the process stops
    pub async fn listen(self) -> crate::Result<()> {
        Server::new(self).run().await
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut engines: Vec<&String> = self.engines.keys().collect();
        engines.sort();
        f.debug_struct("App")
            .field("routes", &self.routes.len())
            .field("middleware", &self.middleware.len())
            .field("engines", &engines)
            .field("env", &self.config.app.env)
            .finish()
    }
}
