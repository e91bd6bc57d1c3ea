//! Terminal handlers

use std::sync::Arc;

use super::controller::Controller;
use super::RequestContext;
use crate::error::Failure;
use crate::http::Body;
use crate::render::Renderer;

type Callback = dyn Fn(&mut RequestContext<'_>) -> Result<Body, Failure> + Send + Sync;

/// The innermost link of a pipeline
///
/// A handler is a plain callable plus the renderers applied to its return
/// value, in order. Handlers bound to a controller type resolve the
/// controller instance from the app's registry on every call.
///
/// # Example
///
/// ```rust
/// use quill_core::pipeline::Handler;
/// use quill_core::render::Renderer;
///
/// let handler = Handler::new(|_| Ok(serde_json::json!({"ok": true}))).with_renderer(Renderer::Json);
/// assert_eq!(handler.renderers().len(), 1);
/// ```
#[derive(Clone)]
pub struct Handler {
    callback: Arc<Callback>,
    renderers: Vec<Renderer>,
    controller: Option<&'static str>,
}

impl Handler {
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&mut RequestContext<'_>) -> Result<R, Failure> + Send + Sync + 'static,
        R: Into<Body>,
    {
        Self {
            callback: Arc::new(move |cx: &mut RequestContext<'_>| f(cx).map(Into::into)),
            renderers: Vec::new(),
            controller: None,
        }
    }

    /// Bind a controller method
    ///
    /// The controller is built through the app's [`ControllerRegistry`]
    /// the first time the route runs and reused afterwards.
    ///
    /// [`ControllerRegistry`]: super::ControllerRegistry
    pub fn action<C, R>(method: fn(&C, &mut RequestContext<'_>) -> Result<R, Failure>) -> Self
    where
        C: Controller,
        R: Into<Body> + 'static,
    {
        let mut handler = Self::new(move |cx: &mut RequestContext<'_>| {
            let controller = cx.app.controllers().resolve::<C>(cx.app)?;
            method(&controller, cx)
        });
        handler.controller = Some(std::any::type_name::<C>());
        handler
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderers.push(renderer);
        self
    }

    pub fn renderers(&self) -> &[Renderer] {
        &self.renderers
    }

    /// Type name of the controller this handler is bound to
    pub fn controller(&self) -> Option<&'static str> {
        self.controller
    }

    /// Run the callback and its renderers
    pub fn call(&self, cx: &mut RequestContext<'_>) -> Result<Body, Failure> {
        let mut body = (self.callback)(cx)?;
        for renderer in &self.renderers {
            body = renderer.apply(body, cx)?;
        }
        Ok(body)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("renderers", &self.renderers)
            .field("controller", &self.controller)
            .finish()
    }
}
