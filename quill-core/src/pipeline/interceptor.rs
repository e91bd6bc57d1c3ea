//! Interceptors and the factories that create them per request

use std::sync::Arc;

use super::RequestContext;
use crate::app::App;
use crate::error::Failure;
use crate::http::{HttpRequest, HttpResponse};

/// How the inward part of the chain ended, as seen by `exit()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler ran and returned normally
    Completed,
    /// An inner `enter()` or the handler raised the abort signal
    Aborted,
    /// An inner link failed; the error escalates after every `exit()` ran
    Failed,
}

/// One middleware frame, bound to a single request
///
/// `enter()` runs outermost first. `exit()` runs innermost first, and only
/// for frames whose `enter()` returned `Ok`.
pub trait Interceptor {
    fn enter(&mut self, _cx: &mut RequestContext<'_>) -> Result<(), Failure> {
        Ok(())
    }

    fn exit(&mut self, _cx: &mut RequestContext<'_>, _outcome: Outcome) -> Result<(), Failure> {
        Ok(())
    }
}

/// Creates a fresh [`Interceptor`] for every request
pub trait MiddlewareFactory: Send + Sync {
    fn create(&self, app: &App, request: &HttpRequest, response: &HttpResponse)
        -> Box<dyn Interceptor>;

    /// Name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> MiddlewareFactory for F
where
    F: Fn(&App, &HttpRequest, &HttpResponse) -> Box<dyn Interceptor> + Send + Sync,
{
    fn create(
        &self,
        app: &App,
        request: &HttpRequest,
        response: &HttpResponse,
    ) -> Box<dyn Interceptor> {
        self(app, request, response)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}

/// Shared handle to a factory, as stored on routes and the app
pub type Middleware = Arc<dyn MiddlewareFactory>;

/// Wrap a factory into a [`Middleware`]
pub fn middleware<M: MiddlewareFactory + 'static>(factory: M) -> Middleware {
    Arc::new(factory)
}
