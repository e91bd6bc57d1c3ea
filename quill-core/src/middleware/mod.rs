//! Built-in interceptors
//!
//! Every type here is a [`MiddlewareFactory`](crate::pipeline::MiddlewareFactory)
//! and can be installed app-wide with `App::use_middleware` or on a single
//! route through `RouteSpec::middleware`.
//!
//! | Middleware          | Phase   | Effect                                            |
//! |---------------------|---------|---------------------------------------------------|
//! | [`CookieParser`]    | enter   | `Cookie` header into `request.cookies()`          |
//! | [`JsonBody`]        | enter   | JSON bodies into `request.json()`, 400 if invalid |
//! | [`UrlEncodedBody`]  | enter   | form bodies into `request.form()`                 |
//! | [`Compress`]        | exit    | deflates the body when the client accepts it      |
//! | [`DefaultHeaders`]  | both    | extra headers and `Connection` handling           |
//! | [`AccessLog`]       | both    | one `log::info!` line per request                 |
//!
//! Sessions live in [`crate::session::SessionMiddleware`].
//!
//! # Example
//!
//! ```rust
//! use quill_core::app::App;
//! use quill_core::middleware::{AccessLog, CookieParser, JsonBody};
//! use quill_core::pipeline::middleware;
//!
//! let mut app = App::new();
//! app.use_middleware(middleware(AccessLog));
//! app.use_middleware(middleware(CookieParser));
//! app.use_middleware(middleware(JsonBody));
//! ```

mod access_log;
mod body;
mod compress;
mod cookies;
mod headers;

pub use access_log::AccessLog;
pub use body::{JsonBody, UrlEncodedBody};
pub use compress::Compress;
pub use cookies::CookieParser;
pub use headers::DefaultHeaders;

#[cfg(test)]
pub(crate) mod testing {
    use crate::app::App;
    use crate::error::Failure;
    use crate::http::{HttpRequest, HttpResponse, RawRequest};
    use crate::pipeline::{Handler, Middleware, Pipeline, PipelineState, RequestContext};

    /// Run one pipeline of `middleware` around `handler` outside of routing
    pub fn run(
        middleware: Vec<Middleware>,
        raw: RawRequest,
        handler: Handler,
    ) -> (HttpRequest, HttpResponse, Result<PipelineState, Failure>) {
        let app = App::new();
        let mut request = HttpRequest::new(raw, Default::default());
        let mut response = HttpResponse::new();
        let result = {
            let mut cx = RequestContext::new(&app, &mut request, &mut response);
            Pipeline::new(middleware, handler).run(&mut cx)
        };
        (request, response, result)
    }
}
