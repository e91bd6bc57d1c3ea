//! Built-in error handlers
//!
//! Used for unmatched requests, unclassified failures, and any status code
//! the application did not register its own handler for.

use crate::http::Status;
use crate::pipeline::Handler;
use crate::render::escape_html;

pub const NOT_FOUND_BODY: &str = "<h1>Oops :( - File Not Found</h1>";
pub const INTERNAL_ERROR_BODY: &str = "<h1>Internal Server Error</h1>";

/// 404 page
pub fn not_found_handler() -> Handler {
    Handler::new(|cx| {
        cx.response.set_status_line(Status::NOT_FOUND);
        Ok(NOT_FOUND_BODY)
    })
}

/// 500 page; carries the escaped failure detail when one was attached
pub fn internal_error_handler() -> Handler {
    Handler::new(|cx| {
        cx.response.set_status_line(Status::INTERNAL_SERVER_ERROR);
        let mut body = INTERNAL_ERROR_BODY.to_string();
        if let Some(detail) = cx.request.error().and_then(|error| error.detail.as_deref()) {
            body.push_str(&format!("<pre>{}</pre>", escape_html(detail)));
        }
        Ok(body)
    })
}

/// `<h1>{code} {phrase}</h1>` for the failure being rendered
pub fn generic_handler() -> Handler {
    Handler::new(|cx| {
        let status = cx.request.error().map(|error| error.status).unwrap_or_else(|| cx.response.status());
        cx.response.set_status_line(status);
        Ok(format!("<h1>{}</h1>", status))
    })
}
