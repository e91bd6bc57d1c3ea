//! Turning pipeline failures into error responses

use super::errors::INTERNAL_ERROR_BODY;
use super::App;
use crate::error::Failure;
use crate::http::constants::headers;
use crate::http::{HttpRequest, HttpResponse, Status};
use crate::pipeline::{Pipeline, RequestContext};

/// The failure an error handler is rendering, visible through
/// [`HttpRequest::error`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub status: Status,
    /// Message carried by an `HttpError`
    pub message: Option<String>,
    /// Full error text; only attached in development
    pub detail: Option<String>,
}

impl ErrorDetail {
    pub fn new(status: Status) -> Self {
        Self { status, message: None, detail: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Render `failure` through the error handler for its status
///
/// The handler runs with no middleware on a fresh response carrying the
/// default headers and any `Set-Cookie` lines already written. If that run
/// fails too, a bare 500 is returned.
pub(crate) fn escalate(
    app: &App,
    request: &mut HttpRequest,
    response: HttpResponse,
    failure: Failure,
) -> HttpResponse {
    let mut fresh = app.routes().new_response();
    let status = failure.status();

    // Exits such as the session save may already have set cookies
    for cookie in response.headers().get_all(headers::SET_COOKIE) {
        fresh.append_header(headers::SET_COOKIE, cookie);
    }

    let detail = match failure {
        Failure::Abort(_) => return response,
        Failure::Http(err) => {
            log::debug!("{} {} failed with {}", request.method(), request.path(), err);
            let detail = ErrorDetail::new(err.status);
            match err.message {
                Some(message) => detail.with_message(message),
                None => detail,
            }
        }
        Failure::Redirect { location, status } => {
            fresh.set_header(headers::LOCATION, location);
            ErrorDetail::new(status)
        }
        Failure::Internal(err) => {
            log::error!("Unhandled error on {} {}: {:?}", request.method(), request.path(), err);
            let detail = ErrorDetail::new(Status::INTERNAL_SERVER_ERROR);
            if app.is_development() {
                detail.with_detail(format!("{:#}", err))
            } else {
                detail
            }
        }
    };

    fresh.set_status_line(status);
    request.set_error(detail);

    let mut pipeline = Pipeline::new(Vec::new(), app.error_handler_for(status.code()));
    let result = {
        let mut cx = RequestContext::new(app, request, &mut fresh);
        pipeline.run(&mut cx)
    };

    match result {
        Ok(_) => fresh,
        Err(err) => {
            log::error!("Error handler for {} failed: {}", status, err);
            let mut fallback = HttpResponse::new();
            fallback.set_status_line(Status::INTERNAL_SERVER_ERROR);
            fallback.set_body(INTERNAL_ERROR_BODY);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, QuillConfig};
    use crate::error::HttpError;
    use crate::http::RawRequest;

    fn escalate_with(app: &App, failure: Failure) -> (HttpRequest, HttpResponse) {
        let mut request = HttpRequest::new(RawRequest::new("GET", "/x"), Default::default());
        let response = escalate(app, &mut request, HttpResponse::new(), failure);
        (request, response)
    }

    #[test]
    fn test_http_error_uses_generic_handler() {
        let app = App::new();
        let (request, response) = escalate_with(&app, HttpError::bad_request("no name").into());

        assert_eq!(response.status(), Status::BAD_REQUEST);
        assert_eq!(response.body_text().as_deref(), Some("<h1>400 Bad Request</h1>"));
        assert_eq!(request.error().and_then(|e| e.message.as_deref()), Some("no name"));
    }

    #[test]
    fn test_redirect_sets_location() {
        let app = App::new();
        let (_, response) = escalate_with(&app, Failure::redirect("/login"));
        assert_eq!(response.status(), Status::FOUND);
        assert_eq!(response.header("Location"), Some("/login"));
    }

    #[test]
    fn test_internal_detail_only_in_development() {
        let app = App::new();
        let (_, response) = escalate_with(&app, anyhow::anyhow!("db <down>").into());
        assert_eq!(response.status(), Status::INTERNAL_SERVER_ERROR);
        assert!(response.body_text().unwrap().contains("<pre>db &lt;down&gt;</pre>"));

        let chained = anyhow::anyhow!("db <down>").context("loading user");
        let (request, response) = escalate_with(&app, chained.into());
        assert!(response.body_text().unwrap().contains("<pre>loading user: db &lt;down&gt;</pre>"));
        assert_eq!(request.error().unwrap().detail.as_deref(), Some("loading user: db <down>"));

        let app = App::with_config(QuillConfig::default().with_env(Environment::Production));
        let (request, response) = escalate_with(&app, anyhow::anyhow!("db <down>").into());
        assert_eq!(response.body_text().as_deref(), Some(INTERNAL_ERROR_BODY));
        assert!(request.error().unwrap().detail.is_none());
    }

    #[test]
    fn test_cookies_survive_escalation() {
        let app = App::new();
        let mut request = HttpRequest::new(RawRequest::new("GET", "/x"), Default::default());
        let mut response = HttpResponse::new();
        response.set_cookie("sid", "abc", &crate::http::CookieOptions::default());
        response.set_header("X-Stale", "1");

        let response = escalate(&app, &mut request, response, anyhow::anyhow!("boom").into());
        assert_eq!(response.status(), Status::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get_all("Set-Cookie").len(), 1);
        assert!(response.header("Set-Cookie").unwrap().starts_with("sid=abc"));
        assert!(response.header("X-Stale").is_none());
    }

    #[test]
    fn test_failing_error_handler_falls_back() {
        let mut app = App::new();
        app.error_handler(
            418,
            crate::pipeline::Handler::new(|_| -> Result<&'static str, Failure> { Err(anyhow::anyhow!("worse").into()) }),
        );
        let (_, response) = escalate_with(&app, HttpError::from_code(418).unwrap().into());
        assert_eq!(response.status(), Status::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body_text().as_deref(), Some(INTERNAL_ERROR_BODY));
    }
}
