//! Request body parsers

use crate::app::App;
use crate::error::{Failure, HttpError};
use crate::http::constants::content_types;
use crate::http::{HttpRequest, HttpResponse, QueryString};
use crate::pipeline::{Interceptor, MiddlewareFactory, RequestContext};

/// Parses `application/json` bodies into `request.json()`
///
/// Malformed JSON fails the request with `400 Bad Request`. Other content
/// types and empty bodies are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody;

impl MiddlewareFactory for JsonBody {
    fn create(&self, _app: &App, _request: &HttpRequest, _response: &HttpResponse) -> Box<dyn Interceptor> {
        Box::new(JsonBody)
    }
}

impl Interceptor for JsonBody {
    fn enter(&mut self, cx: &mut RequestContext<'_>) -> Result<(), Failure> {
        if cx.request.body().is_empty() || !cx.request.is_type(content_types::JSON) {
            return Ok(());
        }

        let value = serde_json::from_slice(cx.request.body()).map_err(|err| {
            log::debug!("Rejected JSON body on {}: {}", cx.request.path(), err);
            HttpError::bad_request(format!("invalid JSON body: {}", err))
        })?;
        cx.request.set_json(value);
        Ok(())
    }
}

/// Parses `application/x-www-form-urlencoded` bodies into `request.form()`
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlEncodedBody;

impl MiddlewareFactory for UrlEncodedBody {
    fn create(&self, _app: &App, _request: &HttpRequest, _response: &HttpResponse) -> Box<dyn Interceptor> {
        Box::new(UrlEncodedBody)
    }
}

impl Interceptor for UrlEncodedBody {
    fn enter(&mut self, cx: &mut RequestContext<'_>) -> Result<(), Failure> {
        if !cx.request.is_type(content_types::FORM) {
            return Ok(());
        }

        let body = String::from_utf8_lossy(cx.request.body()).into_owned();
        cx.request.set_form(QueryString::parse(&body));
        Ok(())
    }
}
