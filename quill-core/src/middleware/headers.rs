//! Default response headers and connection handling

use crate::app::App;
use crate::error::Failure;
use crate::http::constants::headers;
use crate::http::{HttpRequest, HttpResponse, ResponseHeaders};
use crate::pipeline::{Interceptor, MiddlewareFactory, Outcome, RequestContext};

/// Adds headers every response should carry and mirrors the client's
/// `Connection` preference
///
/// Headers a handler already set are kept. A request asking for
/// `Connection: close` gets `Connection: close` back; one asking for
/// `keep-alive` gets `keep-alive`. Installed on every `App` by default.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeaders {
    headers: ResponseHeaders,
}

impl DefaultHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }
}

impl MiddlewareFactory for DefaultHeaders {
    fn create(&self, _app: &App, request: &HttpRequest, _response: &HttpResponse) -> Box<dyn Interceptor> {
        let connection = request
            .header(headers::CONNECTION)
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| value == "close" || value == "keep-alive");

        Box::new(DefaultHeadersFrame { headers: self.headers.clone(), connection })
    }
}

struct DefaultHeadersFrame {
    headers: ResponseHeaders,
    connection: Option<String>,
}

impl Interceptor for DefaultHeadersFrame {
    fn exit(&mut self, cx: &mut RequestContext<'_>, _outcome: Outcome) -> Result<(), Failure> {
        for (name, value) in self.headers.iter() {
            if !cx.response.headers().contains(name) {
                cx.response.set_header(name, value);
            }
        }

        if let Some(connection) = self.connection.take() {
            cx.response.set_header(headers::CONNECTION, connection);
        }
        Ok(())
    }
}
