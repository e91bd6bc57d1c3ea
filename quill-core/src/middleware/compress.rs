//! Response compression

use crate::app::App;
use crate::error::Failure;
use crate::http::constants::headers;
use crate::http::{Body, HttpRequest, HttpResponse};
use crate::pipeline::{Interceptor, MiddlewareFactory, Outcome, RequestContext};
use crate::render::deflate;

/// Deflates response bodies on the way out
///
/// Applies only when the client's Accept-Encoding admits `deflate`, the body
/// has at least `min_bytes` bytes, and no other encoding was set already.
#[derive(Debug, Clone, Copy)]
pub struct Compress {
    min_bytes: usize,
}

impl Default for Compress {
    fn default() -> Self {
        Self { min_bytes: 1 }
    }
}

impl Compress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_bytes(mut self, min_bytes: usize) -> Self {
        self.min_bytes = min_bytes.max(1);
        self
    }
}

impl MiddlewareFactory for Compress {
    fn create(&self, _app: &App, _request: &HttpRequest, _response: &HttpResponse) -> Box<dyn Interceptor> {
        Box::new(*self)
    }
}

impl Interceptor for Compress {
    fn exit(&mut self, cx: &mut RequestContext<'_>, outcome: Outcome) -> Result<(), Failure> {
        if outcome == Outcome::Failed
            || cx.response.header(headers::CONTENT_ENCODING).is_some()
            || !cx.request.accepts_encoding("deflate")
        {
            return Ok(());
        }

        let compressed = {
            let original = cx.response.body_bytes();
            if original.len() < self.min_bytes {
                return Ok(());
            }
            deflate(&original).map_err(anyhow::Error::from)?
        };
        cx.response.set_body(Body::Bytes(compressed));
        cx.response.set_header(headers::CONTENT_ENCODING, "deflate");
        cx.response.append_header(headers::VARY, "Accept-Encoding");
        Ok(())
    }
}
