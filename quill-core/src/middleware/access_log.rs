//! Request access logging

use std::time::Instant;

use crate::app::App;
use crate::error::Failure;
use crate::http::{HttpRequest, HttpResponse};
use crate::pipeline::{Interceptor, MiddlewareFactory, Outcome, RequestContext};

/// One `log::info!` line per request: remote, method, path, status, duration
///
/// Install it first so its timing covers every other interceptor. Failed
/// requests are logged as `failed`: their error response is only rendered
/// after the chain has unwound.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl MiddlewareFactory for AccessLog {
    fn create(&self, _app: &App, _request: &HttpRequest, _response: &HttpResponse) -> Box<dyn Interceptor> {
        Box::new(AccessLogFrame { start: Instant::now() })
    }
}

struct AccessLogFrame {
    start: Instant,
}

impl Interceptor for AccessLogFrame {
    fn exit(&mut self, cx: &mut RequestContext<'_>, outcome: Outcome) -> Result<(), Failure> {
        let remote = cx.request.remote_addr().map(|addr| addr.ip().to_string()).unwrap_or_else(|| "-".into());
        let status = status_label(outcome, cx.response);

        log::info!(
            target: "quill::access",
            "{} {} {} {} {}ms",
            remote,
            cx.request.method(),
            cx.request.path(),
            status,
            self.start.elapsed().as_millis()
        );
        Ok(())
    }
}

fn status_label(outcome: Outcome, response: &HttpResponse) -> String {
    match outcome {
        Outcome::Failed => "failed".to_string(),
        Outcome::Completed | Outcome::Aborted => response.status().code().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RawRequest;
    use crate::middleware::testing::run;
    use crate::pipeline::{middleware, Handler, PipelineState};

    #[test]
    fn test_access_log_is_transparent() {
        let (_, response, result) =
            run(vec![middleware(AccessLog)], RawRequest::new("GET", "/"), Handler::new(|_| Ok("body")));
        assert_eq!(result.unwrap(), PipelineState::Completed);
        assert_eq!(response.body_text().as_deref(), Some("body"));
    }

    #[test]
    fn test_failed_requests_log_failed() {
        let mut response = HttpResponse::new();
        assert_eq!(status_label(Outcome::Completed, &response), "200");
        response.set_status_line(crate::http::Status::NOT_MODIFIED);
        assert_eq!(status_label(Outcome::Aborted, &response), "304");
        assert_eq!(status_label(Outcome::Failed, &response), "failed");
    }
}
