//! Cookie header parsing

use crate::app::App;
use crate::error::Failure;
use crate::http::constants::headers;
use crate::http::{parse_cookie_header, HttpRequest, HttpResponse};
use crate::pipeline::{Interceptor, MiddlewareFactory, RequestContext};

/// Fills `request.cookies()` from the `Cookie` header
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieParser;

impl MiddlewareFactory for CookieParser {
    fn create(&self, _app: &App, _request: &HttpRequest, _response: &HttpResponse) -> Box<dyn Interceptor> {
        Box::new(CookieParser)
    }
}

impl Interceptor for CookieParser {
    fn enter(&mut self, cx: &mut RequestContext<'_>) -> Result<(), Failure> {
        if let Some(header) = cx.request.header(headers::COOKIE) {
            let cookies = parse_cookie_header(header);
            cx.request.set_cookies(cookies);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RawRequest;
    use crate::middleware::testing::run;
    use crate::pipeline::{middleware, Handler};

    #[test]
    fn test_cookies_are_parsed() {
        let raw = RawRequest::new("GET", "/").with_header("Cookie", "theme=dark; lang=fr");
        let handler = Handler::new(|cx| Ok(cx.request.cookie("theme").unwrap_or("none").to_string()));
        let (request, response, _) = run(vec![middleware(CookieParser)], raw, handler);

        assert_eq!(request.cookie("lang"), Some("fr"));
        assert_eq!(response.body_text().as_deref(), Some("dark"));
    }

    #[test]
    fn test_no_cookie_header() {
        let (request, _, _) = run(vec![middleware(CookieParser)], RawRequest::new("GET", "/"), Handler::new(|_| Ok("")));
        assert!(request.cookies().is_empty());
    }
}
