//! Cookie serialization and parsing

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

/// Attributes written after `name=value` in a Set-Cookie header
///
/// Serialization order is fixed: Domain, Path, Expires, Secure, HttpOnly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self { domain: None, path: Some("/".to_string()), expires: None, secure: false, http_only: false }
    }
}

impl CookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Drop the Path attribute entirely
    pub fn without_path(mut self) -> Self {
        self.path = None;
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }
}

/// Build a Set-Cookie header value
pub fn format_set_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut parts = vec![format!("{}={}", name, value)];

    if let Some(ref domain) = options.domain {
        parts.push(format!("Domain={}", domain));
    }

    if let Some(ref path) = options.path {
        parts.push(format!("Path={}", path));
    }

    if let Some(expires) = options.expires {
        parts.push(format!("Expires={}", format_http_date(expires)));
    }

    if options.secure {
        parts.push("Secure".to_string());
    }

    if options.http_only {
        parts.push("HttpOnly".to_string());
    }

    parts.join("; ")
}

/// A Set-Cookie value that makes the browser drop `name`
pub fn format_clear_cookie(name: &str, options: &CookieOptions) -> String {
    let expired = CookieOptions { expires: Some(epoch()), ..options.clone() };
    format_set_cookie(name, "deleted", &expired)
}

/// Parse a `Cookie` request header into a name to value map
///
/// Values are percent-decoded; pairs without `=` are ignored.
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"');
            let decoded = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some((name.to_string(), decoded))
        })
        .collect()
}

pub fn format_http_date(date: DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_order() {
        let options = CookieOptions::new().with_domain("x.com").with_path("/");
        assert_eq!(format_set_cookie("a", "b", &options), "a=b; Domain=x.com; Path=/");
    }

    #[test]
    fn test_all_fields() {
        let expires = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let options = CookieOptions::new()
            .with_domain("example.com")
            .with_path("/app")
            .with_expires(expires)
            .secure()
            .http_only();

        assert_eq!(
            format_set_cookie("sid", "abc123", &options),
            "sid=abc123; Domain=example.com; Path=/app; Expires=Wed, 02 Jan 2030 03:04:05 GMT; Secure; HttpOnly"
        );
    }

    #[test]
    fn test_default_path() {
        assert_eq!(
            format_set_cookie("simple_cookie", "some_data", &CookieOptions::default()),
            "simple_cookie=some_data; Path=/"
        );
    }

    #[test]
    fn test_clear_cookie() {
        assert_eq!(
            format_clear_cookie("cookie_test", &CookieOptions::default()),
            "cookie_test=deleted; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }

    #[test]
    fn test_parse_cookie_header() {
        let cookies = parse_cookie_header("session_id=abc123; theme=dark; msg=hello%20there; junk");
        assert_eq!(cookies.get("session_id").map(String::as_str), Some("abc123"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(cookies.get("msg").map(String::as_str), Some("hello there"));
        assert_eq!(cookies.len(), 3);
    }
}
