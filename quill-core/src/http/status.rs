//! HTTP status codes and their canonical reason phrases

use std::str::FromStr;

use crate::error::StatusError;

/// A status code paired with its reason phrase
///
/// Only codes present in the phrase table can be represented, so a `Status`
/// always renders a complete status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status {
    code: u16,
    phrase: &'static str,
}

impl Status {
    pub const CONTINUE: Status = Status { code: 100, phrase: "Continue" };
    pub const OK: Status = Status { code: 200, phrase: "OK" };
    pub const CREATED: Status = Status { code: 201, phrase: "Created" };
    pub const NO_CONTENT: Status = Status { code: 204, phrase: "No Content" };
    pub const MOVED_PERMANENTLY: Status = Status { code: 301, phrase: "Moved Permanently" };
    pub const FOUND: Status = Status { code: 302, phrase: "Found" };
    pub const SEE_OTHER: Status = Status { code: 303, phrase: "See Other" };
    pub const NOT_MODIFIED: Status = Status { code: 304, phrase: "Not Modified" };
    pub const BAD_REQUEST: Status = Status { code: 400, phrase: "Bad Request" };
    pub const UNAUTHORIZED: Status = Status { code: 401, phrase: "Not Authorized" };
    pub const FORBIDDEN: Status = Status { code: 403, phrase: "Forbidden" };
    pub const NOT_FOUND: Status = Status { code: 404, phrase: "Not Found" };
    pub const METHOD_NOT_ALLOWED: Status = Status { code: 405, phrase: "Method Not Allowed" };
    pub const PAYLOAD_TOO_LARGE: Status =
        Status { code: 413, phrase: "Request Entity Too Large" };
    pub const INTERNAL_SERVER_ERROR: Status =
        Status { code: 500, phrase: "Internal Server Error" };
    pub const SERVICE_UNAVAILABLE: Status = Status { code: 503, phrase: "Service Unavailable" };

    /// Look a code up in the phrase table
    pub fn from_code(code: u16) -> Result<Self, StatusError> {
        reason_phrase(code)
            .map(|phrase| Status { code, phrase })
            .ok_or(StatusError::UnknownCode(code))
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn phrase(&self) -> &'static str {
        self.phrase
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.code)
    }

    pub fn is_error(&self) -> bool {
        self.code >= 400
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::OK
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.phrase)
    }
}

/// Accepts either a bare code (`"404"`) or a full status line
/// (`"500 Internal Server Error"`). The phrase always comes from the table.
impl FromStr for Status {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .split_whitespace()
            .next()
            .and_then(|c| c.parse::<u16>().ok())
            .ok_or_else(|| StatusError::InvalidLine(s.to_string()))?;
        Status::from_code(code)
    }
}

impl TryFrom<u16> for Status {
    type Error = StatusError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Status::from_code(code)
    }
}

fn reason_phrase(code: u16) -> Option<&'static str> {
    let phrase = match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Not Authorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => return None,
    };
    Some(phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(Status::OK.to_string(), "200 OK");
        assert_eq!(Status::NOT_FOUND.to_string(), "404 Not Found");
        assert_eq!(Status::UNAUTHORIZED.phrase(), "Not Authorized");
    }

    #[test]
    fn test_status_from_code() {
        let status = Status::from_code(418).unwrap();
        assert_eq!(status.phrase(), "I'm a teapot");
        assert_eq!(Status::from_code(299), Err(StatusError::UnknownCode(299)));
    }

    #[test]
    fn test_status_from_line() {
        let status: Status = "500 Internal Server Error".parse().unwrap();
        assert_eq!(status, Status::INTERNAL_SERVER_ERROR);

        let status: Status = "404".parse().unwrap();
        assert_eq!(status.code(), 404);

        assert!("teapot".parse::<Status>().is_err());
    }

    #[test]
    fn test_constants_agree_with_table() {
        for status in [
            Status::OK,
            Status::FOUND,
            Status::UNAUTHORIZED,
            Status::NOT_FOUND,
            Status::PAYLOAD_TOO_LARGE,
            Status::INTERNAL_SERVER_ERROR,
        ] {
            assert_eq!(Status::from_code(status.code()).unwrap(), status);
        }
    }
}
