//! Error taxonomy
//!
//! Registration-time problems ([`RouteError`]) are fatal at startup. Parsing
//! problems ([`AcceptFormatError`]) are recovered where they happen. Everything
//! raised while a request runs through the pipeline is a [`Failure`], which the
//! application turns into a rendered error response.

use crate::http::Status;

/// Malformed route registration or reverse-routing request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A route was registered without a handler
    #[error("No handler specified for route {0}")]
    MissingHandler(String),
    /// The pattern could not be compiled
    #[error("Invalid route pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    /// A second route tried to claim an existing name
    #[error("Route name already registered: {0}")]
    DuplicateName(String),
    /// Reverse lookup of a name nobody registered
    #[error("No route named {0}")]
    UnknownName(String),
    /// Reverse routing without a value for a required parameter
    #[error("Missing parameter for reverse routing: {0}")]
    MissingParameter(String),
    /// The pattern has parts that cannot be turned back into a path
    #[error("Pattern cannot be reversed: {0}")]
    NotReversible(String),
}

/// A single entry of a negotiation header that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed accept entry {entry:?}: {reason}")]
pub struct AcceptFormatError {
    pub entry: String,
    pub reason: String,
}

impl AcceptFormatError {
    pub fn new(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { entry: entry.into(), reason: reason.into() }
    }
}

/// Template rendering failures
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Could not locate an engine for that extension ({0})")]
    NoEngine(String),
    #[error("Template not found: {0}")]
    NotFound(String),
    #[error("Failed to render {template}: {reason}")]
    Render { template: String, reason: String },
    #[error("I/O error while loading template: {0}")]
    Io(#[from] std::io::Error),
}

/// Status code missing from the code to phrase table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("Unknown HTTP status code: {0}")]
    UnknownCode(u16),
    #[error("Invalid status line: {0:?}")]
    InvalidLine(String),
}

/// User-visible failure carrying a status code
///
/// Raised by handlers and interceptors; rendered through the error handler
/// registered for [`HttpError::status`], or the generic one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: Status,
    pub message: Option<String>,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.status, message),
            None => write!(f, "{}", self.status),
        }
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    pub fn new(status: Status) -> Self {
        Self { status, message: None }
    }

    /// Build from a numeric code; fails for codes outside the status table
    pub fn from_code(code: u16) -> Result<Self, StatusError> {
        Ok(Self::new(Status::from_code(code)?))
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BAD_REQUEST).with_message(message)
    }

    pub fn unauthorized() -> Self {
        Self::new(Status::UNAUTHORIZED)
    }

    pub fn forbidden() -> Self {
        Self::new(Status::FORBIDDEN)
    }

    pub fn not_found() -> Self {
        Self::new(Status::NOT_FOUND)
    }

    pub fn internal() -> Self {
        Self::new(Status::INTERNAL_SERVER_ERROR)
    }
}

/// Control-flow signal that stops the pipeline without failing it
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("render aborted")]
pub struct AbortSignal;

/// Anything a handler or interceptor can raise
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// Stop the chain; the response is sent with whatever was set so far
    #[error(transparent)]
    Abort(#[from] AbortSignal),
    /// Intentional failure rendered by a status-specific error handler
    #[error(transparent)]
    Http(#[from] HttpError),
    /// Failure that also carries a redirect target
    #[error("redirect to {location} ({status})")]
    Redirect { location: String, status: Status },
    /// Anything else; escalated as a 500
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Failure {
    pub fn abort() -> Self {
        Failure::Abort(AbortSignal)
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Failure::Redirect { location: location.into(), status: Status::FOUND }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Failure::Abort(_))
    }

    /// Status the escalation boundary renders this failure with
    pub fn status(&self) -> Status {
        match self {
            Failure::Abort(_) => Status::OK,
            Failure::Http(err) => err.status,
            Failure::Redirect { status, .. } => *status,
            Failure::Internal(_) => Status::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TemplateError> for Failure {
    fn from(err: TemplateError) -> Self {
        Failure::Internal(err.into())
    }
}

impl From<StatusError> for Failure {
    fn from(err: StatusError) -> Self {
        Failure::Internal(err.into())
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::Internal(err.into())
    }
}
