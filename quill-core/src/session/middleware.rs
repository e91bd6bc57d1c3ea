//! Session interceptor

use std::sync::Arc;

use chrono::Duration;

use super::store::{Session, SessionStore};
use crate::app::App;
use crate::error::Failure;
use crate::http::{parse_cookie_header, CookieOptions, HttpRequest, HttpResponse};
use crate::pipeline::{Interceptor, MiddlewareFactory, Outcome, RequestContext};

/// Default session cookie name
pub const SESSION_COOKIE: &str = "session_id";

/// Loads the session named by the request's cookie and saves it afterwards
///
/// A request without a valid session cookie gets a fresh session. On the way
/// out the session is written back only if it was modified; a new session
/// that was written also gets its cookie.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use quill_core::app::App;
/// use quill_core::pipeline::middleware;
/// use quill_core::session::{MemorySessionStore, SessionMiddleware};
///
/// let mut app = App::new();
/// app.use_middleware(middleware(SessionMiddleware::new(Arc::new(MemorySessionStore::new()))));
/// ```
#[derive(Clone)]
pub struct SessionMiddleware {
    store: Arc<dyn SessionStore>,
    cookie_name: String,
    max_age: Duration,
    cookie_options: CookieOptions,
}

impl SessionMiddleware {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            cookie_name: SESSION_COOKIE.to_string(),
            max_age: Duration::days(1),
            cookie_options: CookieOptions::new().http_only(),
        }
    }

    pub fn with_cookie_name(mut self, name: &str) -> Self {
        self.cookie_name = name.to_string();
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_cookie_options(mut self, options: CookieOptions) -> Self {
        self.cookie_options = options;
        self
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }
}

impl MiddlewareFactory for SessionMiddleware {
    fn create(&self, _app: &App, _request: &HttpRequest, _response: &HttpResponse) -> Box<dyn Interceptor> {
        Box::new(SessionFrame { config: self.clone() })
    }
}

struct SessionFrame {
    config: SessionMiddleware,
}

impl SessionFrame {
    /// Session id from the parsed cookies, or straight from the header
    fn session_id(&self, request: &HttpRequest) -> Option<String> {
        let name = &self.config.cookie_name;
        request.cookie(name).map(str::to_string).or_else(|| {
            request
                .header("cookie")
                .and_then(|header| parse_cookie_header(header).remove(name))
        })
    }

    fn load(&self, id: &str) -> anyhow::Result<Option<Session>> {
        match self.config.store.get(id)? {
            Some(session) if session.is_expired() => {
                log::debug!("Session {} expired", id);
                self.config.store.delete(id)?;
                Ok(None)
            }
            Some(mut session) => {
                session.is_new = false;
                session.data.mark_clean();
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }
}

impl Interceptor for SessionFrame {
    fn enter(&mut self, cx: &mut RequestContext<'_>) -> Result<(), Failure> {
        let existing = match self.session_id(cx.request) {
            Some(id) => self.load(&id)?,
            None => None,
        };

        let session = existing.unwrap_or_else(|| {
            Session::new(uuid::Uuid::new_v4().to_string(), self.config.max_age)
        });
        cx.request.set_session(session);
        Ok(())
    }

    fn exit(&mut self, cx: &mut RequestContext<'_>, _outcome: Outcome) -> Result<(), Failure> {
        let Some(session) = cx.request.session() else {
            return Ok(());
        };
        if !session.is_dirty() {
            return Ok(());
        }

        let mut stored = session.clone();
        stored.is_new = false;
        stored.data.mark_clean();
        let (id, expires_at, is_new) = (stored.id.clone(), stored.expires_at, session.is_new);
        self.config.store.set(stored)?;

        if is_new {
            let options = self.config.cookie_options.clone().with_expires(expires_at);
            cx.response.set_cookie(&self.config.cookie_name, &id, &options);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RawRequest;
    use crate::pipeline::{Handler, Pipeline};
    use crate::session::MemorySessionStore;

    fn run(store: &MemorySessionStore, raw: RawRequest, handler: Handler) -> (HttpRequest, HttpResponse) {
        let app = App::new();
        let mut request = HttpRequest::new(raw, Default::default());
        let mut response = HttpResponse::new();
        let factory: crate::pipeline::Middleware =
            Arc::new(SessionMiddleware::new(Arc::new(store.clone())));
        {
            let mut cx = RequestContext::new(&app, &mut request, &mut response);
            Pipeline::new(vec![factory], handler).run(&mut cx).unwrap();
        }
        (request, response)
    }

    #[test]
    fn test_untouched_session_is_not_saved() {
        let store = MemorySessionStore::new();
        let (request, response) = run(&store, RawRequest::new("GET", "/"), Handler::new(|_| Ok("hi")));

        assert!(request.session().unwrap().is_new);
        assert_eq!(store.count().unwrap(), 0);
        assert!(response.header("set-cookie").is_none());
    }

    #[test]
    fn test_new_dirty_session_is_saved_with_cookie() {
        let store = MemorySessionStore::new();
        let handler = Handler::new(|cx| {
            if let Some(session) = cx.request.session_mut() {
                session.set("user", "ada")?;
            }
            Ok("hi")
        });
        let (request, response) = run(&store, RawRequest::new("GET", "/"), handler);

        let id = request.session().unwrap().id.clone();
        let cookie = response.header("set-cookie").unwrap();
        assert!(cookie.starts_with(&format!("session_id={}", id)));
        assert!(cookie.contains("HttpOnly"));

        let saved = store.get(&id).unwrap().unwrap();
        assert_eq!(saved.get::<String>("user").as_deref(), Some("ada"));
        assert!(!saved.is_new);
    }

    #[test]
    fn test_existing_session_is_loaded() {
        let store = MemorySessionStore::new();
        let mut session = Session::new("known", Duration::hours(1));
        session.set("visits", 1).unwrap();
        store.set(session).unwrap();

        let handler = Handler::new(|cx| {
            let visits: i64 = cx.request.session().and_then(|s| s.get("visits")).unwrap_or(0);
            if let Some(session) = cx.request.session_mut() {
                session.set("visits", visits + 1)?;
            }
            Ok(visits.to_string())
        });
        let raw = RawRequest::new("GET", "/").with_header("Cookie", "session_id=known; theme=dark");
        let (request, response) = run(&store, raw, handler);

        assert!(!request.session().unwrap().is_new);
        assert!(response.header("set-cookie").is_none());
        assert_eq!(store.get("known").unwrap().unwrap().get::<i64>("visits"), Some(2));
    }

    #[test]
    fn test_expired_session_is_replaced() {
        let store = MemorySessionStore::new();
        store.set(Session::new("stale", Duration::seconds(-1))).unwrap();

        let raw = RawRequest::new("GET", "/").with_header("Cookie", "session_id=stale");
        let (request, _) = run(&store, raw, Handler::new(|_| Ok("hi")));

        assert_ne!(request.session().unwrap().id, "stale");
        assert!(!store.exists("stale").unwrap());
    }
}
