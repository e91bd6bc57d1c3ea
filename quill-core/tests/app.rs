//! End-to-end behaviour of `App::handle`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quill_core::app::App;
use quill_core::config::{Environment, QuillConfig};
use quill_core::error::Failure;
use quill_core::http::{RawRequest, Status};
use quill_core::middleware::{CookieParser, JsonBody};
use quill_core::pipeline::{middleware, Controller, Handler, RequestContext};
use quill_core::render::{PlaceholderEngine, Renderer};
use quill_core::routing::{PathParams, RouteSpec, Verb};
use quill_core::session::{MemorySessionStore, SessionMiddleware, SessionStore};

static BUILT: AtomicUsize = AtomicUsize::new(0);

struct Greeter {
    greeting: String,
}

impl Controller for Greeter {
    fn create(app: &App) -> Self {
        BUILT.fetch_add(1, Ordering::SeqCst);
        let greeting = app
            .setting("greeting")
            .and_then(|v| v.as_str())
            .unwrap_or("Hello")
            .to_string();
        Greeter { greeting }
    }
}

impl Greeter {
    fn hello(&self, cx: &mut RequestContext<'_>) -> Result<String, Failure> {
        Ok(format!("{} {}", self.greeting, cx.param("name").unwrap_or("you")))
    }
}

#[test]
fn controller_is_built_once_and_reused() {
    let mut app = App::new();
    app.set("greeting", "Bonjour").unwrap();
    app.get("/hi/:name", Handler::action(Greeter::hello)).unwrap();

    let before = BUILT.load(Ordering::SeqCst);
    for name in ["ada", "alan"] {
        let response = app.handle(RawRequest::new("GET", &format!("/hi/{}", name)));
        assert_eq!(response.body_text().unwrap(), format!("Bonjour {}", name));
    }
    assert_eq!(BUILT.load(Ordering::SeqCst) - before, 1);
    assert_eq!(app.controllers().len(), 1);
}

#[test]
fn template_rendering_with_views() {
    let mut app = App::new();
    app.engine(
        "html",
        Arc::new(PlaceholderEngine::new().with_template("post.html", "<h1>{{title}}</h1><p>{{body}}</p>")),
    );
    app.get(
        "/post",
        Handler::new(|_| Ok(serde_json::json!({"title": "Hi", "body": "<b>bold</b>"})))
            .with_renderer(Renderer::template("post")),
    )
    .unwrap();

    let response = app.handle(RawRequest::new("GET", "/post"));
    assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));
    assert_eq!(
        response.body_text().as_deref(),
        Some("<h1>Hi</h1><p>&lt;b&gt;bold&lt;/b&gt;</p>")
    );
}

#[test]
fn missing_template_engine_is_500() {
    let mut app = App::with_config(QuillConfig::default().with_env(Environment::Production));
    app.get("/", Handler::new(|_| Ok("x")).with_renderer(Renderer::template("index.hbs"))).unwrap();

    let response = app.handle(RawRequest::new("GET", "/"));
    assert_eq!(response.status(), Status::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_text().as_deref(), Some("<h1>Internal Server Error</h1>"));
}

#[test]
fn json_body_round_trip() {
    let mut app = App::new();
    app.use_middleware(middleware(JsonBody));
    app.post(
        "/echo",
        Handler::new(|cx| Ok(cx.request.json().cloned().unwrap_or_default())),
    )
    .unwrap();

    let raw = RawRequest::new("POST", "/echo")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"n":1}"#);
    let response = app.handle(raw);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(response.body_text().as_deref(), Some(r#"{"n":1}"#));

    let raw = RawRequest::new("POST", "/echo").with_header("Content-Type", "application/json").with_body("{");
    assert_eq!(app.handle(raw).status(), Status::BAD_REQUEST);
}

#[test]
fn session_survives_between_requests() {
    let store = MemorySessionStore::new();
    let mut app = App::new();
    app.use_middleware(middleware(CookieParser));
    app.use_middleware(middleware(SessionMiddleware::new(Arc::new(store.clone()))));
    app.get(
        "/count",
        Handler::new(|cx| {
            let session = cx.request.session_mut().ok_or_else(|| anyhow::anyhow!("no session"))?;
            let visits = session.get::<u32>("visits").unwrap_or(0) + 1;
            session.set("visits", visits)?;
            Ok(visits.to_string())
        }),
    )
    .unwrap();

    let first = app.handle(RawRequest::new("GET", "/count"));
    assert_eq!(first.body_text().as_deref(), Some("1"));
    let cookie = first.header("Set-Cookie").unwrap().split(';').next().unwrap().to_string();

    let second = app.handle(RawRequest::new("GET", "/count").with_header("Cookie", &cookie));
    assert_eq!(second.body_text().as_deref(), Some("2"));
    assert!(second.header("Set-Cookie").is_none());
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn url_for_inside_handler() {
    let mut app = App::new();
    app.route(Verb::Get, RouteSpec::new("/user/:id").named("user").handler(Handler::new(|_| Ok("user"))))
        .unwrap();
    app.get(
        "/",
        Handler::new(|cx| {
            let params: PathParams = [("id".to_string(), "7".to_string())].into_iter().collect();
            let target = cx.url_for("user", &params)?;
            Err::<&'static str, _>(cx.redirect(&target))
        }),
    )
    .unwrap();

    let response = app.handle(RawRequest::new("GET", "/"));
    assert_eq!(response.status(), Status::FOUND);
    assert_eq!(response.header("Location"), Some("/user/7"));
}

#[test]
fn raw_http_bytes_through_the_app() {
    let mut app = App::new();
    app.get("/search", Handler::new(|cx| Ok(cx.request.query().get("q").unwrap_or_default().to_string())))
        .unwrap();

    let raw = RawRequest::parse(b"GET /search?q=rust+web HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").unwrap();
    let mut response = app.handle(raw);
    let wire = String::from_utf8(response.to_bytes()).unwrap();

    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(wire.contains("Connection: close\r\n"));
    assert!(wire.ends_with("\r\n\r\nrust web"));
}

#[test]
fn default_headers_from_config() {
    let config = QuillConfig::default().with_default_header("X-Powered-By", "quill");
    let mut app = App::with_config(config);
    app.get("/", Handler::new(|_| Ok("hi"))).unwrap();

    let response = app.handle(RawRequest::new("GET", "/"));
    assert_eq!(response.header("X-Powered-By"), Some("quill"));

    let missing = app.handle(RawRequest::new("GET", "/missing"));
    assert_eq!(missing.header("X-Powered-By"), Some("quill"));
}

#[test]
fn failed_request_keeps_session_cookie() {
    let store = MemorySessionStore::new();
    let mut app = App::new();
    app.use_middleware(middleware(CookieParser));
    app.use_middleware(middleware(SessionMiddleware::new(Arc::new(store.clone()))));
    app.get(
        "/flash",
        Handler::new(|cx| -> Result<&'static str, Failure> {
            let session = cx.request.session_mut().ok_or_else(|| anyhow::anyhow!("no session"))?;
            session.set("flash", "saved before the failure")?;
            Err(anyhow::anyhow!("render failed").into())
        }),
    )
    .unwrap();

    let response = app.handle(RawRequest::new("GET", "/flash"));
    assert_eq!(response.status(), Status::INTERNAL_SERVER_ERROR);
    assert_eq!(store.count().unwrap(), 1);

    let cookie = response.header("Set-Cookie").unwrap().split(';').next().unwrap().to_string();
    let session_id = cookie.split('=').nth(1).unwrap();
    assert!(store.get(session_id).unwrap().is_some());
}
