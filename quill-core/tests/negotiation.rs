//! Content negotiation through the public API

use quill_core::app::App;
use quill_core::http::RawRequest;
use quill_core::negotiation::{AcceptedList, ContentType};
use quill_core::pipeline::Handler;
use quill_core::render::Renderer;

const ACCEPT: &str = "text/html;q=0.8,application/json;q=0.5,text/plain;q=1";

#[test]
fn ranking_follows_weights() {
    let accepted = AcceptedList::mime(ACCEPT);
    let ranked: Vec<&str> = accepted.get_by_priority().into_iter().map(|e| e.value()).collect();
    assert_eq!(ranked, ["text/plain", "text/html", "application/json"]);
    assert_eq!(accepted.get_highest_priority_for(&["text/html"]), Some("text/html"));
}

#[test]
fn header_weight_beats_candidate_order() {
    let accepted = AcceptedList::mime(ACCEPT);
    assert_eq!(
        accepted.get_highest_priority_for(&["application/json", "text/html"]),
        Some("text/html")
    );
    assert_eq!(accepted.get_highest_priority_for(&["image/png"]), None);
}

#[test]
fn candidate_order_breaks_ties() {
    let accepted = AcceptedList::mime("*/*");
    assert_eq!(accepted.get_highest_priority_for(&["application/json", "text/html"]), Some("application/json"));
}

#[test]
fn malformed_entries_are_dropped() {
    let accepted = AcceptedList::mime("text/html;q=abc, application/json, ;q=0.3");
    assert_eq!(accepted.len(), 1);
    assert!(accepted.contains("application/json"));
}

#[test]
fn token_lists_match_exactly_or_by_star() {
    let languages = AcceptedList::tokens("da, en-gb;q=0.8, en;q=0.7");
    assert_eq!(languages.get_highest_priority_for(&["en", "en-gb"]), Some("en-gb"));
    assert!(!languages.contains("fr"));

    let anything = AcceptedList::tokens("*");
    assert!(anything.contains("fr"));
}

#[test]
fn content_type_bare_type_matches_any_category() {
    let json = ContentType::parse("json").unwrap();
    assert!(json.matches(&ContentType::parse("application/json").unwrap()));
    assert!(ContentType::parse("text/*").unwrap().matches_str("text/plain"));
    assert!(!ContentType::parse("text/*").unwrap().matches_str("image/png"));
}

#[test]
fn formats_renderer_negotiates_through_the_app() {
    let mut app = App::new();
    app.get(
        "/report",
        Handler::new(|_| Ok(serde_json::json!({"total": 3}))).with_renderer(
            Renderer::formats()
                .format("application/json", Renderer::Json)
                .format("text/plain", Renderer::Json),
        ),
    )
    .unwrap();

    let response = app.handle(RawRequest::new("GET", "/report").with_header("Accept", "text/plain, application/json;q=0.1"));
    assert_eq!(response.header("Content-Type"), Some("text/plain; charset=UTF-8"));

    let response = app.handle(RawRequest::new("GET", "/report").with_header("Accept", "application/xml"));
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(response.body_text().as_deref(), Some("{\"total\":3}"));
}

#[test]
fn request_accepts_helpers() {
    let mut app = App::new();
    app.get(
        "/",
        Handler::new(|cx| {
            Ok(format!(
                "{} {} {}",
                cx.request.accepts("text/html"),
                cx.request.accepts_language("fr"),
                cx.request.accepts_charset("utf-8")
            ))
        }),
    )
    .unwrap();

    let response = app.handle(RawRequest::new("GET", "/"));
    assert_eq!(response.body_text().as_deref(), Some("true true true"));

    let response = app.handle(
        RawRequest::new("GET", "/")
            .with_header("Accept", "application/json")
            .with_header("Accept-Language", "en")
            .with_header("Accept-Charset", "utf-8"),
    );
    assert_eq!(response.body_text().as_deref(), Some("false false true"));
}
