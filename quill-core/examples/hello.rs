//! Minimal quill app: named routes, an optional parameter, JSON and a redirect.
//!
//! ```bash
//! cargo run -p quill-core --example hello
//! curl localhost:8080/user/7/posts
//! ```

use quill_core::prelude::*;

fn main() -> quill_core::Result<()> {
    let mut app = App::load()?;
    app.use_middleware(middleware(AccessLog));
    app.use_middleware(middleware(Compress::new()));

    app.route(
        Verb::Get,
        RouteSpec::new("/user/:id/:tab?").named("user").handler(
            Handler::new(|cx| Ok(serde_json::json!({ "id": cx.param("id"), "tab": cx.param("tab") })))
                .with_renderer(Renderer::Json),
        ),
    )?;

    app.get(
        "/me",
        Handler::new(|cx| {
            let params: PathParams = [("id".to_string(), "1".to_string())].into_iter().collect();
            let target = cx.url_for("user", &params)?;
            Err::<&'static str, _>(cx.redirect(&target))
        }),
    )?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app.listen())
}
