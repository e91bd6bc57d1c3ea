//! Rendering of handler results
//!
//! A handler returns a [`Body`]; the [`Renderer`]s attached to it turn that
//! value into what goes on the wire: JSON, a rendered template, a deflated
//! payload, or one of several representations picked from the Accept header.

pub mod engine;

pub use engine::{PlaceholderEngine, TemplateEngine};

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::error::Failure;
use crate::http::constants::{content_types, headers};
use crate::http::Body;
use crate::pipeline::RequestContext;

/// Post-processing step applied to a handler's return value
#[derive(Debug, Clone, PartialEq)]
pub enum Renderer {
    /// Serialize as JSON and set `application/json`
    Json,
    /// Render the named template with the body as data
    Template(String),
    /// Deflate when the client's Accept-Encoding admits it
    Compress,
    /// Pick a representation by the Accept header; the first one is the fallback
    Formats(Vec<(String, Renderer)>),
}

impl Renderer {
    pub fn template(name: impl Into<String>) -> Self {
        Renderer::Template(name.into())
    }

    /// Start an empty [`Renderer::Formats`]
    pub fn formats() -> Self {
        Renderer::Formats(Vec::new())
    }

    /// Add a representation to a [`Renderer::Formats`]; no-op on other variants
    pub fn format(mut self, mime: &str, renderer: Renderer) -> Self {
        if let Renderer::Formats(formats) = &mut self {
            formats.push((mime.to_string(), renderer));
        }
        self
    }

    pub fn apply(&self, body: Body, cx: &mut RequestContext<'_>) -> Result<Body, Failure> {
        match self {
            Renderer::Json => {
                cx.response.set_content_type(content_types::JSON);
                Ok(Body::Text(serde_json::to_string(&body_to_value(body))?))
            }
            Renderer::Template(name) => {
                let data = body_to_value(body);
                Ok(Body::Text(cx.render(name, &data)?))
            }
            Renderer::Compress => compress(body, cx),
            Renderer::Formats(formats) => {
                let Some((first, _)) = formats.first() else {
                    return Ok(body);
                };
                let mimes: Vec<&str> = formats.iter().map(|(mime, _)| mime.as_str()).collect();
                let chosen = cx
                    .request
                    .accept()
                    .get_highest_priority_for(&mimes)
                    .unwrap_or(first.as_str())
                    .to_string();

                let renderer = formats
                    .iter()
                    .find(|(mime, _)| *mime == chosen)
                    .map(|(_, renderer)| renderer)
                    .ok_or_else(|| anyhow::anyhow!("negotiated format {} vanished", chosen))?;

                let rendered = renderer.apply(body, cx)?;
                cx.response.set_content_type(&content_type_for(&chosen));
                Ok(rendered)
            }
        }
    }
}

/// Content-Type header value for a negotiated mime; textual types get UTF-8
fn content_type_for(mime: &str) -> String {
    if mime.starts_with("text/") && !mime.contains("charset") {
        format!("{}; charset=UTF-8", mime)
    } else {
        mime.to_string()
    }
}

fn body_to_value(body: Body) -> Value {
    match body {
        Body::Empty => Value::Null,
        Body::Json(value) => value,
        Body::Text(text) => Value::String(text),
        Body::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

fn compress(body: Body, cx: &mut RequestContext<'_>) -> Result<Body, Failure> {
    if body.is_empty() || !cx.request.accepts_encoding("deflate") {
        return Ok(body);
    }

    let compressed = deflate(&body.as_bytes()).map_err(anyhow::Error::from)?;
    cx.response.set_header(headers::CONTENT_ENCODING, "deflate");
    Ok(Body::Bytes(compressed))
}

/// zlib-wrapped deflate, as browsers expect for `Content-Encoding: deflate`
pub(crate) fn deflate(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
