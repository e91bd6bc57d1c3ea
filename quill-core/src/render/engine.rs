//! Template engines

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::escape_html;
use crate::error::TemplateError;

/// Backend that turns a template name plus data into text
///
/// Engines are registered on the app per file extension.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, name: &str, data: &Value) -> Result<String, TemplateError>;
}

/// Minimal engine substituting `{{key}}` placeholders
///
/// Keys may be dotted (`{{user.name}}`). Values are HTML-escaped; `{{{key}}}`
/// inserts them raw. Missing keys render as nothing. Templates come from
/// memory first, then from the views directory if one is set.
///
/// # Example
///
/// ```rust
/// use quill_core::render::{PlaceholderEngine, TemplateEngine};
///
/// let engine = PlaceholderEngine::new().with_template("hello.html", "<p>Hi {{name}}</p>");
/// let html = engine.render("hello.html", &serde_json::json!({"name": "Ada"})).unwrap();
/// assert_eq!(html, "<p>Hi Ada</p>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlaceholderEngine {
    templates: HashMap<String, String>,
    root: Option<PathBuf>,
}

impl PlaceholderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load templates from `root` on demand
    pub fn from_dir(root: impl AsRef<Path>) -> Self {
        Self { templates: HashMap::new(), root: Some(root.as_ref().to_path_buf()) }
    }

    pub fn with_template(mut self, name: &str, source: &str) -> Self {
        self.add_template(name, source);
        self
    }

    pub fn add_template(&mut self, name: &str, source: &str) {
        self.templates.insert(name.to_string(), source.to_string());
    }

    fn source(&self, name: &str) -> Result<String, TemplateError> {
        if let Some(source) = self.templates.get(name) {
            return Ok(source.clone());
        }

        let root = self.root.as_ref().ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        if Path::new(name).components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        match std::fs::read_to_string(root.join(name)) {
            Ok(source) => Ok(source),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl TemplateEngine for PlaceholderEngine {
    fn render(&self, name: &str, data: &Value) -> Result<String, TemplateError> {
        let source = self.source(name)?;
        substitute(name, &source, data)
    }
}

fn lookup<'v>(data: &'v Value, key: &str) -> Option<&'v Value> {
    key.split('.').try_fold(data, |value, part| value.get(part))
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn substitute(name: &str, source: &str, data: &Value) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start..];

        let (raw, open, close) = if after.starts_with("{{{") { (true, 3, "}}}") } else { (false, 2, "}}") };
        let end = after[open..].find(close).ok_or_else(|| TemplateError::Render {
            template: name.to_string(),
            reason: format!("unclosed placeholder at byte {}", source.len() - rest.len() + start),
        })?;

        let key = after[open..open + end].trim();
        let value = lookup(data, key).map(display).unwrap_or_default();
        if raw {
            out.push_str(&value);
        } else {
            out.push_str(&escape_html(&value));
        }

        rest = &after[open + end + close.len()..];
    }
    out.push_str(rest);

    Ok(out)
}
