//! Embedded project templates rendered with simple `{{placeholder}}` substitution.

const CARGO_TOML: &str = include_str!("cargo_toml.tmpl");
const MAIN_RS: &str = include_str!("main_rs.tmpl");
const ROUTES_RS: &str = include_str!("routes_rs.tmpl");
const CONTROLLERS_MOD: &str = include_str!("controllers_mod.tmpl");
const CONTROLLERS_ROOT: &str = include_str!("controllers_root.tmpl");
const QUILL_TOML: &str = include_str!("quill_toml.tmpl");
const GITIGNORE: &str = include_str!("gitignore.tmpl");
const INDEX_HTML: &str = include_str!("index_html.tmpl");

const TEMPLATE_RENDERER: &str = "Renderer::template(\"index\")";
const JSON_RENDERER: &str = "Renderer::Json";

fn render(template: &str, project_name: &str, root_renderer: &str) -> String {
    template.replace("{{project_name}}", project_name).replace("{{root_renderer}}", root_renderer)
}

/// A file to write into the scaffolded project, with its relative path and rendered content.
pub struct TemplateFile {
    pub path: &'static str,
    pub content: String,
}

/// Returns all template files for a standard project.
///
/// Without views the root route renders its data as JSON.
pub fn standard_project(project_name: &str, include_views: bool) -> Vec<TemplateFile> {
    let renderer = if include_views { TEMPLATE_RENDERER } else { JSON_RENDERER };
    let file = |path: &'static str, template: &str| TemplateFile { path, content: render(template, project_name, renderer) };

    let mut files = vec![
        file("Cargo.toml", CARGO_TOML),
        file("quill.toml", QUILL_TOML),
        file(".gitignore", GITIGNORE),
        file("src/main.rs", MAIN_RS),
        file("src/routes.rs", ROUTES_RS),
        file("src/controllers/mod.rs", CONTROLLERS_MOD),
        file("src/controllers/root.rs", CONTROLLERS_ROOT),
    ];

    if include_views {
        // The generated app fills {{title}} and {{message}} at request time
        files.push(file("views/index.html", INDEX_HTML));
    }

    files
}
