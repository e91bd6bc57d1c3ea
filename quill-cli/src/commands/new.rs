use std::fs;
use std::path::Path;

use crate::templates;

/// Validate that the project name is safe for use as a directory and Cargo package name.
fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Project name cannot be empty".into());
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(format!("invalid project name: \"{}\"", name));
    }
    if name.starts_with('.') || name.starts_with('-') {
        return Err(format!("invalid project name: \"{}\"", name));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(format!("invalid project name: \"{}\"", name));
    }
    Ok(())
}

/// Scaffold a new quill application at `<base>/<name>`.
pub fn run(name: &str, base: &Path, no_views: bool) -> Result<(), String> {
    validate_name(name)?;

    let project_dir = base.join(name);
    if project_dir.exists() {
        return Err(format!("\"{}\" already exists", name));
    }

    let files = templates::standard_project(name, !no_views);

    for file in &files {
        let dest = project_dir.join(file.path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create directory {}: {}", parent.display(), e))?;
        }
        fs::write(&dest, &file.content).map_err(|e| format!("failed to write {}: {}", dest.display(), e))?;
    }

    println!("Created quill app \"{}\" with {} files.", name, files.len());
    println!();
    println!("  cd {}", name);
    println!("  cargo run");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(validate_name("my-app").is_ok());
        assert!(validate_name("cool_project").is_ok());
        assert!(validate_name("app123").is_ok());
    }

    #[test]
    fn invalid_names() {
        assert!(validate_name("").is_err());
        assert!(validate_name("../escape").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name("-bad").is_err());
        assert!(validate_name("no spaces").is_err());
        assert!(validate_name("a/b").is_err());
    }

    #[test]
    fn scaffold_creates_files() {
        let tmp = tempfile::tempdir().unwrap();
        run("blog", tmp.path(), false).unwrap();

        for path in [
            "Cargo.toml",
            "quill.toml",
            "src/main.rs",
            "src/routes.rs",
            "src/controllers/mod.rs",
            "src/controllers/root.rs",
            "views/index.html",
        ] {
            assert!(tmp.path().join("blog").join(path).exists(), "missing {}", path);
        }

        let routes = fs::read_to_string(tmp.path().join("blog/src/routes.rs")).unwrap();
        assert!(routes.contains("Renderer::template(\"index\")"));
    }

    #[test]
    fn scaffold_no_views() {
        let tmp = tempfile::tempdir().unwrap();
        run("api-only", tmp.path(), true).unwrap();

        assert!(tmp.path().join("api-only/src/controllers/root.rs").exists());
        assert!(!tmp.path().join("api-only/views").exists());

        let routes = fs::read_to_string(tmp.path().join("api-only/src/routes.rs")).unwrap();
        assert!(routes.contains("Renderer::Json"));
        assert!(!routes.contains("Renderer::template"));
    }

    #[test]
    fn scaffold_rejects_existing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("exists")).unwrap();
        let result = run("exists", tmp.path(), false);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("already exists"));
    }

    #[test]
    fn project_name_is_substituted() {
        let tmp = tempfile::tempdir().unwrap();
        run("cool-project", tmp.path(), false).unwrap();

        let cargo = fs::read_to_string(tmp.path().join("cool-project/Cargo.toml")).unwrap();
        assert!(cargo.contains("name = \"cool-project\""));

        let root = fs::read_to_string(tmp.path().join("cool-project/src/controllers/root.rs")).unwrap();
        assert!(root.contains("\"cool-project\""));
        assert!(!root.contains("{{project_name}}"));
    }

    #[test]
    fn config_file_uses_quill_sections() {
        let tmp = tempfile::tempdir().unwrap();
        run("cfg", tmp.path(), false).unwrap();

        let content = fs::read_to_string(tmp.path().join("cfg/quill.toml")).unwrap();
        assert!(content.contains("[server]"));
        assert!(content.contains("[app]"));
        assert!(content.contains("[logging]"));
    }
}
