//! Project scaffolding for `toolforge init`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const NAME_PLACEHOLDER: &str = "__TOOL_NAME__";

const CARGO_TOML: &str = r#"[package]
name = "__TOOL_NAME__"
version = "0.1.0"
edition = "2024"

[dependencies]
toolforge_schema = { git = "https://github.com/toolforge/toolforge" }
toolforge_server = { git = "https://github.com/toolforge/toolforge" }
toolforge_tool = { git = "https://github.com/toolforge/toolforge" }
serde_json = "1.0"
tokio = { version = "1.40", features = ["rt-multi-thread", "macros"] }
anyhow = "1.0"
tracing-subscriber = { version = "0.3", features = ["env-filter"] }
"#;

const MAIN_RS: &str = r#"use serde_json::{Value, json};
use toolforge_schema::Schema;
use toolforge_server::{ServerConfig, serve};
use toolforge_tool::{ExecutionContext, ToolDefinition, ToolError, handler_fn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolforge=info")),
        )
        .init();

    let input = Schema::from_json_str(include_str!("../schemas/input.json"))?;
    let config = Schema::from_json_str(include_str!("../schemas/config.json"))?;

    let tool = ToolDefinition::new(
        "__TOOL_NAME__",
        handler_fn(|input: Value, config: Value, _ctx: ExecutionContext| async move {
            let name = input["name"].as_str().unwrap_or("world");
            let greeting = config["greeting"].as_str().unwrap_or("Hello");
            Ok::<_, ToolError>(json!({ "message": format!("{greeting}, {name}!") }))
        }),
    )
    .with_version(env!("CARGO_PKG_VERSION"))
    .with_input_schema(input)
    .with_config_schema(config);

    serve(tool, ServerConfig::new()).await?;
    Ok(())
}
"#;

const INPUT_SCHEMA: &str = r#"{
  "name": "input",
  "strict": true,
  "fields": {
    "name": {
      "kind": "string",
      "required": true,
      "min_length": 1,
      "max_length": 100,
      "description": "Who to greet"
    }
  }
}
"#;

const CONFIG_SCHEMA: &str = r#"{
  "name": "config",
  "strict": true,
  "fields": {
    "greeting": {
      "kind": "string",
      "default": "Hello",
      "description": "Greeting word"
    }
  }
}
"#;

const GITIGNORE: &str = "/target\n";

/// Scaffolding failure
#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    /// The project name is not a valid package name
    #[error("Invalid project name {name:?}: use lowercase letters, digits, '-' and '_', starting with a letter")]
    InvalidName {
        /// Rejected name
        name: String,
    },

    /// The target directory is already there
    #[error("Refusing to overwrite existing path {}", path.display())]
    AlreadyExists {
        /// Target directory
        path: PathBuf,
    },

    /// Writing a file failed
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// Path being written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },
}

/// Check a project name
///
/// # Errors
///
/// Returns [`ScaffoldError::InvalidName`] unless the name starts with a
/// lowercase ASCII letter and continues with lowercase letters, digits,
/// `-` or `_`
pub fn validate_name(name: &str) -> Result<(), ScaffoldError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Files of a new project, relative to its root
#[must_use]
pub fn project_files(name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Cargo.toml", CARGO_TOML.replace(NAME_PLACEHOLDER, name)),
        ("src/main.rs", MAIN_RS.replace(NAME_PLACEHOLDER, name)),
        ("schemas/input.json", INPUT_SCHEMA.to_string()),
        ("schemas/config.json", CONFIG_SCHEMA.to_string()),
        (".gitignore", GITIGNORE.to_string()),
    ]
}

fn write_file(path: &Path, contents: &str) -> Result<(), ScaffoldError> {
    let io_error = |source| ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, contents).map_err(io_error)
}

/// Create project `name` under `parent`
///
/// Returns the project root and the files written, in order.
///
/// # Errors
///
/// Returns [`ScaffoldError`] for a bad name, an existing target, or a failed
/// write
pub fn init_project(name: &str, parent: &Path) -> Result<(PathBuf, Vec<PathBuf>), ScaffoldError> {
    validate_name(name)?;
    let root = parent.join(name);
    if root.exists() {
        return Err(ScaffoldError::AlreadyExists { path: root });
    }

    let mut written = Vec::new();
    for (relative, contents) in project_files(name) {
        let path = root.join(relative);
        write_file(&path, &contents)?;
        written.push(path);
    }
    Ok((root, written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolforge_schema::{FieldDefinition, Schema};

    #[test]
    fn test_validate_name() {
        assert!(validate_name("weather-lookup").is_ok());
        assert!(validate_name("tool_2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("2fast").is_err());
        assert!(validate_name("MyTool").is_err());
        assert!(validate_name("my tool").is_err());
        assert!(validate_name("../escape").is_err());
    }

    #[test]
    fn test_init_writes_project() {
        let dir = tempfile::tempdir().unwrap();
        let (root, written) = init_project("greeter", dir.path()).unwrap();
        assert_eq!(root, dir.path().join("greeter"));
        assert_eq!(written.len(), 5);

        let cargo = fs::read_to_string(root.join("Cargo.toml")).unwrap();
        assert!(cargo.contains(r#"name = "greeter""#));
        let main = fs::read_to_string(root.join("src/main.rs")).unwrap();
        assert!(main.contains(r#""greeter","#));
        assert!(!main.contains(NAME_PLACEHOLDER));
    }

    #[test]
    fn test_init_refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("taken")).unwrap();
        let err = init_project("taken", dir.path()).unwrap_err();
        assert!(matches!(err, ScaffoldError::AlreadyExists { .. }));
    }

    #[test]
    fn test_scaffolded_schemas_load() {
        let input = Schema::from_json_str(INPUT_SCHEMA).unwrap();
        assert!(input.field("name").is_some_and(FieldDefinition::is_required));
        assert!(input.validate(&serde_json::json!({"name": "Ada"})).valid);

        let config = Schema::from_json_str(CONFIG_SCHEMA).unwrap();
        let result = config.validate(&serde_json::json!({}));
        assert_eq!(result.normalized_value, serde_json::json!({"greeting": "Hello"}));
    }
}
