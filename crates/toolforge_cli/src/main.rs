//! toolforge CLI
//!
//! Scaffolds tool projects and checks payloads against schema documents.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod scaffold;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use console::style;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use toolforge_schema::{Schema, ValidationResult};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "toolforge")]
#[command(about = "toolforge - schema-validated tool hosting", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new tool project
    Init {
        /// Project name
        name: String,
        /// Parent directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Validate a payload against a schema document
    Validate {
        /// Schema document
        #[arg(short, long)]
        schema: PathBuf,
        /// Payload file
        #[arg(short, long)]
        input: PathBuf,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the JSON Schema projection of a schema document
    Schema {
        /// Schema document
        #[arg(short, long)]
        schema: PathBuf,
    },
}

fn load_schema(path: &Path) -> Result<Schema> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read schema {}", path.display()))?;
    Schema::from_json_str(&text).wrap_err_with(|| format!("Invalid schema {}", path.display()))
}

fn load_payload(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read payload {}", path.display()))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("Payload {} is not JSON", path.display()))
}

fn validate_file(schema: &Path, input: &Path) -> Result<ValidationResult> {
    let schema = load_schema(schema)?;
    let payload = load_payload(input)?;
    let result = schema.validate(&payload);
    debug!(schema = schema.name(), errors = result.errors.len(), "Validated payload");
    Ok(result)
}

fn command_init(name: &str, dir: &Path) -> Result<ExitCode> {
    let (root, written) = scaffold::init_project(name, dir)?;
    for path in &written {
        let shown = path.strip_prefix(&root).unwrap_or(path);
        println!("  {} {}", style("created").green(), shown.display());
    }
    println!(
        "{} tool project {} at {}",
        style("✓").green().bold(),
        style(name).cyan(),
        root.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn command_validate(schema: &Path, input: &Path, json: bool) -> Result<ExitCode> {
    let result = validate_file(schema, input)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.valid {
        println!("{} valid", style("✓").green().bold());
        println!("{}", serde_json::to_string_pretty(&result.normalized_value)?);
    } else {
        println!(
            "{} {} error(s)",
            style("✗").red().bold(),
            result.errors.len()
        );
        for error in &result.errors {
            let path = if error.field_path.is_empty() {
                "<root>"
            } else {
                error.field_path.as_str()
            };
            println!(
                "  {} {} {}",
                style(path).yellow(),
                style(error.code).dim(),
                error.message
            );
        }
    }
    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn command_schema(schema: &Path) -> Result<ExitCode> {
    let schema = load_schema(schema)?;
    println!("{}", serde_json::to_string_pretty(&schema.to_json_schema())?);
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { name, dir } => command_init(&name, &dir),
        Commands::Validate {
            schema,
            input,
            json,
        } => command_validate(&schema, &input, json),
        Commands::Schema { schema } => command_schema(&schema),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;
    use std::fs;
    use toolforge_schema::ErrorCode;

    const SCHEMA: &str = r#"{
        "name": "input",
        "fields": {
            "email": {"kind": "string", "required": true, "format": "email"},
            "age": {"kind": "integer", "min": 0}
        }
    }"#;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_validate_file_valid() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        let input = write(dir.path(), "input.json", r#"{"email": "a@b.co", "age": 30}"#);
        let result = validate_file(&schema, &input).unwrap();
        assert!(result.valid);
        assert_eq!(result.normalized_value, json!({"email": "a@b.co", "age": 30}));
    }

    #[test]
    fn test_validate_file_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        let input = write(dir.path(), "input.json", r#"{"email": "nope", "age": -1}"#);
        let result = validate_file(&schema, &input).unwrap();
        assert!(!result.valid);
        let codes: Vec<ErrorCode> = result.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::FormatMismatch, ErrorCode::OutOfRange]);
        assert!(command_validate(&schema, &input, false).is_ok());
    }

    #[test]
    fn test_validate_file_bad_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", r#"{"fields": {"x": {"kind": "nope"}}}"#);
        let input = write(dir.path(), "input.json", "{}");
        assert!(validate_file(&schema, &input).is_err());

        let schema = write(dir.path(), "good.json", SCHEMA);
        let input = write(dir.path(), "broken.json", "{not json");
        assert!(validate_file(&schema, &input).is_err());
        assert!(validate_file(&schema, &dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_command_schema_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        assert!(command_schema(&schema).is_ok());
    }
}
