//! toolforge server
//!
//! Hosts the built-in `echo` tool, optionally with input and config schemas
//! loaded from schema documents.

#![warn(missing_docs)]
#![warn(clippy::all)]

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toolforge_schema::Schema;
use toolforge_server::config::{self, DEFAULT_MAX_BODY_BYTES};
use toolforge_server::{ServerConfig, serve};
use toolforge_tool::{ExecutionContext, ToolDefinition, ToolError, handler_fn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "toolforge-server")]
#[command(about = "Serve a toolforge tool over HTTP", long_about = None)]
#[command(version)]
struct Args {
    /// Bind address
    #[arg(short, long, env = "TOOLFORGE_BIND", default_value = config::DEFAULT_BIND)]
    bind: SocketAddr,

    /// API key required on /execute and /schema
    #[arg(long, env = "TOOLFORGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Handler timeout in milliseconds
    #[arg(long, env = "TOOLFORGE_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Base tool config as a JSON object
    #[arg(long, env = "TOOLFORGE_CONFIG", hide_env_values = true, conflicts_with = "config_file")]
    config: Option<String>,

    /// Base tool config read from a JSON file
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Input schema document
    #[arg(long)]
    input_schema: Option<PathBuf>,

    /// Config schema document
    #[arg(long)]
    config_schema: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// Allow cross-origin requests from any origin
    #[arg(long)]
    cors: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn load_schema(path: &Path) -> Result<Schema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    Schema::from_json_str(&text).with_context(|| format!("Invalid schema {}", path.display()))
}

fn echo_tool(input_schema: Option<Schema>, config_schema: Option<Schema>) -> ToolDefinition {
    let tool = ToolDefinition::new(
        "echo",
        handler_fn(|input: Value, _config: Value, ctx: ExecutionContext| async move {
            Ok::<_, ToolError>(json!({
                "echo": input,
                "execution_id": ctx.execution_id().to_string(),
                "received_at": ctx.timestamp(),
            }))
        }),
    )
    .with_name("Echo")
    .with_version(env!("CARGO_PKG_VERSION"))
    .with_description("Returns its validated input");

    tool.with_input_schema(input_schema.unwrap_or_else(|| Schema::permissive("input")))
        .with_config_schema(config_schema.unwrap_or_else(|| Schema::permissive("config")))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("toolforge=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut server_config = ServerConfig::new()
        .with_bind(args.bind)
        .with_max_body_bytes(args.max_body_bytes)
        .with_permissive_cors(args.cors);
    if let Some(key) = args.api_key {
        server_config = server_config.with_api_key(key);
    }
    if let Some(ms) = args.timeout_ms {
        server_config = server_config.with_timeout(Duration::from_millis(ms));
    }
    if let Some(text) = &args.config {
        server_config = server_config.with_base_config(config::parse_base_config(text)?);
    } else if let Some(path) = &args.config_file {
        server_config = server_config.with_base_config(config::load_base_config(path)?);
    }

    let input_schema = args.input_schema.as_deref().map(load_schema).transpose()?;
    let config_schema = args.config_schema.as_deref().map(load_schema).transpose()?;

    serve(echo_tool(input_schema, config_schema), server_config).await?;
    Ok(())
}
