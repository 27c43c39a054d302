use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;

const LONG_ABOUT: &str = r#"
Skincare MCP Server - selfie analysis over the Model Context Protocol

Speaks JSON-RPC 2.0 on stdin/stdout and exposes one tool:

  get-selfie-analysis { imageUrl }
      Downloads the image, uploads it as multipart/form-data to the local
      analysis service at http://localhost:2580/echo, and reports the result.

Logs are written to stderr (stdout is reserved for protocol messages).
Set RUST_LOG to override the log filter, e.g. RUST_LOG=skincare_mcp=debug.

Example client configuration:
  { "command": "skincare-mcp", "args": [] }
"#;

#[derive(Parser, Clone, Debug)]
#[command(name = "skincare-mcp")]
#[command(about = "MCP stdio server relaying selfie images to a local skin analysis service")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors (-q)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Timeout in seconds for each outbound HTTP request
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
}
