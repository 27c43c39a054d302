//! Skincare MCP Server
//!
//! Stdio entry point. Reads JSON-RPC messages from stdin, writes responses to
//! stdout and logs to stderr.

use anyhow::Context;
use clap::Parser;
use skincare_mcp::cli::Cli;
use skincare_mcp::config::RelayConfig;
use skincare_mcp::logging::LoggingConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_config = LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json)
        .with_file_output(cli.log_file.clone());

    if let Err(e) = skincare_mcp::logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(error = %e, "Server terminated");
        eprintln!("Fatal error in main(): {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = RelayConfig::with_timeout_secs(cli.timeout);
    tracing::debug!(timeout_secs = cli.timeout, "Relay configured");

    skincare_mcp::mcp::run(&config)
        .await
        .context("MCP server stopped with an error")
}
