//! Common utilities for integration tests
//!
//! Helpers for driving the `skincare-mcp` binary over stdio.

use assert_cmd::Command;
use serde_json::Value;
use std::path::PathBuf;

/// Path to the `skincare-mcp` binary built by cargo test
pub fn skincare_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_skincare-mcp"))
}

/// Command for `skincare-mcp` with logging silenced and no proxy inherited
/// from the environment
pub fn skincare_command() -> Command {
    let mut cmd = Command::new(skincare_binary());
    cmd.env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("HTTPS_PROXY")
        .env_remove("https_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .arg("--quiet");
    cmd
}

/// Feed `messages` to a fresh server, one per line, then close stdin.
///
/// Returns every JSON line the server wrote to stdout.
pub fn exchange(messages: &[Value]) -> Vec<Value> {
    let input: String = messages.iter().map(|m| format!("{}\n", m)).collect();
    exchange_raw(&input)
}

/// Like [`exchange`] but with the raw stdin text
pub fn exchange_raw(input: &str) -> Vec<Value> {
    let output = skincare_command()
        .write_stdin(input.to_string())
        .timeout(std::time::Duration::from_secs(60))
        .output()
        .expect("Failed to run skincare-mcp");

    assert!(
        output.status.success(),
        "skincare-mcp exited with {:?}. stderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

/// A local URL with nothing listening behind it
#[allow(dead_code)] // Only the tool call tests need a dead host
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{}/selfie.jpg", addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skincare_binary_exists() {
        let binary = skincare_binary();
        assert!(binary.exists(), "skincare-mcp binary should exist at {:?}", binary);
    }
}
