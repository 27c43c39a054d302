//! MCP (Model Context Protocol) server implementation
//!
//! This module provides the MCP server functionality that lets AI assistants
//! request selfie analysis through the JSON-RPC 2.0 protocol.

pub mod server;
pub mod tools;
pub mod types;

pub use server::{run, McpServer};
