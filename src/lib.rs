pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod relay;
pub mod report;

#[cfg(test)]
pub mod test_utils;
