//! Turns a relay outcome into the tool result returned to the client.
//!
//! A successful round always reports [`ANALYSIS_SUCCESS_TEXT`]; the analysis
//! service's reply is carried in [`AnalysisOutcome`] but not rendered.

use crate::config::{ANALYSIS_FAILURE_PREFIX, ANALYSIS_SUCCESS_TEXT};
use crate::error::Result;
use crate::mcp::types::ToolResult;
use crate::relay::AnalysisResponse;
use std::error::Error;

/// Everything a completed relay round produced
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: AnalysisResponse,
}

pub fn report(outcome: Result<AnalysisOutcome>) -> ToolResult {
    match outcome {
        Ok(_outcome) => ToolResult::text(ANALYSIS_SUCCESS_TEXT),
        Err(e) => ToolResult::text(format!("{}: {}", ANALYSIS_FAILURE_PREFIX, describe(&e))),
    }
}

/// Error message followed by every cause in its source chain, joined with `": "`.
///
/// A cause whose text already appears in the message so far is skipped.
pub fn describe(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }

    text
}
