//! Tool registration, argument validation and dispatch
//!
//! Each registered tool carries a JSON schema for its arguments. Arguments are
//! checked against that schema before the handler is invoked, and handler
//! errors are folded into an `isError` tool result instead of a protocol error.

use super::types::ToolResult;
use crate::config::{IMAGE_URL_DESCRIPTION, SELFIE_TOOL_DESCRIPTION, SELFIE_TOOL_NAME};
use crate::error::{Result, SkincareError};
use crate::relay::ImageRelay;
use crate::report::{report, AnalysisOutcome};
use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Something a client can invoke through tools/call
pub trait ToolHandler: Send + Sync {
    fn call(&self, arguments: Value) -> BoxFuture<'_, Result<ToolResult>>;
}

/// Tool definition returned by tools/list
#[derive(Debug, Serialize)]
pub struct ToolDefinition<'a> {
    pub name: &'a str,
    pub description: &'a str,
    #[serde(rename = "inputSchema")]
    pub input_schema: &'a Value,
}

/// Reasons a tools/call is rejected before a handler runs
#[derive(Error, Debug, PartialEq)]
pub enum ToolCallError {
    #[error("Tool {0} not found")]
    UnknownTool(String),

    #[error("Invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

struct RegisteredTool {
    name: String,
    description: String,
    input_schema: Value,
    handler: Arc<dyn ToolHandler>,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Register a tool. A later registration under the same name replaces the earlier one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: impl ToolHandler + 'static,
    ) {
        let tool = RegisteredTool {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler: Arc::new(handler),
        };

        self.tools.retain(|t| t.name != tool.name);
        self.tools.push(tool);
    }

    pub fn definitions(&self) -> Vec<ToolDefinition<'_>> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: &t.name,
                description: &t.description,
                input_schema: &t.input_schema,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn call(
        &self,
        name: &str,
        arguments: Value,
    ) -> std::result::Result<ToolResult, ToolCallError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;

        validate_arguments(&tool.input_schema, &arguments).map_err(|reason| {
            ToolCallError::InvalidArguments {
                tool: name.to_string(),
                reason,
            }
        })?;

        match tool.handler.call(arguments).await {
            Ok(result) => Ok(result),
            Err(e) => {
                crate::log_error!(e, name);
                Ok(ToolResult::error(e.to_string()))
            },
        }
    }
}

/// Check `arguments` against the subset of JSON schema used by tool definitions:
/// an object with `required` keys and typed `properties`.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> std::result::Result<(), String> {
    let args = arguments
        .as_object()
        .ok_or_else(|| format!("Tool arguments must be an object, got: {}", arguments))?;

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(field) {
                return Err(format!("Missing required parameter: {}", field));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, value) in args {
            let Some(expected) = properties
                .get(key)
                .and_then(|p| p.get("type"))
                .and_then(Value::as_str)
            else {
                continue;
            };

            if !matches_type(expected, value) {
                return Err(format!(
                    "Parameter '{}' must be a {}, got: {}",
                    key, expected, value
                ));
            }
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

// ============================================================================
// get-selfie-analysis
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfieAnalysisArgs {
    pub image_url: String,
}

pub struct SelfieAnalysisTool {
    relay: ImageRelay,
}

impl SelfieAnalysisTool {
    pub fn new(relay: ImageRelay) -> Self {
        Self { relay }
    }

    pub fn input_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "imageUrl": {
                    "type": "string",
                    "description": IMAGE_URL_DESCRIPTION
                }
            },
            "required": ["imageUrl"]
        })
    }

    /// Register this tool under its public name
    pub fn register(self, registry: &mut ToolRegistry) {
        registry.register(
            SELFIE_TOOL_NAME,
            SELFIE_TOOL_DESCRIPTION,
            Self::input_schema(),
            self,
        );
    }

    /// Never fails: relay errors become the failure text of the report.
    pub async fn analyze(&self, args: SelfieAnalysisArgs) -> ToolResult {
        tracing::info!(
            tool = SELFIE_TOOL_NAME,
            image_url = %args.image_url,
            "Selfie analysis requested"
        );

        let outcome = self.relay_image(&args.image_url).await;
        if let Err(e) = &outcome {
            tracing::warn!(
                tool = SELFIE_TOOL_NAME,
                image_url = %args.image_url,
                code = e.to_error_code(),
                download = e.is_download_error(),
                error = %e,
                "Selfie analysis failed"
            );
        }

        report(outcome)
    }

    async fn relay_image(&self, image_url: &str) -> Result<AnalysisOutcome> {
        let analysis = self.relay.send_image_from_url(image_url).await?;
        self.relay.notify_echo(image_url).await?;
        Ok(AnalysisOutcome { analysis })
    }
}

impl ToolHandler for SelfieAnalysisTool {
    fn call(&self, arguments: Value) -> BoxFuture<'_, Result<ToolResult>> {
        async move {
            let args: SelfieAnalysisArgs = serde_json::from_value(arguments)?;
            Ok::<_, SkincareError>(self.analyze(args).await)
        }
        .boxed()
    }
}
