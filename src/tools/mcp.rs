//! Tool provider backed by a single MCP server.
//!
//! The server (for example a Postgres MCP server exposing a `query` tool) is
//! connected once at startup. Its tool inventory is listed at connect time and
//! advertised to the model unchanged.

use std::borrow::Cow;

use async_trait::async_trait;
use log::{debug, info, warn};
use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParam, CallToolResult, JsonObject, Tool},
    service::RunningService,
    transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess},
};
use serde_json::Value;

use super::{ToolError, ToolProvider, ToolSpec};

pub type McpClient = RunningService<RoleClient, ()>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpTransport {
    /// Spawn the server as a child process speaking MCP over stdio.
    Stdio { command: String, args: Vec<String> },
    /// Connect to a streamable HTTP endpoint.
    Streamable { url: String },
}

pub struct McpToolProvider {
    client: McpClient,
    tools: Vec<Tool>,
}

impl McpToolProvider {
    pub async fn connect(transport: &McpTransport) -> Result<Self, ToolError> {
        info!("Connecting to MCP server via {:?}", transport);

        let client = match transport {
            McpTransport::Stdio { command, args } => {
                let child = TokioChildProcess::new(
                    tokio::process::Command::new(command).configure(|cmd| {
                        cmd.args(args).stderr(std::process::Stdio::inherit());
                    }),
                )
                .map_err(|e| ToolError::Transport(format!("create stdio transport: {}", e)))?;

                ().serve(child).await.map_err(|e| {
                    ToolError::Transport(format!("initialize stdio client: {}", e))
                })?
            }
            McpTransport::Streamable { url } => {
                let transport = StreamableHttpClientTransport::from_uri(url.as_str());
                ().serve(transport).await.map_err(|e| {
                    ToolError::Transport(format!("initialize streamable client: {}", e))
                })?
            }
        };

        Self::from_client(client).await
    }

    /// Wraps an initialized client session and lists its tools.
    pub async fn from_client(client: McpClient) -> Result<Self, ToolError> {
        let tools = client
            .peer()
            .list_all_tools()
            .await
            .map_err(|e| ToolError::Transport(format!("list tools: {}", e)))?;
        info!(
            "Discovered {} MCP tools: {}",
            tools.len(),
            tools
                .iter()
                .map(|t| t.name.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self { client, tools })
    }

    pub async fn shutdown(self) {
        if let Err(e) = self.client.cancel().await {
            warn!("Failed to shut down MCP client: {}", e);
        }
    }
}

#[async_trait]
impl ToolProvider for McpToolProvider {
    fn tools(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(tool_spec).collect()
    }

    async fn call(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(ToolError::NotFound(name.to_string()));
        }

        let request = CallToolRequestParam {
            name: Cow::Owned(name.to_string()),
            arguments: tool_arguments(arguments)?,
        };
        debug!("Calling MCP tool '{}'", name);

        let result = self
            .client
            .call_tool(request)
            .await
            .map_err(|e| ToolError::Execution(format!("call tool '{}': {}", name, e)))?;
        result_text(result)
    }
}

pub(crate) fn tool_spec(tool: &Tool) -> ToolSpec {
    ToolSpec {
        name: tool.name.to_string(),
        description: tool.description.as_ref().map(|d| d.to_string()),
        parameters: Value::Object((*tool.input_schema).clone()),
    }
}

fn tool_arguments(arguments: Value) -> Result<Option<JsonObject>, ToolError> {
    match arguments {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(ToolError::InvalidArguments(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Joins the text contents of a tool result. Falls back to the structured
/// content when the server returned no text.
pub(crate) fn result_text(result: CallToolResult) -> Result<String, ToolError> {
    let mut text = result
        .content
        .iter()
        .filter_map(|c| c.as_text())
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if text.is_empty() {
        if let Some(structured) = &result.structured_content {
            text = structured.to_string();
        }
    }

    if result.is_error.unwrap_or(false) {
        return Err(ToolError::Execution(text));
    }
    Ok(text)
}
