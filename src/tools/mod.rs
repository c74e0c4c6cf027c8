pub mod mcp;

use async_trait::async_trait;
use serde_json::Value;

pub use mcp::{McpToolProvider, McpTransport};

/// A callable tool advertised to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
    #[error("tool transport error: {0}")]
    Transport(String),
}

/// Binds callable actions to a chat client.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    fn tools(&self) -> Vec<ToolSpec>;

    async fn call(&self, name: &str, arguments: Value) -> Result<String, ToolError>;
}

/// Provider with no tools; the model answers from the prompt alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTools;

#[async_trait]
impl ToolProvider for NoTools {
    fn tools(&self) -> Vec<ToolSpec> {
        Vec::new()
    }

    async fn call(&self, name: &str, _arguments: Value) -> Result<String, ToolError> {
        Err(ToolError::NotFound(name.to_string()))
    }
}
