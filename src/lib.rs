pub mod chat;
pub mod config;
pub mod error;
pub mod io_struct;
pub mod query_service;
pub mod server;
pub mod tools;

use std::sync::Arc;

use chat::OpenAiChatClient;
use config::AppConfig;
use query_service::QueryService;
use server::startup;
use tokio::signal;
use tools::{McpToolProvider, NoTools, ToolProvider};

/// Connects the tool provider, builds the chat client and serves until the
/// server stops or Ctrl+C is received.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let mcp = match &config.mcp {
        Some(transport) => Some(Arc::new(McpToolProvider::connect(transport).await?)),
        None => {
            log::warn!("No MCP server configured, the model will run without tools");
            None
        }
    };
    let tools: Arc<dyn ToolProvider> = match &mcp {
        Some(provider) => provider.clone(),
        None => Arc::new(NoTools),
    };

    let chat_client = OpenAiChatClient::new(config.llm.clone(), tools)?;
    let service = QueryService::new(config.system_prompt.clone(), Arc::new(chat_client));

    let result = tokio::select! {
        res = startup(config, service) => res.map_err(anyhow::Error::from),
        _ = signal::ctrl_c() => {
            log::info!("Received Ctrl+C, shutting down");
            Ok(())
        }
    };

    if let Some(provider) = mcp.and_then(Arc::into_inner) {
        provider.shutdown().await;
    }
    result
}
