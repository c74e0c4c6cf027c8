pub mod openai;

use async_trait::async_trait;

pub use openai::{OpenAiChatClient, OpenAiConfig};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed chat response: {0}")]
    MalformedResponse(String),

    #[error("model did not produce an answer within {0} tool rounds")]
    ToolRoundsExceeded(usize),
}

/// Sends a system instruction and a user turn to a model and returns the
/// assistant's final text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ChatError>;
}
