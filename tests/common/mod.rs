// Shared helpers for integration tests
#![allow(dead_code)]

pub mod mock_llm;

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use nlq_gateway::chat::{ChatClient, ChatError};
use nlq_gateway::tools::{ToolError, ToolProvider, ToolSpec};
use serde_json::{Value, json};

/// Chat client returning a canned answer or a canned failure.
pub struct StubChatClient {
    reply: Result<String, u16>,
    calls: AtomicUsize,
}

impl StubChatClient {
    pub fn answering(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every call with an upstream error carrying `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for StubChatClient {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(ChatError::Upstream {
                status: *status,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}

/// Tool provider exposing a single `query` tool that records its arguments.
#[derive(Default)]
pub struct RecordingTools {
    pub calls: Mutex<Vec<(String, Value)>>,
    pub fail_with: Option<String>,
}

impl RecordingTools {
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl ToolProvider for RecordingTools {
    fn tools(&self) -> Vec<ToolSpec> {
        vec![ToolSpec {
            name: "query".to_string(),
            description: Some("Run a read-only SQL query".to_string()),
            parameters: json!({
                "type": "object",
                "properties": {"sql": {"type": "string"}},
                "required": ["sql"]
            }),
        }]
    }

    async fn call(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));
        if name != "query" {
            return Err(ToolError::NotFound(name.to_string()));
        }
        match &self.fail_with {
            Some(message) => Err(ToolError::Execution(message.clone())),
            None => Ok(json!([{"id": 1, "name": "Laptop", "price": 899}]).to_string()),
        }
    }
}
