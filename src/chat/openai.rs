use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChatClient, ChatError};
use crate::tools::{ToolError, ToolProvider, ToolSpec};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub timeout: u64,
    pub max_tool_rounds: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: &str) -> Self {
        ChatMessage {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool_result(call_id: &str, content: String) -> Self {
        ChatMessage {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(call_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize)]
struct ToolDefinition {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDefinition,
}

#[derive(Debug, Serialize)]
struct FunctionDefinition {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    parameters: Value,
}

impl From<ToolSpec> for ToolDefinition {
    fn from(spec: ToolSpec) -> Self {
        ToolDefinition {
            kind: "function",
            function: FunctionDefinition {
                name: spec.name,
                description: spec.description,
                parameters: spec.parameters,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints. Tool calls
/// requested by the model are resolved through the bound [`ToolProvider`].
pub struct OpenAiChatClient {
    client: reqwest::Client,
    config: OpenAiConfig,
    tools: Arc<dyn ToolProvider>,
}

impl OpenAiChatClient {
    pub fn new(config: OpenAiConfig, tools: Arc<dyn ToolProvider>) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            config,
            tools,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatMessage, ChatError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            tools,
        };
        trace!("Chat request: {:?}", request);

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let resp = builder.send().await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let response: ChatCompletionResponse = serde_json::from_slice(&body)
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::MalformedResponse("no choices in response".to_string()))?;
        debug!("Chat finish reason: {:?}", choice.finish_reason);
        Ok(choice.message)
    }

    /// Runs the requested calls concurrently. Results come back in call order;
    /// failures are reported to the model as text.
    async fn run_tool_calls(&self, calls: &[ToolCall]) -> Vec<ChatMessage> {
        let tasks = calls.iter().map(|call| async move {
            debug!("Model requested tool '{}' ({})", call.function.name, call.id);
            let output = match parse_arguments(&call.function.arguments) {
                Ok(arguments) => self.tools.call(&call.function.name, arguments).await,
                Err(e) => Err(e),
            };
            let content = output.unwrap_or_else(|e| {
                warn!("Tool '{}' failed: {}", call.function.name, e);
                format!("Error: {}", e)
            });
            ChatMessage::tool_result(&call.id, content)
        });
        join_all(tasks).await
    }
}

fn parse_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ChatError> {
        let tools: Vec<ToolDefinition> = self
            .tools
            .tools()
            .into_iter()
            .map(ToolDefinition::from)
            .collect();
        let mut messages = vec![
            ChatMessage::text("system", system),
            ChatMessage::text("user", user),
        ];

        let max_rounds = self.config.max_tool_rounds;
        for round in 0..=max_rounds {
            let reply = self.send(&messages, &tools).await?;
            let calls = match &reply.tool_calls {
                Some(calls) if !calls.is_empty() => calls.clone(),
                _ => return Ok(reply.content.unwrap_or_default()),
            };
            if round == max_rounds {
                break;
            }
            debug!("Tool round {}: {} call(s)", round + 1, calls.len());
            messages.push(reply);
            messages.extend(self.run_tool_calls(&calls).await);
        }
        Err(ChatError::ToolRoundsExceeded(max_rounds))
    }
}
