use std::path::PathBuf;

use clap::Parser;

use crate::chat::OpenAiConfig;
use crate::tools::McpTransport;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a PostgreSQL expert. \
Translate the user's request into a single SQL query, run it with the `query` tool and \
answer only with a JSON document of the form \
{\"sql\": \"<the query you ran>\", \"results\": <rows returned by the tool>, \
\"explanation\": \"<one or two sentences describing the results>\"}. \
Never invent results: if the tool fails, put the error in the explanation.";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read system prompt file {path}: {source}")]
    SystemPromptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("system prompt cannot be empty")]
    EmptySystemPrompt,
    #[error("--mcp-command and --mcp-url are mutually exclusive")]
    ConflictingMcpTransport,
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "HTTP gateway that answers natural language database questions through an LLM", long_about = None)]
pub struct Args {
    #[arg(long, env = "NLQ_HOST", default_value = "127.0.0.1", help = "Host address to bind the server to")]
    pub host: String,

    #[arg(long, env = "NLQ_PORT", default_value_t = 8080, help = "Port number to listen on")]
    pub port: u16,

    #[arg(long, env = "NLQ_SYSTEM_PROMPT", help = "System instructions sent with every query")]
    pub system_prompt: Option<String>,

    #[arg(
        long,
        env = "NLQ_SYSTEM_PROMPT_FILE",
        help = "File holding the system instructions, used when --system-prompt is not set"
    )]
    pub system_prompt_file: Option<PathBuf>,

    #[arg(
        long,
        env = "NLQ_LLM_BASE_URL",
        default_value = "https://api.openai.com/v1",
        help = "Base URL of the OpenAI-compatible chat completions API"
    )]
    pub llm_base_url: String,

    #[arg(long, env = "NLQ_LLM_API_KEY", hide_env_values = true, help = "Bearer token for the chat API")]
    pub llm_api_key: Option<String>,

    #[arg(long, env = "NLQ_MODEL", default_value = "gpt-4o-mini", help = "Model name")]
    pub model: String,

    #[arg(long, env = "NLQ_TEMPERATURE", help = "Sampling temperature")]
    pub temperature: Option<f32>,

    #[arg(long, env = "NLQ_TIMEOUT", default_value_t = 600, help = "Chat request timeout in seconds")]
    pub timeout: u64,

    #[arg(
        long,
        env = "NLQ_MAX_TOOL_ROUNDS",
        default_value_t = 8,
        help = "Maximum number of tool-calling rounds per query"
    )]
    pub max_tool_rounds: usize,

    #[arg(long, env = "NLQ_MCP_COMMAND", help = "Command that starts an MCP server over stdio")]
    pub mcp_command: Option<String>,

    #[arg(
        long,
        env = "NLQ_MCP_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true,
        requires = "mcp_command",
        help = "Comma-separated arguments for --mcp-command"
    )]
    pub mcp_args: Vec<String>,

    #[arg(long, env = "NLQ_MCP_URL", help = "Streamable HTTP endpoint of an MCP server")]
    pub mcp_url: Option<String>,

    #[arg(long, env = "NLQ_LOG_LEVEL", default_value = "info", help = "Log level filter")]
    pub log_level: log::LevelFilter,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub system_prompt: String,
    pub llm: OpenAiConfig,
    pub mcp: Option<McpTransport>,
}

impl AppConfig {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let system_prompt = match (args.system_prompt, args.system_prompt_file) {
            (Some(prompt), _) => prompt,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::SystemPromptFile { path, source })?,
            (None, None) => DEFAULT_SYSTEM_PROMPT.to_string(),
        };

        let mcp = match (args.mcp_command, args.mcp_url) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingMcpTransport),
            (Some(command), None) => Some(McpTransport::Stdio {
                command,
                args: args.mcp_args,
            }),
            (None, Some(url)) => Some(McpTransport::Streamable { url }),
            (None, None) => None,
        };

        let config = AppConfig {
            host: args.host,
            port: args.port,
            system_prompt,
            llm: OpenAiConfig {
                base_url: args.llm_base_url,
                api_key: args.llm_api_key,
                model: args.model,
                temperature: args.temperature,
                timeout: args.timeout,
                max_tool_rounds: args.max_tool_rounds,
            },
            mcp,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_prompt.trim().is_empty() {
            return Err(ConfigError::EmptySystemPrompt);
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }
        if self.llm.timeout == 0 {
            return Err(ConfigError::Invalid("timeout must be non-zero".to_string()));
        }
        if self.llm.max_tool_rounds == 0 {
            return Err(ConfigError::Invalid(
                "max-tool-rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
