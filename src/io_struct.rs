use serde::{Deserialize, Serialize};

/// Body of `POST /api/natural-language-query/process`.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl PromptRequest {
    /// The prompt text, or `None` when it is absent or blank.
    pub fn query(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
    }
}

/// RFC 7807 problem document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl ProblemDetail {
    pub const CONTENT_TYPE: &'static str = "application/problem+json";
}
