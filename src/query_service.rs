use std::sync::Arc;

use log::{debug, error, warn};

use crate::chat::ChatClient;
use crate::error::QueryError;

/// Turns a natural language query into the model's answer.
///
/// The system prompt is fixed at construction; each call sends it together
/// with the caller's text as the user turn. Holds no per-request state.
#[derive(Clone)]
pub struct QueryService {
    system_prompt: Arc<str>,
    chat_client: Arc<dyn ChatClient>,
}

impl QueryService {
    pub fn new(system_prompt: impl Into<Arc<str>>, chat_client: Arc<dyn ChatClient>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            chat_client,
        }
    }

    pub async fn process(&self, query: Option<&str>) -> Result<String, QueryError> {
        let query = match query {
            Some(query) if !query.trim().is_empty() => query,
            _ => {
                warn!("Received an empty or null natural language query.");
                return Err(QueryError::InvalidInput);
            }
        };

        debug!("Processing natural language query: {}", query);
        match self.chat_client.complete(&self.system_prompt, query).await {
            Ok(response) => {
                debug!("Successfully generated AI response for query: {}", query);
                Ok(response)
            }
            Err(e) => {
                error!(
                    "Error occurred while processing natural language query: {}: {}",
                    query, e
                );
                Err(QueryError::processing(e))
            }
        }
    }
}
