/// Orchestration logic for the Fixa session client
/// This module contains the core session logic:
/// - Configuration from the environment
/// - Free-text query handling (assistant prose + category suggestions +
///   provider search through the tool server)

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use fixa_core::{Category, Provider};

use crate::{assistant, tools};

/// Fixed delay of the simulated STK push before a payment confirms.
pub const STK_PUSH_DELAY: Duration = Duration::from_millis(2500);

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Session client configuration
pub struct AgentConfig {
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub assistant_model: String,
    pub server_url: String,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow!("GEMINI_API_KEY environment variable not set"))?;

        let gemini_api_url = std::env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        let assistant_model = std::env::var("ASSISTANT_MODEL")
            .unwrap_or_else(|_| "gemini-3-flash-preview".to_string());

        let server_url = std::env::var("FIXA_SERVER_URL")
            .unwrap_or_else(|_| "http://localhost:8001".to_string());

        Ok(Self {
            gemini_api_key,
            gemini_api_url,
            assistant_model,
            server_url,
        })
    }
}

/// Everything a free-text query produces for the caller.
#[derive(Debug, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    pub suggestions: Vec<Category>,
    pub providers: Vec<Provider>,
}

/// Process a free-text user query.
/// Returns the outcome plus the updated transcript. The assistant gateway
/// degrades internally; a tool-server failure during the follow-up provider
/// search degrades to an empty match list rather than failing the chat.
pub async fn process_user_query(
    client: &reqwest::Client,
    config: &AgentConfig,
    user_query: &str,
    messages: &[ChatMessage],
) -> Result<(ChatOutcome, Vec<ChatMessage>)> {
    let reply = assistant::assistant_reply(client, config, user_query).await;
    let suggestions = assistant::smart_suggestions(client, config, user_query).await;

    let providers = match suggestions.first() {
        Some(&category) => {
            match tools::search_providers(client, config, "", Some(category)).await {
                Ok(providers) => providers,
                Err(e) => {
                    tracing::warn!("[CHAT] Provider search failed, returning no matches: {}", e);
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    let mut updated_messages = messages.to_vec();
    updated_messages.push(ChatMessage {
        role: "user".to_string(),
        content: user_query.to_string(),
    });
    updated_messages.push(ChatMessage {
        role: "assistant".to_string(),
        content: reply.clone(),
    });

    Ok((
        ChatOutcome {
            reply,
            suggestions,
            providers,
        },
        updated_messages,
    ))
}
