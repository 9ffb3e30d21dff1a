/// Tool call module
/// HTTP calls to the Fixa tool server, unwrapping the standard
/// success/data/error envelope

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use fixa_core::{Category, Provider, Quote};

use crate::orchestration::AgentConfig;

/// Call a tool on the Fixa tool server and unwrap its data payload.
pub async fn call_server_tool(
    client: &reqwest::Client,
    server_url: &str,
    tool_name: &str,
    arguments: Value,
) -> Result<Value> {
    let url = format!("{}/tools/{}", server_url, tool_name);

    let response = client.post(&url).json(&arguments).send().await?;

    if !response.status().is_success() {
        let error_text = response.text().await?;
        return Err(anyhow!("Server error: {}", error_text));
    }

    let result: Value = response.json().await?;

    if let Some(error) = result.get("error") {
        if !error.is_null() {
            return Err(anyhow!("Tool error: {}", error));
        }
    }

    result
        .get("data")
        .cloned()
        .ok_or_else(|| anyhow!("Invalid server response"))
}

/// Search the catalog through the search-providers tool.
pub async fn search_providers(
    client: &reqwest::Client,
    config: &AgentConfig,
    query: &str,
    category: Option<Category>,
) -> Result<Vec<Provider>> {
    let arguments = json!({
        "query": query,
        "category": category.map(|c| c.label()),
    });

    let data = call_server_tool(client, &config.server_url, "search-providers", arguments).await?;
    let providers = data
        .get("providers")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    Ok(serde_json::from_value(providers)?)
}

/// Fetch the one-hour quote for a provider through the get-quote tool.
pub async fn fetch_quote(
    client: &reqwest::Client,
    config: &AgentConfig,
    provider_id: &str,
) -> Result<Quote> {
    let arguments = json!({ "provider_id": provider_id });
    let data = call_server_tool(client, &config.server_url, "get-quote", arguments).await?;
    Ok(serde_json::from_value(data)?)
}
