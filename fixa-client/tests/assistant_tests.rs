/// Integration tests for the assistant gateway's degrade-on-failure policy
/// A dead endpoint must yield the fixed apology (prose) or an empty list
/// (suggestions), never an error.

use fixa_client::{assistant_reply, smart_suggestions, AgentConfig, FALLBACK_REPLY};

/// Config pointing the gateway at an address nothing listens on.
fn dead_gateway_config() -> AgentConfig {
    AgentConfig {
        gemini_api_key: "test-key".to_string(),
        gemini_api_url: "http://127.0.0.1:9".to_string(),
        assistant_model: "gemini-3-flash-preview".to_string(),
        server_url: "http://127.0.0.1:9".to_string(),
    }
}

#[tokio::test]
async fn prose_path_degrades_to_the_fixed_apology() {
    let config = dead_gateway_config();
    let client = reqwest::Client::new();

    let reply = assistant_reply(&client, &config, "my kitchen tap is leaking").await;
    assert_eq!(reply, FALLBACK_REPLY);
}

#[tokio::test]
async fn suggestion_path_degrades_to_an_empty_list() {
    let config = dead_gateway_config();
    let client = reqwest::Client::new();

    let suggestions = smart_suggestions(&client, &config, "fix leaking tap").await;
    assert!(suggestions.is_empty());
}
