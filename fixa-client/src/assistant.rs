/// Assistant gateway module
/// Forwards free-text queries to the Gemini generateContent API and relays
/// the text back. Failures never propagate: the prose path degrades to a
/// fixed apology, the suggestion path to an empty list.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use fixa_core::Category;

use crate::orchestration::AgentConfig;
use crate::prompts;

/// Static reply used whenever the gateway call fails for any reason.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble connecting to my brain right now. \
     Please try again or browse our categories manually.";

/// Maximum number of category suggestions relayed to the caller.
const MAX_SUGGESTIONS: usize = 3;

/// Gemini generateContent request
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Call the Gemini API and return the first candidate's text.
async fn call_gemini(
    client: &reqwest::Client,
    config: &AgentConfig,
    message: &str,
    system_instruction: Option<&str>,
    json_response: bool,
) -> Result<String> {
    let url = format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        config.gemini_api_url.trim_end_matches('/'),
        config.assistant_model,
        config.gemini_api_key
    );

    let request = GeminiRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: message.to_string(),
            }],
        }],
        system_instruction: system_instruction.map(|text| Content {
            role: None,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }),
        generation_config: json_response.then(|| GenerationConfig {
            response_mime_type: "application/json".to_string(),
        }),
    };

    let response = client.post(&url).json(&request).send().await?;

    if !response.status().is_success() {
        let error_text = response.text().await?;
        return Err(anyhow!("Gemini API error: {}", error_text));
    }

    let gemini_response: GeminiResponse = response.json().await?;

    gemini_response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .map(|p| p.text.clone())
        .ok_or_else(|| anyhow!("No response from the model"))
}

/// Forward a free-text query and relay the model's prose answer.
/// Never returns an error; any failure yields the fixed apology string.
pub async fn assistant_reply(
    client: &reqwest::Client,
    config: &AgentConfig,
    message: &str,
) -> String {
    match call_gemini(
        client,
        config,
        message,
        Some(prompts::ASSISTANT_SYSTEM_PROMPT),
        false,
    )
    .await
    {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => FALLBACK_REPLY.to_string(),
        Err(e) => {
            tracing::warn!("[ASSISTANT] Gateway call failed, degrading to fallback: {}", e);
            FALLBACK_REPLY.to_string()
        }
    }
}

/// Ask for up to three relevant categories for a search query.
/// Never returns an error; any failure yields an empty list.
pub async fn smart_suggestions(
    client: &reqwest::Client,
    config: &AgentConfig,
    query: &str,
) -> Vec<Category> {
    match call_gemini(client, config, &prompts::suggestion_prompt(query), None, true).await {
        Ok(text) => parse_suggestion_labels(&text),
        Err(e) => {
            tracing::warn!("[ASSISTANT] Suggestion call failed, returning no suggestions: {}", e);
            Vec::new()
        }
    }
}

/// Validate the model's JSON array of labels against the category
/// enumeration. Order is preserved, duplicates dropped, at most
/// `MAX_SUGGESTIONS` kept. Anything unparseable yields an empty list.
pub fn parse_suggestion_labels(text: &str) -> Vec<Category> {
    let labels: Vec<String> = match serde_json::from_str(text.trim()) {
        Ok(labels) => labels,
        Err(_) => return Vec::new(),
    };

    let mut suggestions = Vec::new();
    for label in labels {
        if let Some(category) = Category::from_label(&label) {
            if !suggestions.contains(&category) {
                suggestions.push(category);
            }
        }
    }
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_validated_and_ranked() {
        let parsed = parse_suggestion_labels(r#"["Plumbing", "Electrical", "Cleaning"]"#);
        assert_eq!(
            parsed,
            vec![Category::Plumbing, Category::Electrical, Category::Cleaning]
        );
    }

    #[test]
    fn unknown_labels_are_discarded() {
        let parsed = parse_suggestion_labels(r#"["Gardening", "plumbing", "Roofing"]"#);
        assert_eq!(parsed, vec![Category::Plumbing]);
    }

    #[test]
    fn suggestions_are_capped_at_three() {
        let parsed = parse_suggestion_labels(
            r#"["Plumbing", "Electrical", "Cleaning", "Carpentry", "Mechanic"]"#,
        );
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn duplicates_are_dropped() {
        let parsed = parse_suggestion_labels(r#"["Plumbing", "PLUMBING", "plumbing"]"#);
        assert_eq!(parsed, vec![Category::Plumbing]);
    }

    #[test]
    fn junk_yields_an_empty_list() {
        assert!(parse_suggestion_labels("not json at all").is_empty());
        assert!(parse_suggestion_labels(r#"{"categories": []}"#).is_empty());
        assert!(parse_suggestion_labels("").is_empty());
    }
}
