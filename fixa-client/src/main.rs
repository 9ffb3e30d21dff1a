/// Interactive CLI for the Fixa session client
/// Free-text queries go to the assistant; matching providers are listed
/// from the tool server.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use fixa_client::{fetch_quote, process_user_query, AgentConfig, ChatMessage};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = AgentConfig::from_env()?;
    let client = reqwest::Client::new();
    let mut messages: Vec<ChatMessage> = Vec::new();

    println!("Fixa Assistant — describe your problem, e.g. 'fix leaking tap'.");
    println!("Type 'quote <provider-id>' for a price breakdown, 'quit' to exit.\n");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") || query.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Some(provider_id) = query.strip_prefix("quote ") {
            match fetch_quote(&client, &config, provider_id.trim()).await {
                Ok(quote) => println!(
                    "\nService fee KES {} + convenience fee KES {} = KES {}\n",
                    quote.service_fee, quote.convenience_fee, quote.total
                ),
                Err(e) => println!("\nCould not fetch quote: {}\n", e),
            }
            continue;
        }

        let (outcome, updated_messages) =
            process_user_query(&client, &config, query, &messages).await?;
        messages = updated_messages;

        println!("\n{}\n", outcome.reply);

        if !outcome.suggestions.is_empty() {
            let labels: Vec<&str> = outcome.suggestions.iter().map(|c| c.label()).collect();
            println!("Suggested categories: {}", labels.join(", "));
        }

        for provider in &outcome.providers {
            println!(
                "  {} — {} | {:.1}★ ({}) | KES {}/hr | {:.1} km",
                provider.id,
                provider.name,
                provider.rating,
                provider.review_count,
                provider.price_per_hour,
                provider.distance_km
            );
        }
        if !outcome.providers.is_empty() {
            println!();
        }
    }

    Ok(())
}
