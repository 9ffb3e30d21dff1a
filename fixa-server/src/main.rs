/// Fixa Tool Server - Catalog & Booking Service
///
/// Exposes the marketplace catalog and booking operations as JSON tools
/// over HTTP:
/// - POST /tools/search-providers
/// - POST /tools/get-quote
/// - POST /tools/book-service
/// - GET /tools - List all tools

use anyhow::Result;
use axum::{
    extract::Json,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use fixa_core::{
    booking, catalog, fixtures, Booking, Category, Provider, Quote,
};

/// Search Tool Request
#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    category: Option<String>,
}

/// Search Tool Response
#[derive(Debug, Serialize)]
struct SearchResponse {
    providers: Vec<Provider>,
    count: usize,
}

/// Quote Tool Request
#[derive(Debug, Deserialize)]
struct QuoteRequest {
    provider_id: String,
}

/// Quote Tool Response
#[derive(Debug, Serialize)]
struct QuoteResponse {
    provider_id: String,
    currency: String,
    #[serde(flatten)]
    quote: Quote,
}

/// Booking Tool Request
#[derive(Debug, Deserialize)]
struct BookRequest {
    provider_id: String,
    client_id: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

/// Booking Tool Response
#[derive(Debug, Serialize)]
struct BookResponse {
    booking: Booking,
    receipt_number: String,
}

/// Tool Definition
#[derive(Debug, Serialize)]
struct ToolDefinition {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: serde_json::Value,
}

/// Tools List Response
#[derive(Debug, Serialize)]
struct ToolsResponse {
    tools: Vec<ToolDefinition>,
}

/// Standard Tool Response
#[derive(Debug, Serialize)]
struct ToolResponse<T: Serialize> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ToolResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn tool_error(error: String) -> ToolResponse<()> {
    ToolResponse {
        success: false,
        data: None,
        error: Some(error),
    }
}

/// Health check endpoint
async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy"}))
}

/// List all available tools
async fn list_tools() -> Json<ToolsResponse> {
    tracing::info!("[LIST TOOLS] Received request to list available tools");
    Json(ToolsResponse {
        tools: vec![
            ToolDefinition {
                name: "search-providers".to_string(),
                description: "Search service providers by free text and category".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Free-text query matched against provider name and category (optional)"
                        },
                        "category": {
                            "type": "string",
                            "description": "Exact category label, e.g. Plumbing, Electrical (optional)",
                            "enum": Category::ALL.iter().map(|c| c.label()).collect::<Vec<_>>()
                        }
                    }
                }),
            },
            ToolDefinition {
                name: "get-quote".to_string(),
                description: "Get the one-hour price breakdown for a provider".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "provider_id": {
                            "type": "string",
                            "description": "Provider identifier, e.g. p1"
                        }
                    },
                    "required": ["provider_id"]
                }),
            },
            ToolDefinition {
                name: "book-service".to_string(),
                description: "Book a provider and generate the paid booking record".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "provider_id": {
                            "type": "string",
                            "description": "Provider identifier"
                        },
                        "client_id": {
                            "type": "string",
                            "description": "Client identifier"
                        },
                        "date": {
                            "type": "string",
                            "description": "Booking date (optional, defaults to the demo slot)"
                        },
                        "time": {
                            "type": "string",
                            "description": "Booking time (optional, defaults to the demo slot)"
                        }
                    },
                    "required": ["provider_id", "client_id"]
                }),
            },
        ],
    })
}

/// Search providers by free text and category
async fn search_providers(
    Json(req): Json<SearchRequest>,
) -> Result<Json<ToolResponse<SearchResponse>>, (StatusCode, Json<ToolResponse<()>>)> {
    tracing::info!(
        "[SEARCH-PROVIDERS] Tool call received: query={:?}, category={:?}",
        req.query,
        req.category
    );

    let category = match req.category.as_deref() {
        None | Some("") => None,
        Some(label) => match Category::from_label(label) {
            Some(c) => Some(c),
            None => {
                tracing::warn!("[SEARCH-PROVIDERS] Validation failed: unknown category '{}'", label);
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(tool_error(format!(
                        "Unknown category '{}'. Expected one of: {}",
                        label,
                        Category::ALL
                            .iter()
                            .map(|c| c.label())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))),
                ));
            }
        },
    };

    let hits: Vec<Provider> = catalog::filter_providers(fixtures::providers(), &req.query, category)
        .into_iter()
        .cloned()
        .collect();

    // An empty result is a valid, displayable state.
    tracing::info!("[SEARCH-PROVIDERS] Returning {} providers", hits.len());

    Ok(Json(ToolResponse::ok(SearchResponse {
        count: hits.len(),
        providers: hits,
    })))
}

/// Get the one-hour quote for a provider
async fn get_quote(
    Json(req): Json<QuoteRequest>,
) -> Result<Json<ToolResponse<QuoteResponse>>, (StatusCode, Json<ToolResponse<()>>)> {
    tracing::info!("[GET-QUOTE] Tool call received: provider_id={}", req.provider_id);

    if req.provider_id.is_empty() {
        tracing::warn!("[GET-QUOTE] Validation failed: provider_id is missing");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(tool_error(
                "Missing required field: 'provider_id' (e.g. p1)".to_string(),
            )),
        ));
    }

    let provider = match fixtures::find_provider(&req.provider_id) {
        Some(p) => p,
        None => {
            tracing::warn!("[GET-QUOTE] Unknown provider '{}'", req.provider_id);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(tool_error(format!("Unknown provider '{}'", req.provider_id))),
            ));
        }
    };

    let quote = booking::quote(provider.price_per_hour);
    tracing::info!(
        "[GET-QUOTE] Quote for {}: KES {} (service {} + convenience {})",
        provider.name,
        quote.total,
        quote.service_fee,
        quote.convenience_fee
    );

    Ok(Json(ToolResponse::ok(QuoteResponse {
        provider_id: req.provider_id,
        currency: "KES".to_string(),
        quote,
    })))
}

/// Book a provider and mint the paid booking record
async fn book_service(
    Json(req): Json<BookRequest>,
) -> Result<Json<ToolResponse<BookResponse>>, (StatusCode, Json<ToolResponse<()>>)> {
    tracing::info!(
        "[BOOK-SERVICE] Tool call received: provider_id={}, client_id={}",
        req.provider_id,
        req.client_id
    );

    let mut missing_fields = Vec::new();
    if req.provider_id.is_empty() {
        missing_fields.push("'provider_id' (provider identifier, e.g. p1)");
    }
    if req.client_id.is_empty() {
        missing_fields.push("'client_id' (client identifier)");
    }
    if !missing_fields.is_empty() {
        tracing::warn!("[BOOK-SERVICE] Validation failed: missing {}", missing_fields.join(", "));
        return Err((
            StatusCode::BAD_REQUEST,
            Json(tool_error(format!(
                "Missing required fields: {}",
                missing_fields.join(", ")
            ))),
        ));
    }

    let provider = match fixtures::find_provider(&req.provider_id) {
        Some(p) => p,
        None => {
            tracing::warn!("[BOOK-SERVICE] Unknown provider '{}'", req.provider_id);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(tool_error(format!("Unknown provider '{}'", req.provider_id))),
            ));
        }
    };

    let date = req.date.unwrap_or_else(|| "Oct 24, 2023".to_string());
    let time = req.time.unwrap_or_else(|| "10:00 AM".to_string());

    let (booking, _transaction) = booking::confirm_booking(provider, &req.client_id, &date, &time);
    tracing::info!(
        "[BOOK-SERVICE] Booking confirmed: id={}, receipt={}, total=KES {}",
        booking.id,
        booking.receipt_number,
        booking.total_amount
    );

    Ok(Json(ToolResponse::ok(BookResponse {
        receipt_number: booking.receipt_number.clone(),
        booking,
    })))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/search-providers", post(search_providers))
        .route("/tools/get-quote", post(get_quote))
        .route("/tools/book-service", post(book_service))
        .layer(CorsLayer::permissive());

    // Get port from environment variable or use default
    let port = std::env::var("FIXA_SERVER_PORT")
        .unwrap_or_else(|_| "8001".to_string())
        .parse::<u16>()?;
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("[INIT] Fixa tool server running on http://{}", addr);
    tracing::info!("  GET  /tools                    — List all tools");
    tracing::info!("  POST /tools/search-providers   — Search the catalog");
    tracing::info!("  POST /tools/get-quote          — Price breakdown for a provider");
    tracing::info!("  POST /tools/book-service       — Book a provider");

    axum::serve(listener, app).await?;

    Ok(())
}
