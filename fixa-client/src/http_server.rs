/// HTTP server wrapper for the Fixa session client
/// Exposes the assistant, catalog search and booking flow as REST endpoints
/// with an in-memory, session-keyed state map

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use fixa_core::{fixtures, Booking, BookingFlow, Category, FlowStep, Quote, Transaction};
use fixa_client::{
    process_user_query, search_providers, settle_session_payment, AgentConfig, SessionError,
    SessionManager, STK_PUSH_DELAY,
};

/// Standard API envelope
#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(session_id: String, data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            session_id: Some(session_id),
        }
    }

    fn ok_stateless(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            session_id: None,
        }
    }

    fn fail(session_id: Option<String>, error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            session_id,
        }
    }
}

fn mint_session_id() -> String {
    format!("sess_{}", uuid::Uuid::new_v4())
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Chat request from frontend
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// Chat payload: assistant prose, ranked suggestions and matching providers
#[derive(Debug, Serialize)]
struct ChatData {
    reply: String,
    suggestions: Vec<String>,
    providers: Vec<fixa_core::Provider>,
}

/// Main chat endpoint with session-based conversation management
async fn chat(
    Extension(sessions): Extension<SessionManager>,
    Json(payload): Json<ChatRequest>,
) -> impl IntoResponse {
    let session_id = payload.session_id.clone().unwrap_or_else(mint_session_id);

    tracing::info!(
        "[CHAT] Incoming request - SessionID: {}, Message length: {}",
        session_id,
        payload.message.len()
    );

    let config = match AgentConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("[CHAT] Configuration failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<ChatData>::fail(
                    Some(session_id),
                    format!("Configuration error: {}", e),
                )),
            );
        }
    };

    // Snapshot the transcript and release the map before the gateway round
    // trips so other sessions are not queued behind this one.
    let transcript = {
        let sessions_lock = sessions.lock().await;
        sessions_lock
            .get(&session_id)
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    };

    let client = reqwest::Client::new();
    match process_user_query(&client, &config, &payload.message, &transcript).await {
        Ok((outcome, updated_messages)) => {
            let mut sessions_lock = sessions.lock().await;
            let session = sessions_lock.entry(session_id.clone()).or_default();
            session.messages = updated_messages;
            drop(sessions_lock);

            tracing::info!(
                "[CHAT] Request processed - SessionID: {}, Suggestions: {}, Providers: {}",
                session_id,
                outcome.suggestions.len(),
                outcome.providers.len()
            );

            (
                StatusCode::OK,
                Json(ApiResponse::ok(
                    session_id,
                    ChatData {
                        reply: outcome.reply,
                        suggestions: outcome
                            .suggestions
                            .iter()
                            .map(|c| c.label().to_string())
                            .collect(),
                        providers: outcome.providers,
                    },
                )),
            )
        }
        Err(e) => {
            tracing::error!("[CHAT] Processing failed - SessionID: {}, Error: {}", session_id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::fail(
                    Some(session_id),
                    format!("Error processing request: {}", e),
                )),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderQuery {
    #[serde(default)]
    query: String,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProviderList {
    providers: Vec<fixa_core::Provider>,
    count: usize,
}

/// Catalog search, proxied through the tool server
async fn providers(Query(params): Query<ProviderQuery>) -> impl IntoResponse {
    let category = match params.category.as_deref() {
        None | Some("") => None,
        Some(label) => match Category::from_label(label) {
            Some(c) => Some(c),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<ProviderList>::fail(
                        None,
                        format!("Unknown category '{}'", label),
                    )),
                );
            }
        },
    };

    let config = match AgentConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::fail(None, format!("Configuration error: {}", e))),
            );
        }
    };

    let client = reqwest::Client::new();
    match search_providers(&client, &config, &params.query, category).await {
        Ok(hits) => (
            StatusCode::OK,
            Json(ApiResponse::ok_stateless(ProviderList {
                count: hits.len(),
                providers: hits,
            })),
        ),
        Err(e) => {
            tracing::error!("[PROVIDERS] Search failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::fail(None, format!("Search failed: {}", e))),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    session_id: String,
    provider_id: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReviewData {
    step: FlowStep,
    provider_name: String,
    currency: String,
    quote: Quote,
}

/// Begin the booking flow: Idle -> ReviewDetails, returning the quote
async fn booking_review(
    Extension(sessions): Extension<SessionManager>,
    Json(payload): Json<ReviewRequest>,
) -> impl IntoResponse {
    let provider = match fixtures::find_provider(&payload.provider_id) {
        Some(p) => p.clone(),
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<ReviewData>::fail(
                    Some(payload.session_id),
                    format!("Unknown provider '{}'", payload.provider_id),
                )),
            );
        }
    };

    let date = payload.date.unwrap_or_else(|| "Oct 24, 2023".to_string());
    let time = payload.time.unwrap_or_else(|| "10:00 AM".to_string());

    let mut sessions_lock = sessions.lock().await;
    let session = sessions_lock
        .entry(payload.session_id.clone())
        .or_default();

    let provider_name = provider.name.clone();
    match session.flow.begin(provider, &date, &time) {
        Ok(quote) => {
            tracing::info!(
                "[BOOKING] Review opened - SessionID: {}, Provider: {}, Total: KES {}",
                payload.session_id,
                provider_name,
                quote.total
            );
            (
                StatusCode::OK,
                Json(ApiResponse::ok(
                    payload.session_id,
                    ReviewData {
                        step: session.flow.step,
                        provider_name,
                        currency: "KES".to_string(),
                        quote,
                    },
                )),
            )
        }
        Err(e) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::fail(Some(payload.session_id), e.to_string())),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct PaymentEntryRequest {
    session_id: String,
    phone: String,
}

#[derive(Debug, Serialize)]
struct StepData {
    step: FlowStep,
}

/// ReviewDetails -> PaymentEntry with the payer's M-PESA number
async fn booking_payment(
    Extension(sessions): Extension<SessionManager>,
    Json(payload): Json<PaymentEntryRequest>,
) -> impl IntoResponse {
    let mut sessions_lock = sessions.lock().await;
    let session = match sessions_lock.get_mut(&payload.session_id) {
        Some(s) => s,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<StepData>::fail(
                    Some(payload.session_id),
                    "Unknown session".to_string(),
                )),
            );
        }
    };

    match session.flow.proceed_to_payment(&payload.phone) {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(
                payload.session_id,
                StepData {
                    step: session.flow.step,
                },
            )),
        ),
        Err(e) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::fail(Some(payload.session_id), e.to_string())),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct SessionOnlyRequest {
    session_id: String,
}

/// Cancel back to Idle from review or payment entry
async fn booking_cancel(
    Extension(sessions): Extension<SessionManager>,
    Json(payload): Json<SessionOnlyRequest>,
) -> impl IntoResponse {
    let mut sessions_lock = sessions.lock().await;
    let session = match sessions_lock.get_mut(&payload.session_id) {
        Some(s) => s,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<StepData>::fail(
                    Some(payload.session_id),
                    "Unknown session".to_string(),
                )),
            );
        }
    };

    match session.flow.cancel() {
        Ok(()) => {
            tracing::info!("[BOOKING] Flow cancelled - SessionID: {}", payload.session_id);
            (
                StatusCode::OK,
                Json(ApiResponse::ok(
                    payload.session_id,
                    StepData {
                        step: session.flow.step,
                    },
                )),
            )
        }
        Err(e) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::fail(Some(payload.session_id), e.to_string())),
        ),
    }
}

#[derive(Debug, Serialize)]
struct ConfirmationData {
    step: FlowStep,
    booking: Booking,
    transaction: Transaction,
}

/// Run the simulated STK push and confirm the booking. The push itself
/// runs with the session map unlocked; other sessions are not held up
/// behind this payer.
async fn booking_pay(
    Extension(sessions): Extension<SessionManager>,
    Json(payload): Json<SessionOnlyRequest>,
) -> impl IntoResponse {
    tracing::info!(
        "[BOOKING] STK push initiated - SessionID: {}",
        payload.session_id
    );

    match settle_session_payment(&sessions, &payload.session_id, STK_PUSH_DELAY).await {
        Ok((booking, transaction)) => {
            tracing::info!(
                "[BOOKING] Payment confirmed - SessionID: {}, Receipt: {}",
                payload.session_id,
                booking.receipt_number
            );
            (
                StatusCode::OK,
                Json(ApiResponse::ok(
                    payload.session_id,
                    ConfirmationData {
                        step: FlowStep::Confirmed,
                        booking,
                        transaction,
                    },
                )),
            )
        }
        Err(SessionError::UnknownSession) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::fail(
                Some(payload.session_id),
                "Unknown session".to_string(),
            )),
        ),
        Err(e) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::fail(Some(payload.session_id), e.to_string())),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: String,
}

#[derive(Debug, Serialize)]
struct FlowSnapshot {
    step: FlowStep,
    in_progress: bool,
    flow: BookingFlow,
}

/// Current step and flow snapshot for a session
async fn booking_state(
    Extension(sessions): Extension<SessionManager>,
    Query(params): Query<SessionQuery>,
) -> impl IntoResponse {
    let sessions_lock = sessions.lock().await;
    let flow = sessions_lock
        .get(&params.session_id)
        .map(|s| s.flow.clone())
        .unwrap_or_default();

    Json(ApiResponse::ok(
        params.session_id,
        FlowSnapshot {
            step: flow.step,
            in_progress: flow.in_progress(),
            flow,
        },
    ))
}

/// Toggle the session owner's role between client and provider
async fn toggle_role(
    Extension(sessions): Extension<SessionManager>,
    Json(payload): Json<SessionOnlyRequest>,
) -> impl IntoResponse {
    let mut sessions_lock = sessions.lock().await;
    let session = match sessions_lock.get_mut(&payload.session_id) {
        Some(s) => s,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::fail(
                    Some(payload.session_id),
                    "Unknown session".to_string(),
                )),
            );
        }
    };

    session.user.toggle_role();
    tracing::info!(
        "[PROFILE] Role toggled - SessionID: {}, Role: {:?}",
        payload.session_id,
        session.user.role
    );

    (
        StatusCode::OK,
        Json(ApiResponse::ok(payload.session_id, session.user.clone())),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let sessions: SessionManager = Arc::new(Mutex::new(HashMap::new()));

    let app = Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/providers", get(providers))
        .route("/booking/review", post(booking_review))
        .route("/booking/payment", post(booking_payment))
        .route("/booking/cancel", post(booking_cancel))
        .route("/booking/pay", post(booking_pay))
        .route("/booking/state", get(booking_state))
        .route("/profile/role", post(toggle_role))
        .layer(Extension(sessions))
        .layer(CorsLayer::permissive());

    let port = std::env::var("FIXA_CLIENT_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()?;
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[INIT] Fixa session client running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
