/// Fixa session client library
/// Exposes the assistant gateway, tool calls and booking orchestration for
/// reuse in CLI and HTTP server modes

pub mod assistant;
pub mod orchestration;
pub mod prompts;
pub mod session;
pub mod tools;

pub use assistant::{assistant_reply, parse_suggestion_labels, smart_suggestions, FALLBACK_REPLY};
pub use orchestration::{
    process_user_query, AgentConfig, ChatMessage, ChatOutcome, STK_PUSH_DELAY,
};
pub use session::{settle_session_payment, SessionData, SessionError, SessionManager};
pub use tools::{call_server_tool, fetch_quote, search_providers};
