/// Session state shared by the HTTP front: the session owner, the chat
/// transcript and the booking flow, keyed by session id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use fixa_core::{Booking, BookingFlow, FlowError, Transaction, User, UserRole};

use crate::orchestration::ChatMessage;

#[derive(Debug, Clone)]
pub struct SessionData {
    pub user: User,
    pub messages: Vec<ChatMessage>,
    pub flow: BookingFlow,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            user: User {
                id: "u1".to_string(),
                name: "Kevin Otieno".to_string(),
                phone: "+254700000000".to_string(),
                role: UserRole::Client,
                avatar: "https://picsum.photos/seed/user1/100/100".to_string(),
            },
            messages: Vec::new(),
            flow: BookingFlow::default(),
        }
    }
}

/// Session manager for storing conversation and flow state across requests
pub type SessionManager = Arc<Mutex<HashMap<String, SessionData>>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown session")]
    UnknownSession,
    #[error(transparent)]
    Flow(#[from] FlowError),
}

/// Run the simulated STK push for a session whose flow sits in payment
/// entry. The flow is moved to Processing under the session-map lock, the
/// lock is released for the duration of the push so other sessions keep
/// moving, then re-acquired to confirm. Re-entry while the push is in
/// flight is rejected by the flow itself (Processing accepts no second
/// start). The confirmation is unconditional; there is no failure branch,
/// timeout or retry.
pub async fn settle_session_payment(
    sessions: &SessionManager,
    session_id: &str,
    delay: Duration,
) -> Result<(Booking, Transaction), SessionError> {
    let client_id = {
        let mut guard = sessions.lock().await;
        let session = guard
            .get_mut(session_id)
            .ok_or(SessionError::UnknownSession)?;
        session.flow.start_processing()?;
        session.user.id.clone()
    };

    tokio::time::sleep(delay).await;

    let mut guard = sessions.lock().await;
    let session = guard
        .get_mut(session_id)
        .ok_or(SessionError::UnknownSession)?;
    Ok(session.flow.confirm(&client_id)?)
}
