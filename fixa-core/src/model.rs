/// Domain model for the Fixa marketplace
/// Providers, users and payment transactions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Provider,
}

impl UserRole {
    pub fn toggled(self) -> Self {
        match self {
            UserRole::Client => UserRole::Provider,
            UserRole::Provider => UserRole::Client,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Online,
    Offline,
}

/// Session owner. The role is toggled in place by the owner; it carries no
/// authorization weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    pub avatar: String,
}

impl User {
    pub fn toggle_role(&mut self) {
        self.role = self.role.toggled();
    }
}

/// A listed service professional. Immutable within a session; sourced from
/// the static fixture list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub category: Category,
    pub rating: f64,
    pub review_count: u32,
    /// Hourly rate in KES.
    pub price_per_hour: u32,
    pub bio: String,
    pub skills: Vec<String>,
    pub is_verified: bool,
    pub distance_km: f64,
    pub availability: Availability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
    Pending,
}

/// Payment record minted alongside a confirmed booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub booking_id: String,
    /// Amount in KES.
    pub amount: u32,
    pub method: String,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
}
