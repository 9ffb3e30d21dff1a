/// Booking records, quotes and receipt generation
/// Deterministic logic used both by the tool server and the session client

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Provider, Transaction, TransactionStatus};

/// Flat convenience fee added to every booking, in KES.
pub const CONVENIENCE_FEE: u32 = 50;

/// The only payment rail Fixa simulates.
pub const PAYMENT_METHOD: &str = "M-PESA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// A client's reserved engagement of a provider. Created only as the
/// simulated side effect of completing the payment sequence; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub provider_id: String,
    pub status: BookingStatus,
    pub date: String,
    pub time: String,
    /// Total amount in KES, always `price_per_hour + CONVENIENCE_FEE`.
    pub total_amount: u32,
    pub payment_status: PaymentStatus,
    pub receipt_number: String,
}

/// Price breakdown shown on the review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// One hour at the provider's rate.
    pub service_fee: u32,
    pub convenience_fee: u32,
    pub total: u32,
}

pub fn quote(price_per_hour: u32) -> Quote {
    Quote {
        service_fee: price_per_hour,
        convenience_fee: CONVENIENCE_FEE,
        total: price_per_hour + CONVENIENCE_FEE,
    }
}

/// M-PESA style receipt number, derived deterministically from the booking
/// details so the same flow always produces the same receipt.
pub fn receipt_number(provider_id: &str, client_id: &str, date: &str, time: &str) -> String {
    let seed = format!("{}-{}-{}-{}", provider_id, client_id, date, time);
    let mut acc: u32 = 0;
    for b in seed.bytes() {
        acc = acc.wrapping_mul(31).wrapping_add(u32::from(b));
    }
    format!("RH{:07X}", acc & 0x0FFF_FFFF)
}

/// Mint the confirmed booking and its successful M-PESA transaction.
pub fn confirm_booking(
    provider: &Provider,
    client_id: &str,
    date: &str,
    time: &str,
) -> (Booking, Transaction) {
    let q = quote(provider.price_per_hour);
    let receipt = receipt_number(&provider.id, client_id, date, time);

    let booking = Booking {
        id: format!("bk_{}", Uuid::new_v4()),
        client_id: client_id.to_string(),
        provider_id: provider.id.clone(),
        status: BookingStatus::Confirmed,
        date: date.to_string(),
        time: time.to_string(),
        total_amount: q.total,
        payment_status: PaymentStatus::Paid,
        receipt_number: receipt.clone(),
    };

    let transaction = Transaction {
        id: format!("txn_{}", Uuid::new_v4()),
        booking_id: booking.id.clone(),
        amount: q.total,
        method: PAYMENT_METHOD.to_string(),
        status: TransactionStatus::Success,
        timestamp: Utc::now(),
        receipt_number: Some(receipt),
    };

    (booking, transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::providers;

    #[test]
    fn quote_total_is_rate_plus_convenience_fee() {
        let q = quote(1500);
        assert_eq!(q.service_fee, 1500);
        assert_eq!(q.convenience_fee, CONVENIENCE_FEE);
        assert_eq!(q.total, 1550);
    }

    #[test]
    fn receipt_numbers_are_deterministic() {
        let a = receipt_number("p1", "u1", "Oct 24, 2023", "10:00 AM");
        let b = receipt_number("p1", "u1", "Oct 24, 2023", "10:00 AM");
        assert_eq!(a, b);
        assert!(a.starts_with("RH"));
    }

    #[test]
    fn different_bookings_get_different_receipts() {
        let a = receipt_number("p1", "u1", "Oct 24, 2023", "10:00 AM");
        let b = receipt_number("p2", "u1", "Oct 24, 2023", "10:00 AM");
        assert_ne!(a, b);
    }

    #[test]
    fn confirmed_booking_is_paid_with_matching_transaction() {
        let provider = &providers()[0];
        let (booking, txn) = confirm_booking(provider, "u1", "Oct 24, 2023", "10:00 AM");

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Paid);
        assert_eq!(booking.total_amount, provider.price_per_hour + CONVENIENCE_FEE);

        assert_eq!(txn.booking_id, booking.id);
        assert_eq!(txn.amount, booking.total_amount);
        assert_eq!(txn.method, PAYMENT_METHOD);
        assert_eq!(txn.status, TransactionStatus::Success);
        assert_eq!(txn.receipt_number.as_deref(), Some(booking.receipt_number.as_str()));
    }
}
