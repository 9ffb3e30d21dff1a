/// Booking flow state machine
/// A strictly linear, session-local progression:
/// Idle -> ReviewDetails -> PaymentEntry -> Processing -> Confirmed,
/// with cancel back to Idle from the two entry steps.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booking::{self, Booking, Quote};
use crate::model::{Provider, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    Idle,
    ReviewDetails,
    PaymentEntry,
    Processing,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("a booking is already in progress (current step: {0:?})")]
    AlreadyInProgress(FlowStep),
    #[error("cannot {action} from step {step:?}")]
    InvalidTransition { action: &'static str, step: FlowStep },
}

/// Session-local booking flow. At most one flow is in progress at a time;
/// reopening a finished flow resets it to the initial state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingFlow {
    pub step: FlowStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self {
            step: FlowStep::Idle,
            provider: None,
            date: String::new(),
            time: String::new(),
            quote: None,
            payer_phone: None,
            booking: None,
            transaction: None,
        }
    }
}

impl BookingFlow {
    /// Idle (or Confirmed, which re-opens the flow) -> ReviewDetails.
    /// Starting while another flow is active is an error: one at a time.
    pub fn begin(&mut self, provider: Provider, date: &str, time: &str) -> Result<Quote, FlowError> {
        match self.step {
            FlowStep::Idle | FlowStep::Confirmed => {}
            step => return Err(FlowError::AlreadyInProgress(step)),
        }

        *self = Self::default();
        let q = booking::quote(provider.price_per_hour);
        self.provider = Some(provider);
        self.date = date.to_string();
        self.time = time.to_string();
        self.quote = Some(q);
        self.step = FlowStep::ReviewDetails;
        Ok(q)
    }

    /// ReviewDetails -> PaymentEntry, capturing the payer's M-PESA number.
    pub fn proceed_to_payment(&mut self, phone: &str) -> Result<(), FlowError> {
        if self.step != FlowStep::ReviewDetails {
            return Err(FlowError::InvalidTransition {
                action: "enter payment",
                step: self.step,
            });
        }
        self.payer_phone = Some(phone.to_string());
        self.step = FlowStep::PaymentEntry;
        Ok(())
    }

    /// ReviewDetails/PaymentEntry -> Idle, discarding all flow data.
    pub fn cancel(&mut self) -> Result<(), FlowError> {
        match self.step {
            FlowStep::ReviewDetails | FlowStep::PaymentEntry => {
                *self = Self::default();
                Ok(())
            }
            step => Err(FlowError::InvalidTransition {
                action: "cancel",
                step,
            }),
        }
    }

    /// PaymentEntry -> Processing. The caller owns the simulated STK push
    /// delay and must follow up with `confirm`.
    pub fn start_processing(&mut self) -> Result<(), FlowError> {
        if self.step != FlowStep::PaymentEntry {
            return Err(FlowError::InvalidTransition {
                action: "process payment",
                step: self.step,
            });
        }
        self.step = FlowStep::Processing;
        Ok(())
    }

    /// Processing -> Confirmed. Mints the booking and its transaction.
    pub fn confirm(&mut self, client_id: &str) -> Result<(Booking, Transaction), FlowError> {
        if self.step != FlowStep::Processing {
            return Err(FlowError::InvalidTransition {
                action: "confirm",
                step: self.step,
            });
        }
        let provider = self.provider.as_ref().ok_or(FlowError::InvalidTransition {
            action: "confirm",
            step: self.step,
        })?;

        let (booking, transaction) =
            booking::confirm_booking(provider, client_id, &self.date, &self.time);
        self.booking = Some(booking.clone());
        self.transaction = Some(transaction.clone());
        self.step = FlowStep::Confirmed;
        Ok((booking, transaction))
    }

    pub fn in_progress(&self) -> bool {
        !matches!(self.step, FlowStep::Idle | FlowStep::Confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{BookingStatus, PaymentStatus, CONVENIENCE_FEE};
    use crate::fixtures::providers;

    fn plumber() -> Provider {
        providers()[0].clone()
    }

    #[test]
    fn happy_path_runs_idle_to_confirmed() {
        let mut flow = BookingFlow::default();
        let quote = flow.begin(plumber(), "Oct 24, 2023", "10:00 AM").unwrap();
        assert_eq!(flow.step, FlowStep::ReviewDetails);
        assert_eq!(quote.total, plumber().price_per_hour + CONVENIENCE_FEE);

        flow.proceed_to_payment("0712 345 678").unwrap();
        assert_eq!(flow.step, FlowStep::PaymentEntry);

        flow.start_processing().unwrap();
        assert_eq!(flow.step, FlowStep::Processing);

        let (booking, txn) = flow.confirm("u1").unwrap();
        assert_eq!(flow.step, FlowStep::Confirmed);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Paid);
        assert_eq!(txn.amount, booking.total_amount);
    }

    #[test]
    fn only_one_flow_in_progress_per_session() {
        let mut flow = BookingFlow::default();
        flow.begin(plumber(), "Oct 24, 2023", "10:00 AM").unwrap();

        let err = flow.begin(plumber(), "Oct 25, 2023", "11:00 AM").unwrap_err();
        assert_eq!(err, FlowError::AlreadyInProgress(FlowStep::ReviewDetails));
    }

    #[test]
    fn cancel_from_review_and_payment_resets_to_idle() {
        let mut flow = BookingFlow::default();
        flow.begin(plumber(), "Oct 24, 2023", "10:00 AM").unwrap();
        flow.cancel().unwrap();
        assert_eq!(flow.step, FlowStep::Idle);
        assert!(flow.provider.is_none());
        assert!(flow.quote.is_none());

        flow.begin(plumber(), "Oct 24, 2023", "10:00 AM").unwrap();
        flow.proceed_to_payment("0712 345 678").unwrap();
        flow.cancel().unwrap();
        assert_eq!(flow.step, FlowStep::Idle);
        assert!(flow.payer_phone.is_none());
    }

    #[test]
    fn cancel_is_rejected_outside_review_and_payment() {
        let mut flow = BookingFlow::default();
        assert!(flow.cancel().is_err());

        flow.begin(plumber(), "Oct 24, 2023", "10:00 AM").unwrap();
        flow.proceed_to_payment("0712 345 678").unwrap();
        flow.start_processing().unwrap();
        assert!(flow.cancel().is_err());
    }

    #[test]
    fn reopening_after_confirmation_resets_the_flow() {
        let mut flow = BookingFlow::default();
        flow.begin(plumber(), "Oct 24, 2023", "10:00 AM").unwrap();
        flow.proceed_to_payment("0712 345 678").unwrap();
        flow.start_processing().unwrap();
        flow.confirm("u1").unwrap();
        assert_eq!(flow.step, FlowStep::Confirmed);

        // A confirmed flow can be reopened; nothing from the previous booking
        // leaks into the new one.
        flow.begin(plumber(), "Nov 01, 2023", "09:00 AM").unwrap();
        assert_eq!(flow.step, FlowStep::ReviewDetails);
        assert!(flow.booking.is_none());
        assert!(flow.transaction.is_none());
        assert!(flow.payer_phone.is_none());
    }

    #[test]
    fn transitions_must_happen_in_order() {
        let mut flow = BookingFlow::default();
        assert!(flow.proceed_to_payment("0712 345 678").is_err());
        assert!(flow.start_processing().is_err());
        assert!(flow.confirm("u1").is_err());
    }
}
