/// Integration tests for the simulated M-PESA settlement
/// The payment sequence must always land in Confirmed after the delay,
/// and one session's push must not stall the rest of the session map.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use fixa_core::{fixtures, BookingStatus, FlowError, FlowStep, PaymentStatus};
use fixa_client::{settle_session_payment, SessionData, SessionError, SessionManager};

fn session_at_payment_entry() -> SessionData {
    let provider = fixtures::providers()[0].clone();
    let mut session = SessionData::default();
    session
        .flow
        .begin(provider, "Oct 24, 2023", "10:00 AM")
        .unwrap();
    session.flow.proceed_to_payment("0712 345 678").unwrap();
    session
}

fn manager_with(entries: Vec<(&str, SessionData)>) -> SessionManager {
    let map: HashMap<String, SessionData> = entries
        .into_iter()
        .map(|(id, s)| (id.to_string(), s))
        .collect();
    Arc::new(Mutex::new(map))
}

#[tokio::test]
async fn settlement_always_confirms_after_the_delay() {
    let sessions = manager_with(vec![("s1", session_at_payment_entry())]);

    let (booking, transaction) = settle_session_payment(&sessions, "s1", Duration::ZERO)
        .await
        .unwrap();

    let guard = sessions.lock().await;
    assert_eq!(guard["s1"].flow.step, FlowStep::Confirmed);
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.payment_status, PaymentStatus::Paid);
    assert_eq!(transaction.amount, booking.total_amount);
    assert_eq!(
        transaction.receipt_number.as_deref(),
        Some(booking.receipt_number.as_str())
    );
}

#[tokio::test]
async fn settlement_total_includes_the_convenience_fee() {
    let rate = fixtures::providers()[0].price_per_hour;
    let sessions = manager_with(vec![("s1", session_at_payment_entry())]);

    let (booking, _) = settle_session_payment(&sessions, "s1", Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(booking.total_amount, rate + fixa_core::CONVENIENCE_FEE);
}

#[tokio::test]
async fn settlement_requires_payment_entry() {
    let sessions = manager_with(vec![("idle", SessionData::default())]);
    let err = settle_session_payment(&sessions, "idle", Duration::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Flow(FlowError::InvalidTransition { .. })
    ));
    assert_eq!(sessions.lock().await["idle"].flow.step, FlowStep::Idle);

    // A flow still on the review step is not payable either.
    let provider = fixtures::providers()[0].clone();
    let mut reviewing = SessionData::default();
    reviewing
        .flow
        .begin(provider, "Oct 24, 2023", "10:00 AM")
        .unwrap();
    let sessions = manager_with(vec![("rev", reviewing)]);
    assert!(settle_session_payment(&sessions, "rev", Duration::ZERO)
        .await
        .is_err());
    assert_eq!(
        sessions.lock().await["rev"].flow.step,
        FlowStep::ReviewDetails
    );
}

#[tokio::test]
async fn settlement_cannot_run_twice_on_one_session() {
    let sessions = manager_with(vec![("s1", session_at_payment_entry())]);
    settle_session_payment(&sessions, "s1", Duration::ZERO)
        .await
        .unwrap();

    let err = settle_session_payment(&sessions, "s1", Duration::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Flow(FlowError::InvalidTransition { .. })
    ));
    assert_eq!(sessions.lock().await["s1"].flow.step, FlowStep::Confirmed);
}

#[tokio::test]
async fn settlement_rejects_an_unknown_session_without_creating_one() {
    let sessions = manager_with(vec![]);

    let err = settle_session_payment(&sessions, "sess_missing", Duration::ZERO)
        .await
        .unwrap_err();

    assert_eq!(err, SessionError::UnknownSession);
    assert!(sessions.lock().await.is_empty());
}

#[tokio::test]
async fn settlement_does_not_block_other_sessions() {
    let sessions = manager_with(vec![
        ("payer", session_at_payment_entry()),
        ("other", SessionData::default()),
    ]);

    let handle = {
        let sessions = sessions.clone();
        tokio::spawn(async move {
            settle_session_payment(&sessions, "payer", Duration::from_millis(500)).await
        })
    };

    // Let the push reach its sleep, then touch the other session. If the
    // map lock were held for the whole push this would queue behind it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let other_step = tokio::time::timeout(Duration::from_millis(100), async {
        sessions.lock().await["other"].flow.step
    })
    .await
    .expect("session map stayed locked during the push");
    assert_eq!(other_step, FlowStep::Idle);

    // The payer still starts processing under the lock, so a second push
    // for the same session is rejected while the first is in flight.
    let reentry = settle_session_payment(&sessions, "payer", Duration::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(reentry, SessionError::Flow(_)));

    let (booking, _) = handle.await.unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(sessions.lock().await["payer"].flow.step, FlowStep::Confirmed);
}
