use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use crate::domain::models::{
    ledger::{Attendee, EventRecord, Payment},
    member::Member,
};
use crate::domain::services::payment_ledger::{has_paid, record_payment};
use crate::domain::services::policy::is_eligible;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceAction {
    Join,
    Leave,
    /// Payment confirmed by the provider. Joins the payer when there is still room.
    RecordPayment(Payment),
    /// Legacy admin marker on an attendee; never grants entry by itself.
    TogglePaid { email: String },
}

/// Computes the next state of `record` for `action` performed by `actor`.
///
/// The input is never modified. Rejections leave the caller's record untouched and
/// repeated joins/leaves return a record equal to the input.
pub fn apply(
    record: &EventRecord,
    action: &AttendanceAction,
    actor: &Member,
    now: DateTime<Utc>,
) -> Result<EventRecord, AppError> {
    match action {
        AttendanceAction::Join => join(record, actor, now),
        AttendanceAction::Leave => leave(record, actor),
        AttendanceAction::RecordPayment(payment) => Ok(pay(record, payment, actor, now)),
        AttendanceAction::TogglePaid { email } => toggle_paid(record, email, now),
    }
}

fn join(record: &EventRecord, actor: &Member, now: DateTime<Utc>) -> Result<EventRecord, AppError> {
    if !is_eligible(actor, record) {
        return Err(AppError::LevelTooLow);
    }

    if record.is_attending(&actor.email) {
        debug!(event_id = %record.id, "{} already registered", actor.email);
        return Ok(record.clone());
    }

    if record.is_full() {
        return Err(AppError::CapacityExceeded);
    }

    if record.requires_payment() && !has_paid(record, &actor.email) {
        return Err(AppError::RequiresPayment);
    }

    let mut next = record.clone();
    next.attendees.push(Attendee::new(&actor.name, &actor.email, now));
    Ok(next)
}

fn leave(record: &EventRecord, actor: &Member) -> Result<EventRecord, AppError> {
    if !is_eligible(actor, record) {
        return Err(AppError::LevelTooLow);
    }

    let mut next = record.clone();
    if let Some(index) = next.attendee_index(&actor.email) {
        next.attendees.remove(index);
    }
    Ok(next)
}

fn pay(record: &EventRecord, payment: &Payment, actor: &Member, now: DateTime<Utc>) -> EventRecord {
    let mut next = record.clone();

    if !record_payment(&mut next, payment.clone()) {
        debug!(event_id = %record.id, "receipt {} already recorded", payment.receipt_id);
    }

    if next.is_attending(&actor.email) {
        return next;
    }

    // The money is already taken, so the payment is kept even when the seat can't be granted.
    if !is_eligible(actor, &next) {
        warn!(event_id = %record.id, "paid member {} is below the required level, not added", actor.email);
    } else if next.is_full() {
        warn!(event_id = %record.id, "paid member {} could not be added, event is full", actor.email);
    } else {
        next.attendees.push(Attendee::new(&actor.name, &actor.email, now));
    }

    next
}

fn toggle_paid(record: &EventRecord, email: &str, now: DateTime<Utc>) -> Result<EventRecord, AppError> {
    let mut next = record.clone();
    let index = next.attendee_index(email)
        .ok_or_else(|| AppError::UserNotFound(email.to_string()))?;

    let attendee = &mut next.attendees[index];
    attendee.paid_time = match attendee.paid_time {
        Some(_) => None,
        None => Some(now),
    };
    Ok(next)
}
