use crate::domain::models::ledger::{emails_match, EventRecord, Payment};

/// Whether the user holds at least one payment for this occurrence.
pub fn has_paid(record: &EventRecord, email: &str) -> bool {
    record.payments.iter().any(|p| emails_match(&p.email, email))
}

/// Appends the payment and reports whether the record changed.
///
/// Every receipt stays on the ledger, so one user may accumulate several entries.
/// A receipt that is already recorded for the same user is a replayed webhook and
/// leaves the record as it is.
pub fn record_payment(record: &mut EventRecord, payment: Payment) -> bool {
    let replayed = !payment.receipt_id.is_empty()
        && record.payments.iter().any(|p| {
            p.receipt_id == payment.receipt_id && emails_match(&p.email, &payment.email)
        });

    if replayed {
        return false;
    }

    record.payments.push(payment);
    true
}
