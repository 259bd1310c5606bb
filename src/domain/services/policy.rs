use crate::domain::models::{ledger::EventRecord, member::Member};

/// Sole admission rule between a member and a session: the member's tier must reach
/// the event's required tier. Callers pass the record they just fetched, never a cached one.
pub fn is_eligible(actor: &Member, record: &EventRecord) -> bool {
    actor.level >= record.required_level
}
