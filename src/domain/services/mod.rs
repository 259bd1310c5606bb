pub mod attendance;
pub mod attendance_service;
pub mod occurrence_locks;
pub mod payment_ledger;
pub mod policy;
pub mod record_codec;
