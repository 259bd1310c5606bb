use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{LedgerStore, MemberDirectory};
use crate::domain::services::{attendance_service::AttendanceService, record_codec::RecordCodec};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub member_directory: Arc<dyn MemberDirectory>,
    pub attendance: Arc<AttendanceService>,
}

impl AppState {
    pub fn new(config: Config, ledger_store: Arc<dyn LedgerStore>, member_directory: Arc<dyn MemberDirectory>) -> Self {
        let attendance = Arc::new(AttendanceService::new(
            ledger_store,
            member_directory.clone(),
            RecordCodec::new(config.default_capacity),
            config.upcoming_limit,
        ));

        Self {
            config,
            member_directory,
            attendance,
        }
    }
}
