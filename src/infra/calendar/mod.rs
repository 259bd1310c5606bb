pub mod google_calendar_store;
