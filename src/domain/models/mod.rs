pub mod auth;
pub mod ledger;
pub mod member;
pub mod occurrence;
