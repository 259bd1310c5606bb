pub mod attendance;
pub mod event;
pub mod health;
pub mod member;
pub mod payment;
