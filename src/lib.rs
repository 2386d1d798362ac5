//! AXIOM Enterprise: payment-confirmation onboarding and client dashboard API.

pub mod clients;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod server;
pub mod store;
