//! Client onboarding: from a payment-confirmation webhook to a persisted
//! client aggregate.
//!
//! The webhook payload is normalised into a `ClientInfo`, advisory content
//! is generated from it, and the client plus its reminders, documents and
//! progress metrics are written in one transaction. Re-deliveries of the
//! same confirmation resolve to the same client id and are answered from
//! the stored record.

pub mod baseline;
pub mod content;
pub mod payload;
pub mod routes;
pub mod workflow;

pub use payload::{ClientInfo, WebhookPayload};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use workflow::{OnboardingOutcome, OnboardingService};
