//! Webhook endpoints called by the payment automation workflow.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use super::payload::WebhookPayload;
use super::workflow::OnboardingService;
use crate::error::PayloadError;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub service: Arc<OnboardingService>,
}

/// `{"error": "Internal server error", "message": ...}` with a 500.
fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "Internal server error",
            "message": message,
        })),
    )
        .into_response()
}

/// POST /webhook/payment-confirmed
///
/// The body is parsed here rather than by an extractor so that malformed
/// JSON gets the same 500 body as every other failure.
async fn payment_confirmed(State(state): State<OnboardingRouteState>, body: Bytes) -> Response {
    info!(bytes = body.len(), "Received payment confirmation");

    let outcome = match WebhookPayload::from_slice(&body) {
        Ok(payload) => state.service.onboard(payload).await,
        Err(e) => Err(e.into()),
    };

    match outcome {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            error!(error = %e, "Payment confirmation error");
            internal_error(e.to_string())
        }
    }
}

/// Acknowledgement returned to the workflow once the dashboard email is out.
#[derive(Debug, Serialize)]
struct DeliveryReceipt {
    status: &'static str,
    client_id: Value,
    dashboard_url: Value,
    email_sent: bool,
    timestamp: DateTime<Utc>,
    enterprise_features_active: bool,
}

fn delivery_receipt(body: &[u8]) -> Result<DeliveryReceipt, PayloadError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PayloadError::Malformed(format!("invalid JSON body: {e}")))?;
    let Value::Object(mut fields) = value else {
        return Err(PayloadError::Malformed(
            "payload must be a JSON object".to_string(),
        ));
    };

    Ok(DeliveryReceipt {
        status: "success",
        client_id: fields.remove("client_id").unwrap_or(Value::Null),
        dashboard_url: fields.remove("dashboard_url").unwrap_or(Value::Null),
        email_sent: true,
        timestamp: Utc::now(),
        enterprise_features_active: true,
    })
}

/// POST /webhook/dashboard-delivered
///
/// Nothing is persisted; the receipt just echoes what was delivered.
async fn dashboard_delivered(body: Bytes) -> Response {
    match delivery_receipt(&body) {
        Ok(receipt) => {
            info!(client_id = %receipt.client_id, "Dashboard delivery confirmed");
            Json(receipt).into_response()
        }
        Err(e) => {
            error!(error = %e, "Dashboard delivery error");
            internal_error(e.to_string())
        }
    }
}

/// Build the webhook routes.
pub fn onboarding_routes(service: Arc<OnboardingService>) -> Router {
    Router::new()
        .route("/webhook/payment-confirmed", post(payment_confirmed))
        .route("/webhook/dashboard-delivered", post(dashboard_delivered))
        .with_state(OnboardingRouteState { service })
}
