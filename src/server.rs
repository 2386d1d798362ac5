//! HTTP surface: merges the feature routers and adds the service manifest.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};

use crate::clients::client_routes;
use crate::config::ServiceConfig;
use crate::onboarding::{OnboardingService, onboarding_routes};
use crate::store::Database;

pub const SERVICE_NAME: &str = "AXIOM Enterprise Integration Service";

/// Features advertised on `/health`.
pub const FEATURES: &[&str] = &[
    "client_management",
    "ai_reminders",
    "progress_tracking",
    "document_hub",
];

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "features": FEATURES,
    }))
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "payment_confirmed": "/webhook/payment-confirmed",
            "dashboard_delivered": "/webhook/dashboard-delivered",
            "client_data": "/api/clients/{client_id}",
            "client_reminders": "/api/clients/{client_id}/reminders",
            "client_documents": "/api/clients/{client_id}/documents",
            "client_progress": "/api/clients/{client_id}/progress",
            "health": "/health",
        },
        "description": "Enterprise service for AXIOM dashboard delivery with full client management",
    }))
}

/// Build the complete application router.
///
/// The dashboard is hosted elsewhere, so any origin may call the API.
pub fn app_routes(db: Arc<dyn Database>, config: Arc<ServiceConfig>) -> Router {
    let service = Arc::new(OnboardingService::new(Arc::clone(&db), config));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(onboarding_routes(service))
        .merge(client_routes(db))
        .layer(cors)
}
