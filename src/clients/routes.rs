//! REST endpoints the dashboard reads client data from.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::warn;

use super::query::ClientQuery;
use crate::error::DatabaseError;
use crate::store::Database;

/// Shared state for client routes.
#[derive(Clone)]
pub struct ClientRouteState {
    pub query: ClientQuery,
}

/// `{"success": true, "data": ...}`
#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

fn ok<T: Serialize>(data: T) -> Response {
    Json(Envelope {
        success: true,
        data,
    })
    .into_response()
}

fn failure(client_id: &str, err: DatabaseError) -> Response {
    let (status, message) = match err {
        DatabaseError::NotFound { .. } => (StatusCode::NOT_FOUND, "Client not found".to_string()),
        other => {
            warn!(client_id, error = %other, "Client read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    };
    (
        status,
        Json(serde_json::json!({"success": false, "error": message})),
    )
        .into_response()
}

/// GET /api/clients/{client_id}
async fn get_client(
    State(state): State<ClientRouteState>,
    Path(client_id): Path<String>,
) -> Response {
    match state.query.client(&client_id).await {
        Ok(client) => ok(client.view()),
        Err(e) => failure(&client_id, e),
    }
}

/// GET /api/clients/{client_id}/reminders
async fn get_reminders(
    State(state): State<ClientRouteState>,
    Path(client_id): Path<String>,
) -> Response {
    match state.query.reminders(&client_id).await {
        Ok(reminders) => ok(reminders),
        Err(e) => failure(&client_id, e),
    }
}

/// GET /api/clients/{client_id}/documents
async fn get_documents(
    State(state): State<ClientRouteState>,
    Path(client_id): Path<String>,
) -> Response {
    match state.query.documents(&client_id).await {
        Ok(documents) => ok(documents),
        Err(e) => failure(&client_id, e),
    }
}

/// GET /api/clients/{client_id}/progress
async fn get_progress(
    State(state): State<ClientRouteState>,
    Path(client_id): Path<String>,
) -> Response {
    match state.query.progress(&client_id).await {
        Ok(metrics) => ok(metrics),
        Err(e) => failure(&client_id, e),
    }
}

/// Build the client read routes.
pub fn client_routes(db: Arc<dyn Database>) -> Router {
    let state = ClientRouteState {
        query: ClientQuery::new(db),
    };

    Router::new()
        .route("/api/clients/{client_id}", get(get_client))
        .route("/api/clients/{client_id}/reminders", get(get_reminders))
        .route("/api/clients/{client_id}/documents", get(get_documents))
        .route("/api/clients/{client_id}/progress", get(get_progress))
        .with_state(state)
}
