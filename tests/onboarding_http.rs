//! Integration tests for the webhook + dashboard REST surface.
//!
//! Each test spins up the real Axum router on a random port backed by an
//! in-memory database and exercises it over HTTP.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use axiom_enterprise::config::ServiceConfig;
use axiom_enterprise::server::app_routes;
use axiom_enterprise::store::{Database, LibSqlBackend};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Start an Axum server on a random port, return (base_url, db).
async fn start_server() -> (String, Arc<dyn Database>) {
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let config = Arc::new(ServiceConfig {
        dashboard_base_url: "https://dash.test".to_string(),
        ..ServiceConfig::default()
    });
    let app = app_routes(Arc::clone(&db), config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), db)
}

fn checkout_payload() -> Value {
    json!({
        "stripe_data": {
            "id": "cs_test_a1",
            "customer_email": "cfo@globex.test",
            "customer_details": {"name": "Hank Scorpio"},
            "metadata": {
                "company_name": "Globex Corp",
                "industry": "Technology",
                "complexity_score": "50"
            }
        }
    })
}

async fn post_json(base: &str, path: &str, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(body)
        .send()
        .await
        .unwrap()
}

// ── Webhooks ─────────────────────────────────────────────────────────

#[tokio::test]
async fn payment_confirmed_creates_client() {
    timeout(TEST_TIMEOUT, async {
        let (base, db) = start_server().await;

        let resp = post_json(&base, "/webhook/payment-confirmed", &checkout_payload()).await;
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["client_id"], "globex-corp-cs_test_a1");
        assert_eq!(body["dashboard_url"], "https://dash.test/client/globex-corp-cs_test_a1");
        assert_eq!(body["customer_email"], "cfo@globex.test");
        assert_eq!(body["client_name"], "Globex Corp");
        assert_eq!(body["payment_intent_id"], "cs_test_a1");
        assert!(
            body["access_token"]
                .as_str()
                .unwrap()
                .starts_with("axiom_globex-corp-cs_test_a1_")
        );
        assert_eq!(body["enterprise_features"]["ai_reminders"], true);
        assert_eq!(body["enterprise_features"]["document_hub"], true);

        assert!(db.get_client("globex-corp-cs_test_a1").await.unwrap().is_some());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn payment_confirmed_is_idempotent() {
    timeout(TEST_TIMEOUT, async {
        let (base, db) = start_server().await;

        let first: Value = post_json(&base, "/webhook/payment-confirmed", &checkout_payload())
            .await
            .json()
            .await
            .unwrap();
        let resp = post_json(&base, "/webhook/payment-confirmed", &checkout_payload()).await;
        assert_eq!(resp.status(), 200);
        let second: Value = resp.json().await.unwrap();

        assert_eq!(second["status"], "existing_client");
        assert_eq!(second["client_id"], first["client_id"]);
        assert_eq!(second["created_at"], first["created_at"]);
        assert_ne!(second["access_token"], first["access_token"]);

        let id = "globex-corp-cs_test_a1";
        assert_eq!(db.list_reminders(id).await.unwrap().len(), 3);
        assert_eq!(db.list_documents(id).await.unwrap().len(), 3);
        assert_eq!(db.list_progress_metrics(id).await.unwrap().len(), 4);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn legacy_payload_is_onboarded_as_technology() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server().await;

        let payload = json!({
            "client_name": "Acme Corp",
            "customer_email": "ops@acme.test",
            "project_id": "proj-7",
            "payment_intent_id": "pi_77"
        });
        let body: Value = post_json(&base, "/webhook/payment-confirmed", &payload)
            .await
            .json()
            .await
            .unwrap();
        assert_eq!(body["client_id"], "acme-corp-proj-7");
        assert_eq!(body["payment_intent_id"], "pi_77");

        let client: Value = reqwest::get(format!("{base}/api/clients/acme-corp-proj-7"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(client["data"]["industry"], "Technology");
        assert_eq!(client["data"]["complexity_score"], 43);
        assert_eq!(client["data"]["mentor"]["name"], "Alex Chen");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_payment_body_is_internal_error() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server().await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/webhook/payment-confirmed"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert!(body["message"].as_str().unwrap().contains("invalid JSON body"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn invalid_complexity_score_is_internal_error() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server().await;

        let payload = json!({"stripe_data": {"id": "cs_1", "metadata": {"complexity_score": "high"}}});
        let resp = post_json(&base, "/webhook/payment-confirmed", &payload).await;
        assert_eq!(resp.status(), 500);

        let body: Value = resp.json().await.unwrap();
        assert!(body["message"].as_str().unwrap().contains("complexity_score"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn dashboard_delivered_echoes_receipt() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server().await;

        let payload = json!({"client_id": "acme-1", "dashboard_url": "https://dash.test/client/acme-1"});
        let resp = post_json(&base, "/webhook/dashboard-delivered", &payload).await;
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["client_id"], "acme-1");
        assert_eq!(body["email_sent"], true);
        assert_eq!(body["enterprise_features_active"], true);
        assert!(body["timestamp"].is_string());
    })
    .await
    .expect("test timed out");
}

// ── Client reads ─────────────────────────────────────────────────────

#[tokio::test]
async fn client_and_collections_are_readable() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server().await;
        post_json(&base, "/webhook/payment-confirmed", &checkout_payload()).await;
        let id = "globex-corp-cs_test_a1";

        let resp = reqwest::get(format!("{base}/api/clients/{id}")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let client: Value = resp.json().await.unwrap();
        assert_eq!(client["success"], true);
        let data = &client["data"];
        assert_eq!(data["client_name"], "Globex Corp");
        assert_eq!(data["assessment_summary"]["ai_confidence"], "85.0%");
        assert_eq!(data["assessment_summary"]["processing_time"], "3m");
        assert_eq!(data["assessment_summary"]["solutions_count"], 3);
        let challenge_ids: Vec<i64> = data["current_challenges"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(challenge_ids, vec![1, 2, 3]);
        assert_eq!(data["recommended_solutions"][0]["complexity_reduction"], "40%");

        let reminders: Value = reqwest::get(format!("{base}/api/clients/{id}/reminders"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(reminders["success"], true);
        let reminders = reminders["data"].as_array().unwrap();
        assert_eq!(reminders.len(), 3);
        assert!(reminders.iter().all(|r| r["client_id"] == id && r["status"] == "active"));

        let documents: Value = reqwest::get(format!("{base}/api/clients/{id}/documents"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let documents = documents["data"].as_array().unwrap();
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[2]["title"], "Technology Industry Best Practices");
        assert_eq!(documents[0]["view_count"], 0);

        let progress: Value = reqwest::get(format!("{base}/api/clients/{id}/progress"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let progress = progress["data"].as_array().unwrap();
        assert_eq!(progress.len(), 4);
        assert_eq!(progress[0]["metric_name"], "Implementation Progress");
        assert_eq!(progress[0]["metric_value"], 50.0);
        assert_eq!(progress[2]["metric_value"], 70.0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unknown_client_is_404_but_collections_are_empty() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server().await;

        let resp = reqwest::get(format!("{base}/api/clients/nobody-1")).await.unwrap();
        assert_eq!(resp.status(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Client not found");

        for collection in ["reminders", "documents", "progress"] {
            let resp = reqwest::get(format!("{base}/api/clients/nobody-1/{collection}"))
                .await
                .unwrap();
            assert_eq!(resp.status(), 200, "{collection}");
            let body: Value = resp.json().await.unwrap();
            assert_eq!(body["success"], true);
            assert!(body["data"].as_array().unwrap().is_empty());
        }
    })
    .await
    .expect("test timed out");
}

// ── Service manifest ─────────────────────────────────────────────────

#[tokio::test]
async fn health_and_root_manifests() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server().await;

        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "AXIOM Enterprise Integration Service");
        assert_eq!(body["version"], "2.0.0");
        assert_eq!(body["features"].as_array().unwrap().len(), 4);

        let body: Value = reqwest::get(format!("{base}/")).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], "running");
        assert_eq!(body["endpoints"]["payment_confirmed"], "/webhook/payment-confirmed");
        assert_eq!(body["endpoints"]["health"], "/health");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server().await;

        let resp = reqwest::Client::new()
            .get(format!("{base}/health"))
            .header("origin", "https://dashboard.example.com")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );

        let preflight = reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, format!("{base}/webhook/payment-confirmed"))
            .header("origin", "https://dashboard.example.com")
            .header("access-control-request-method", "POST")
            .send()
            .await
            .unwrap();
        assert!(preflight.status().is_success());
    })
    .await
    .expect("test timed out");
}
