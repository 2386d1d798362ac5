//! Onboarding workflow: turns a payment confirmation into a persisted
//! client aggregate, or returns the client that already exists.
//!
//! Keyed by the derived client id, a client is either absent or present.
//! The first delivery for an id runs normalise → generate → write; every
//! later delivery only reads the stored row, so the write path is never
//! entered twice for the same id.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::clients::model::{Client, ClientAggregate};
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::store::Database;

use super::baseline;
use super::content;
use super::payload::{ClientInfo, WebhookPayload};

/// Prefix of every dashboard access token.
pub const ACCESS_TOKEN_PREFIX: &str = "axiom";

/// Dashboard modules enabled for an onboarded client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnterpriseFeatures {
    pub ai_reminders: bool,
    pub progress_tracking: bool,
    pub document_hub: bool,
    pub team_management: bool,
}

impl Default for EnterpriseFeatures {
    fn default() -> Self {
        Self {
            ai_reminders: true,
            progress_tracking: true,
            document_hub: true,
            team_management: true,
        }
    }
}

/// Webhook response body. Serialised flat with a `status` discriminator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OnboardingOutcome {
    /// A new client aggregate was written.
    Success {
        dashboard_url: String,
        access_token: String,
        client_id: String,
        customer_email: String,
        client_name: String,
        payment_intent_id: Option<String>,
        created_at: DateTime<Utc>,
        enterprise_features: EnterpriseFeatures,
    },
    /// The client already existed; nothing was written.
    ExistingClient {
        dashboard_url: String,
        access_token: String,
        client_id: String,
        customer_email: String,
        client_name: String,
        created_at: DateTime<Utc>,
    },
}

impl OnboardingOutcome {
    pub fn client_id(&self) -> &str {
        match self {
            Self::Success { client_id, .. } | Self::ExistingClient { client_id, .. } => client_id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Opaque dashboard token: `axiom_<client_id>_<16 hex chars>`, fresh per call.
pub fn generate_access_token(client_id: &str) -> String {
    let mut nonce = Uuid::new_v4().simple().to_string();
    nonce.truncate(16);
    format!("{ACCESS_TOKEN_PREFIX}_{client_id}_{nonce}")
}

/// Assemble the full aggregate for a first-time client.
pub fn build_aggregate(client_id: String, info: &ClientInfo, now: DateTime<Utc>) -> ClientAggregate {
    let recommended_solutions = content::solutions(info);

    let client = Client {
        id: client_id,
        company_name: info.company_name.clone(),
        industry: info.industry.clone(),
        complexity_score: info.complexity_score,
        assessment_date: now,
        session_id: info.session_id.clone(),
        customer_email: info.customer_email.clone(),
        payment_intent_id: info.payment_intent_id.clone(),
        mentor: content::assign_mentor(&info.industry),
        ai_confidence: content::ai_confidence(info.complexity_score),
        processing_time: content::processing_time(info.complexity_score),
        solutions_count: recommended_solutions.len() as i64,
        business_context: content::business_context(info),
        current_challenges: content::challenges(info),
        recommended_solutions,
        created_at: now,
        updated_at: now,
    };

    ClientAggregate {
        client,
        reminders: baseline::reminders(info, now),
        documents: baseline::documents(info),
        progress_metrics: baseline::progress_metrics(info),
    }
}

/// Runs the onboarding workflow against an explicitly supplied store.
pub struct OnboardingService {
    db: Arc<dyn Database>,
    config: Arc<ServiceConfig>,
}

impl OnboardingService {
    pub fn new(db: Arc<dyn Database>, config: Arc<ServiceConfig>) -> Self {
        Self { db, config }
    }

    /// Onboard the client described by `payload`, or report the existing one.
    pub async fn onboard(&self, payload: WebhookPayload) -> Result<OnboardingOutcome> {
        let info = payload.into_client_info()?;
        let client_id = info.client_id();
        let dashboard_url = self.config.dashboard_url(&client_id);

        if let Some(existing) = self.db.get_client(&client_id).await? {
            info!(client_id = %client_id, "Client already onboarded");
            return Ok(OnboardingOutcome::ExistingClient {
                dashboard_url,
                access_token: generate_access_token(&client_id),
                customer_email: info.customer_email,
                client_name: info.company_name,
                created_at: existing.created_at,
                client_id,
            });
        }

        let now = Utc::now();
        let aggregate = build_aggregate(client_id.clone(), &info, now);
        self.db.create_client(&aggregate).await?;

        info!(
            client_id = %client_id,
            industry = %info.industry,
            complexity_score = info.complexity_score,
            "Created enterprise client"
        );

        Ok(OnboardingOutcome::Success {
            dashboard_url,
            access_token: generate_access_token(&client_id),
            customer_email: info.customer_email,
            client_name: info.company_name,
            payment_intent_id: info.payment_intent_id,
            created_at: now,
            enterprise_features: EnterpriseFeatures::default(),
            client_id,
        })
    }
}
