//! Payment-confirmation webhook payloads and their normalisation into
//! a canonical [`ClientInfo`].
//!
//! Two shapes arrive on `/webhook/payment-confirmed`:
//!
//! - the current format, where the checkout session is nested under
//!   `stripe_data` and company details live in its `metadata`;
//! - the legacy flat format (`client_name`, `customer_email`, `project_id`),
//!   which never carried industry or complexity information.
//!
//! The shape is decided once, up front, and everything downstream works on
//! the strongly-typed record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

use crate::error::PayloadError;

/// Industry assumed when none is supplied.
pub const DEFAULT_INDUSTRY: &str = "Technology";
/// Complexity score assumed when none is supplied.
pub const DEFAULT_COMPLEXITY_SCORE: i64 = 43;
pub const UNKNOWN_EMAIL: &str = "unknown@example.com";
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Length of the generated session id used when the payload carries none.
const FALLBACK_SESSION_LEN: usize = 12;

/// Checkout session nested under `stripe_data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: Option<SessionMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: Option<String>,
}

/// Company details attached to the checkout session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionMetadata {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Stripe metadata values are strings, but numbers are accepted too.
    #[serde(default)]
    pub complexity_score: Option<Value>,
}

/// The older flat payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyPayload {
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub payment_intent_id: Option<String>,
}

/// Legacy senders emit ids either quoted or as bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// A decoded payment-confirmation payload.
#[derive(Debug, Clone)]
pub enum WebhookPayload {
    Checkout(CheckoutSession),
    Legacy(LegacyPayload),
}

/// Canonical client information every onboarding step works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub customer_email: String,
    pub customer_name: String,
    pub company_name: String,
    pub industry: String,
    pub complexity_score: i64,
    pub session_id: String,
    pub payment_intent_id: Option<String>,
}

impl WebhookPayload {
    /// Decode raw request bytes.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| PayloadError::Malformed(format!("invalid JSON body: {e}")))?;
        Self::from_value(value)
    }

    /// Detect the schema by the presence of `stripe_data` and decode it.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let Value::Object(mut fields) = value else {
            return Err(PayloadError::Malformed(
                "payload must be a JSON object".to_string(),
            ));
        };

        match fields.remove("stripe_data") {
            Some(session) => serde_json::from_value(session)
                .map(Self::Checkout)
                .map_err(|e| PayloadError::Malformed(format!("stripe_data: {e}"))),
            None => serde_json::from_value(Value::Object(fields))
                .map(Self::Legacy)
                .map_err(|e| PayloadError::Malformed(format!("legacy payload: {e}"))),
        }
    }

    /// Apply the per-schema defaults and produce the canonical record.
    pub fn into_client_info(self) -> Result<ClientInfo, PayloadError> {
        match self {
            Self::Checkout(session) => {
                let customer_name = session
                    .customer_details
                    .and_then(|d| d.name)
                    .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
                let metadata = session.metadata.unwrap_or_default();
                let complexity_score = match metadata.complexity_score {
                    Some(raw) => parse_complexity_score(&raw)?,
                    None => DEFAULT_COMPLEXITY_SCORE,
                };

                Ok(ClientInfo {
                    customer_email: session
                        .customer_email
                        .unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
                    company_name: metadata
                        .company_name
                        .unwrap_or_else(|| customer_name.clone()),
                    customer_name,
                    industry: metadata
                        .industry
                        .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string()),
                    complexity_score,
                    session_id: session.id.clone().unwrap_or_else(fallback_session_id),
                    payment_intent_id: session.id,
                })
            }
            Self::Legacy(legacy) => {
                let customer_name = legacy
                    .client_name
                    .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());

                Ok(ClientInfo {
                    customer_email: legacy
                        .customer_email
                        .unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
                    company_name: customer_name.clone(),
                    customer_name,
                    industry: DEFAULT_INDUSTRY.to_string(),
                    complexity_score: DEFAULT_COMPLEXITY_SCORE,
                    session_id: legacy.project_id.unwrap_or_else(fallback_session_id),
                    payment_intent_id: legacy.payment_intent_id,
                })
            }
        }
    }
}

impl ClientInfo {
    /// Deterministic client id: lower-cased company name with spaces turned
    /// into dashes, then the session id. Re-deliveries map to the same id.
    pub fn client_id(&self) -> String {
        format!(
            "{}-{}",
            self.company_name.to_lowercase().replace(' ', "-"),
            self.session_id
        )
    }
}

/// Integer, float (truncated) or numeric string; `null` means the default.
fn parse_complexity_score(raw: &Value) -> Result<i64, PayloadError> {
    let invalid = |reason: String| PayloadError::InvalidField {
        field: "complexity_score".to_string(),
        reason,
    };

    match raw {
        Value::Null => Ok(DEFAULT_COMPLEXITY_SCORE),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| invalid(format!("{n} is out of range"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| invalid(format!("invalid integer literal {s:?}"))),
        other => Err(invalid(format!("expected integer, got {other}"))),
    }
}

fn fallback_session_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(FALLBACK_SESSION_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> ClientInfo {
        WebhookPayload::from_value(value)
            .unwrap()
            .into_client_info()
            .unwrap()
    }

    #[test]
    fn checkout_payload_reads_nested_session() {
        let info = normalize(json!({
            "stripe_data": {
                "id": "cs_test_abc",
                "customer_email": "cfo@globex.test",
                "customer_details": {"name": "Hank Scorpio"},
                "metadata": {
                    "company_name": "Globex Corp",
                    "industry": "Manufacturing",
                    "complexity_score": "61"
                }
            }
        }));

        assert_eq!(info.customer_email, "cfo@globex.test");
        assert_eq!(info.customer_name, "Hank Scorpio");
        assert_eq!(info.company_name, "Globex Corp");
        assert_eq!(info.industry, "Manufacturing");
        assert_eq!(info.complexity_score, 61);
        assert_eq!(info.session_id, "cs_test_abc");
        assert_eq!(info.payment_intent_id.as_deref(), Some("cs_test_abc"));
        assert_eq!(info.client_id(), "globex-corp-cs_test_abc");
    }

    #[test]
    fn checkout_payload_defaults() {
        let info = normalize(json!({"stripe_data": {"id": "cs_1"}}));

        assert_eq!(info.customer_email, UNKNOWN_EMAIL);
        assert_eq!(info.customer_name, UNKNOWN_CUSTOMER);
        assert_eq!(info.company_name, UNKNOWN_CUSTOMER);
        assert_eq!(info.industry, DEFAULT_INDUSTRY);
        assert_eq!(info.complexity_score, DEFAULT_COMPLEXITY_SCORE);
        assert_eq!(info.client_id(), "unknown-customer-cs_1");
    }

    #[test]
    fn company_name_falls_back_to_customer_name() {
        let info = normalize(json!({
            "stripe_data": {
                "id": "cs_2",
                "customer_details": {"name": "Initech"},
                "metadata": {"industry": "Finance"}
            }
        }));
        assert_eq!(info.company_name, "Initech");
        assert_eq!(info.industry, "Finance");
    }

    #[test]
    fn numeric_complexity_scores_are_accepted() {
        let info = normalize(json!({"stripe_data": {"id": "x", "metadata": {"complexity_score": 12}}}));
        assert_eq!(info.complexity_score, 12);

        let info = normalize(json!({"stripe_data": {"id": "x", "metadata": {"complexity_score": 55.9}}}));
        assert_eq!(info.complexity_score, 55);
    }

    #[test]
    fn non_numeric_complexity_score_is_rejected() {
        let err = WebhookPayload::from_value(json!({
            "stripe_data": {"id": "x", "metadata": {"complexity_score": "very"}}
        }))
        .unwrap()
        .into_client_info()
        .unwrap_err();
        assert!(matches!(err, PayloadError::InvalidField { ref field, .. } if field == "complexity_score"));
    }

    #[test]
    fn missing_session_id_gets_fallback_token() {
        let info = normalize(json!({"stripe_data": {"customer_email": "a@b.c"}}));
        assert_eq!(info.session_id.len(), 12);
        assert!(info.session_id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(info.payment_intent_id.is_none());
    }

    #[test]
    fn legacy_payload_forces_industry_and_complexity() {
        let info = normalize(json!({
            "client_name": "Acme Corp",
            "customer_email": "ops@acme.test",
            "project_id": "proj-42",
            "payment_intent_id": "pi_123",
            "industry": "Healthcare",
            "complexity_score": 99
        }));

        assert_eq!(info.industry, "Technology");
        assert_eq!(info.complexity_score, 43);
        assert_eq!(info.company_name, "Acme Corp");
        assert_eq!(info.customer_name, "Acme Corp");
        assert_eq!(info.session_id, "proj-42");
        assert_eq!(info.payment_intent_id.as_deref(), Some("pi_123"));
        assert_eq!(info.client_id(), "acme-corp-proj-42");
    }

    #[test]
    fn legacy_numeric_ids_are_stringified() {
        let info = normalize(json!({
            "client_name": "Acme",
            "project_id": 42,
            "payment_intent_id": 9001
        }));

        assert_eq!(info.session_id, "42");
        assert_eq!(info.payment_intent_id.as_deref(), Some("9001"));
        assert_eq!(info.client_id(), "acme-42");
    }

    #[test]
    fn legacy_project_id_rejects_objects() {
        let result = WebhookPayload::from_value(json!({"project_id": {"id": 1}}));
        assert!(result.is_err());
    }

    #[test]
    fn legacy_payload_defaults() {
        let info = normalize(json!({}));
        assert_eq!(info.customer_email, UNKNOWN_EMAIL);
        assert_eq!(info.company_name, UNKNOWN_CUSTOMER);
        assert_eq!(info.session_id.len(), 12);
        assert!(info.payment_intent_id.is_none());
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(WebhookPayload::from_slice(b"not json").is_err());
        assert!(WebhookPayload::from_value(json!([1, 2, 3])).is_err());
        assert!(WebhookPayload::from_value(json!({"stripe_data": null})).is_err());
        assert!(WebhookPayload::from_value(json!({"customer_email": 7})).is_err());
    }
}
