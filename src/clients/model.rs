//! Client aggregate data model: the client row, its owned reminders,
//! documents and progress metrics, and the JSON views served to the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder avatar the dashboard renders next to the mentor card.
pub const MENTOR_AVATAR: &str = "/api/placeholder/40/40";

/// Render a float the way the dashboard has always received it: whole values
/// keep one decimal (`87.0`), everything else uses the shortest exact form.
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// `format_decimal` with a trailing `%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_decimal(value))
}

/// Advisor assigned to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mentor {
    pub name: String,
    pub title: String,
}

/// Narrative context shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusinessContext {
    pub company_overview: String,
    pub market_position: String,
    pub strategic_focus: String,
}

/// One entry in the client's challenge list.
///
/// Ids are fixed per challenge kind, so a list may skip ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u32,
    pub title: String,
    pub description: String,
}

/// One recommended solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub id: u32,
    pub title: String,
    pub description: String,
    /// Percent string, e.g. `"40%"` or `"29.4%"`.
    pub complexity_reduction: String,
    pub implementation_time: String,
    pub roi_estimate: String,
}

/// Estimated assessment processing time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingTime {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "2m")]
    TwoMinutes,
    #[serde(rename = "3m")]
    ThreeMinutes,
}

impl std::fmt::Display for ProcessingTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneMinute => write!(f, "1m"),
            Self::TwoMinutes => write!(f, "2m"),
            Self::ThreeMinutes => write!(f, "3m"),
        }
    }
}

impl std::str::FromStr for ProcessingTime {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::OneMinute),
            "2m" => Ok(Self::TwoMinutes),
            "3m" => Ok(Self::ThreeMinutes),
            _ => Err(format!("Unknown processing time: {}", s)),
        }
    }
}

/// Root of the client aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    /// Derived identifier: slugged company name + session id.
    pub id: String,
    pub company_name: String,
    pub industry: String,
    pub complexity_score: i64,
    pub assessment_date: DateTime<Utc>,
    pub session_id: String,
    pub customer_email: String,
    pub payment_intent_id: Option<String>,
    pub mentor: Mentor,
    /// Floored at 85.0.
    pub ai_confidence: f64,
    pub processing_time: ProcessingTime,
    pub solutions_count: i64,
    pub business_context: BusinessContext,
    pub current_challenges: Vec<Challenge>,
    pub recommended_solutions: Vec<Solution>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Reminders ───────────────────────────────────────────────────────────

/// Reminder urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderPriority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for ReminderPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for ReminderPriority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Unknown reminder priority: {}", s)),
        }
    }
}

/// Reminder lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    #[default]
    Active,
    Completed,
    Dismissed,
}

impl std::fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Dismissed => write!(f, "dismissed"),
        }
    }
}

impl std::str::FromStr for ReminderStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "dismissed" => Ok(Self::Dismissed),
            _ => Err(format!("Unknown reminder status: {}", s)),
        }
    }
}

/// A persisted reminder, as served by `/api/clients/{id}/reminders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub id: i64,
    pub client_id: String,
    pub title: String,
    pub description: String,
    pub priority: ReminderPriority,
    pub category: String,
    pub due_date: DateTime<Utc>,
    pub status: ReminderStatus,
    /// Generated by the onboarding workflow rather than a person.
    pub ai_generated: bool,
    pub created_at: DateTime<Utc>,
}

/// A reminder about to be written; the row id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub title: String,
    pub description: String,
    pub priority: ReminderPriority,
    pub category: String,
    pub due_date: DateTime<Utc>,
    pub status: ReminderStatus,
    pub ai_generated: bool,
}

// ── Documents ───────────────────────────────────────────────────────────

/// A persisted document entry in the client's document hub.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: i64,
    pub client_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub file_type: String,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub download_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A document about to be written. Counters always start at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub title: String,
    pub description: String,
    pub category: String,
    pub file_type: String,
    pub tags: Vec<String>,
}

// ── Progress metrics ────────────────────────────────────────────────────

/// How a metric value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Percentage,
    Count,
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage => write!(f, "percentage"),
            Self::Count => write!(f, "count"),
        }
    }
}

impl std::str::FromStr for MetricType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "count" => Ok(Self::Count),
            _ => Err(format!("Unknown metric type: {}", s)),
        }
    }
}

/// A persisted progress metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressMetric {
    pub id: i64,
    pub client_id: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub metric_type: MetricType,
    pub category: String,
    pub recorded_at: DateTime<Utc>,
}

/// A progress metric about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProgressMetric {
    pub metric_name: String,
    pub metric_value: f64,
    pub metric_type: MetricType,
    pub category: String,
}

/// Everything written for one onboarding, in one transaction.
#[derive(Debug, Clone)]
pub struct ClientAggregate {
    pub client: Client,
    pub reminders: Vec<NewReminder>,
    pub documents: Vec<NewDocument>,
    pub progress_metrics: Vec<NewProgressMetric>,
}

// ── Read views ──────────────────────────────────────────────────────────

/// Dashboard view of a client, as served by `/api/clients/{id}`.
#[derive(Debug, Serialize)]
pub struct ClientView<'a> {
    pub id: &'a str,
    pub client_name: &'a str,
    pub industry: &'a str,
    pub complexity_score: i64,
    pub assessment_date: DateTime<Utc>,
    pub session_id: &'a str,
    pub customer_email: &'a str,
    pub payment_intent_id: Option<&'a str>,
    pub mentor: MentorView<'a>,
    pub assessment_summary: AssessmentSummary,
    pub business_context: &'a BusinessContext,
    pub current_challenges: &'a [Challenge],
    pub recommended_solutions: &'a [Solution],
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MentorView<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub avatar: &'static str,
    pub industry_specialization: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AssessmentSummary {
    pub complexity_score: i64,
    pub ai_confidence: String,
    pub processing_time: ProcessingTime,
    pub solutions_count: i64,
}

impl Client {
    /// Borrowing view with the nested mentor/summary shape the dashboard reads.
    pub fn view(&self) -> ClientView<'_> {
        ClientView {
            id: &self.id,
            client_name: &self.company_name,
            industry: &self.industry,
            complexity_score: self.complexity_score,
            assessment_date: self.assessment_date,
            session_id: &self.session_id,
            customer_email: &self.customer_email,
            payment_intent_id: self.payment_intent_id.as_deref(),
            mentor: MentorView {
                name: &self.mentor.name,
                title: &self.mentor.title,
                avatar: MENTOR_AVATAR,
                industry_specialization: &self.industry,
            },
            assessment_summary: AssessmentSummary {
                complexity_score: self.complexity_score,
                ai_confidence: format_percent(self.ai_confidence),
                processing_time: self.processing_time,
                solutions_count: self.solutions_count,
            },
            business_context: &self.business_context,
            current_challenges: &self.current_challenges,
            recommended_solutions: &self.recommended_solutions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
