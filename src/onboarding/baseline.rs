//! Starting reminders, documents and progress metrics for a new client.

use chrono::{DateTime, Duration, Utc};

use crate::clients::model::{
    MetricType, NewDocument, NewProgressMetric, NewReminder, ReminderPriority, ReminderStatus,
};

use super::payload::ClientInfo;

fn reminder(
    title: &str,
    description: String,
    priority: ReminderPriority,
    category: &str,
    due_date: DateTime<Utc>,
) -> NewReminder {
    NewReminder {
        title: title.to_string(),
        description,
        priority,
        category: category.to_string(),
        due_date,
        status: ReminderStatus::Active,
        ai_generated: true,
    }
}

/// Three reminders due one, two and three weeks after `now`.
pub fn reminders(info: &ClientInfo, now: DateTime<Utc>) -> Vec<NewReminder> {
    vec![
        reminder(
            "Strategic Assessment Deep Dive",
            format!(
                "Given your complexity score of {}, we recommend a comprehensive strategic assessment within the first week.",
                info.complexity_score
            ),
            ReminderPriority::High,
            "Strategic Planning",
            now + Duration::days(7),
        ),
        reminder(
            "AI Analysis Update",
            "Review latest AI-generated insights on operational efficiency improvements.".to_string(),
            ReminderPriority::Medium,
            "AI Insights",
            now + Duration::days(14),
        ),
        reminder(
            "Team Alignment Session",
            "Schedule cross-functional alignment meeting for strategic initiatives.".to_string(),
            ReminderPriority::Medium,
            "Team Management",
            now + Duration::days(21),
        ),
    ]
}

/// Roadmap, complexity report and industry best practices.
pub fn documents(info: &ClientInfo) -> Vec<NewDocument> {
    let company = &info.company_name;
    let industry = &info.industry;
    let company_tag = company.to_lowercase();

    vec![
        NewDocument {
            title: format!("{company} Strategic Implementation Roadmap"),
            description: format!("Customized strategic roadmap for {company}"),
            category: "Strategic".to_string(),
            file_type: "pdf".to_string(),
            tags: vec!["roadmap".into(), "strategy".into(), company_tag.clone()],
        },
        NewDocument {
            title: format!("{company} Complexity Assessment Report"),
            description: format!("Detailed complexity analysis for {company}"),
            category: "Analysis".to_string(),
            file_type: "pdf".to_string(),
            tags: vec!["analysis".into(), "complexity".into(), company_tag],
        },
        NewDocument {
            title: format!("{industry} Industry Best Practices"),
            description: format!("Industry-specific best practices for {industry}"),
            category: "Operational".to_string(),
            file_type: "pdf".to_string(),
            tags: vec!["best-practices".into(), industry.to_lowercase()],
        },
    ]
}

fn metric(name: &str, value: f64, metric_type: MetricType, category: &str) -> NewProgressMetric {
    NewProgressMetric {
        metric_name: name.to_string(),
        metric_value: value,
        metric_type,
        category: category.to_string(),
    }
}

/// Baseline progress metrics.
///
/// "Team Engagement" is not clamped: it goes negative once the score passes 190.
pub fn progress_metrics(info: &ClientInfo) -> Vec<NewProgressMetric> {
    let complexity = info.complexity_score;
    let initial_progress = 100i64.saturating_sub(complexity).max(0) as f64;

    vec![
        metric(
            "Implementation Progress",
            initial_progress,
            MetricType::Percentage,
            "Overall",
        ),
        metric("Strategic Initiatives", 0.0, MetricType::Count, "Strategy"),
        metric(
            "Team Engagement",
            95.0 - complexity as f64 * 0.5,
            MetricType::Percentage,
            "Team",
        ),
        metric("Risk Mitigation", 25.0, MetricType::Percentage, "Risk"),
    ]
}
