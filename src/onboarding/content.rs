//! Advisory content derived from a client's industry and complexity score.
//!
//! Every function here is pure: the same [`ClientInfo`] always produces the
//! same content.

use crate::clients::model::{
    BusinessContext, Challenge, Mentor, ProcessingTime, Solution, format_decimal,
};

use super::payload::ClientInfo;

/// Lowest AI confidence ever reported.
pub const AI_CONFIDENCE_FLOOR: f64 = 85.0;

/// Industry → (mentor name, mentor title).
const MENTORS: &[(&str, &str, &str)] = &[
    ("Technology", "Alex Chen", "Technology Innovation Advisor"),
    ("Manufacturing", "Sarah Johnson", "Manufacturing Excellence Advisor"),
    ("Healthcare", "Dr. Michael Roberts", "Healthcare Strategy Advisor"),
    ("Finance", "David Williams", "Financial Services Advisor"),
];

const DEFAULT_MENTOR: (&str, &str) = ("Alex Thompson", "Strategic Implementation Advisor");

/// Pick the advisor for an industry; unknown industries get the generalist.
pub fn assign_mentor(industry: &str) -> Mentor {
    let (name, title) = MENTORS
        .iter()
        .find(|(key, _, _)| *key == industry)
        .map(|(_, name, title)| (*name, *title))
        .unwrap_or(DEFAULT_MENTOR);
    Mentor {
        name: name.to_string(),
        title: title.to_string(),
    }
}

/// `max(85.0, 100.0 - score * 0.3)`.
pub fn ai_confidence(complexity_score: i64) -> f64 {
    (100.0 - complexity_score as f64 * 0.3).max(AI_CONFIDENCE_FLOOR)
}

/// Below 30 → 1m, below 50 → 2m, otherwise 3m.
pub fn processing_time(complexity_score: i64) -> ProcessingTime {
    if complexity_score < 30 {
        ProcessingTime::OneMinute
    } else if complexity_score < 50 {
        ProcessingTime::TwoMinutes
    } else {
        ProcessingTime::ThreeMinutes
    }
}

pub fn business_context(info: &ClientInfo) -> BusinessContext {
    BusinessContext {
        company_overview: format!(
            "{} is a dynamic organization in the {} sector, committed to strategic excellence.",
            info.company_name, info.industry
        ),
        market_position: format!(
            "Established player in the {} market with growth opportunities.",
            info.industry
        ),
        strategic_focus:
            "Accelerating organizational effectiveness through strategic implementation."
                .to_string(),
    }
}

fn challenge(id: u32, title: &str, description: &str) -> Challenge {
    Challenge {
        id,
        title: title.to_string(),
        description: description.to_string(),
    }
}

/// Challenge list. Ids are fixed per kind (1 complexity, 2 industry,
/// 3 scaling), so absent entries leave gaps.
pub fn challenges(info: &ClientInfo) -> Vec<Challenge> {
    let mut challenges = Vec::with_capacity(3);

    if info.complexity_score > 40 {
        challenges.push(challenge(
            1,
            "High Complexity Operations",
            "Managing complex operational processes requiring strategic optimization.",
        ));
    }

    match info.industry.as_str() {
        "Technology" => challenges.push(challenge(
            2,
            "Rapid Technology Evolution",
            "Keeping pace with rapidly evolving technology landscape.",
        )),
        "Manufacturing" => challenges.push(challenge(
            2,
            "Supply Chain Optimization",
            "Optimizing complex supply chain operations for efficiency.",
        )),
        _ => {}
    }

    challenges.push(challenge(
        3,
        "Strategic Implementation Scaling",
        "Scaling strategic initiatives across the organization effectively.",
    ));

    challenges
}

/// A fixed solution template.
struct SolutionTemplate {
    title: &'static str,
    description: &'static str,
    /// Upper bound on the advertised complexity reduction, in percent.
    ceiling: i64,
    /// Multiplier applied to the score; `None` uses the raw score.
    factor: Option<f64>,
    implementation_time: &'static str,
    roi_estimate: &'static str,
}

const SOLUTIONS: [SolutionTemplate; 3] = [
    SolutionTemplate {
        title: "Strategic Excellence Framework",
        description: "Comprehensive framework for managing strategic initiatives",
        ceiling: 40,
        factor: None,
        implementation_time: "3-4 months",
        roi_estimate: "250-350%",
    },
    SolutionTemplate {
        title: "Operational Optimization Platform",
        description: "Integrated platform for streamlining operations",
        ceiling: 30,
        factor: Some(0.7),
        implementation_time: "2-3 months",
        roi_estimate: "180-250%",
    },
    SolutionTemplate {
        title: "AI-Powered Analytics Suite",
        description: "Advanced analytics for data-driven decision making",
        ceiling: 25,
        factor: Some(0.6),
        implementation_time: "4-6 months",
        roi_estimate: "200-300%",
    },
];

/// `min(ceiling, score * factor)` as a percent string. A capped value is
/// printed as the whole ceiling; a scaled value keeps its decimals.
fn complexity_reduction(template: &SolutionTemplate, complexity_score: i64) -> String {
    match template.factor {
        None => format!("{}%", complexity_score.min(template.ceiling)),
        Some(factor) => {
            let scaled = complexity_score as f64 * factor;
            if scaled < template.ceiling as f64 {
                format!("{}%", format_decimal(scaled))
            } else {
                format!("{}%", template.ceiling)
            }
        }
    }
}

/// Always the same three solutions, with score-dependent reductions.
pub fn solutions(info: &ClientInfo) -> Vec<Solution> {
    SOLUTIONS
        .iter()
        .zip(1u32..)
        .map(|(template, id)| Solution {
            id,
            title: template.title.to_string(),
            description: template.description.to_string(),
            complexity_reduction: complexity_reduction(template, info.complexity_score),
            implementation_time: template.implementation_time.to_string(),
            roi_estimate: template.roi_estimate.to_string(),
        })
        .collect()
}
