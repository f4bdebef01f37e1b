//! Deterministic risk rules: [`ExtractedBrief`] in, [`ReviewDecision`] out.
//!
//! No model output reaches this module. Claim types and severities, the age
//! grade, the licensed flag, materials and extraction issues decide which
//! review lanes are required and the overall risk level. Same brief in, same
//! decision out.

use crate::schemas::{ExtractedBrief, ReviewDecision, RiskLevel, Severity};

/// Flag raised when the age grade targets children under 3
pub const FLAG_UNDER_3: &str = "under_3";
/// Flag raised for licensed-brand products
pub const FLAG_LICENSED_BRAND: &str = "licensed_brand";
/// Flag raised when any claim needs legal/evidence review
pub const FLAG_CLAIMS_NEED_EVIDENCE: &str = "claims_need_evidence";
/// Flag raised when plastic-family materials are present
pub const FLAG_PLASTIC_PRESENT: &str = "plastic_present";
/// Flag raised when extraction reported a high-severity issue
pub const FLAG_HIGH_SEVERITY_ISSUES: &str = "high_severity_issues";

/// Materials that trigger the sustainability recommendation.
/// Exact match after lowercasing and trimming ("Plastic" matches,
/// "plastic-free" does not).
const PLASTIC_MATERIALS: [&str; 3] = ["plastic", "pvc", "blister"];

/// Age-grade fragments that mark a product as targeting children under 3.
/// Substring match, not exact: any fragment appearing anywhere in the
/// lowercased age grade counts, so "0-3", "18m+" and also "10+" match.
/// Deliberately over-broad; existing decisions depend on it staying this way.
const UNDER_3_INDICATORS: [&str; 7] = ["0", "1", "2", "18m", "24m", "under 3", "under three"];

/// Claim categories that always require legal/evidence review,
/// independent of severity.
const LEGAL_CLAIM_TYPES: [&str; 4] = [
    "CHEMICAL_SAFETY_CLAIM",
    "SUSTAINABILITY_CLAIM",
    "PERFORMANCE_CLAIM",
    "SAFETY_CLAIM",
];

/// Review lane a rule routes a brief into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewLane {
    Quality,
    Legal,
    Licensing,
    Sustainability,
}

/// One classification rule: a predicate over the brief plus the flag, lane
/// and routing note applied when it matches.
struct RiskRule {
    flag: &'static str,
    lane: Option<ReviewLane>,
    note: &'static str,
    applies: fn(&ExtractedBrief) -> bool,
}

/// The rule table. Evaluation order fixes the order of `risk_flags` and
/// `routing_notes`; adding a rule is a new entry here, not new control flow.
const RISK_RULES: [RiskRule; 5] = [
    RiskRule {
        flag: FLAG_UNDER_3,
        lane: Some(ReviewLane::Quality),
        note: "Age grade under 3: quality review required.",
        applies: age_under_3,
    },
    RiskRule {
        flag: FLAG_LICENSED_BRAND,
        lane: Some(ReviewLane::Licensing),
        note: "Licensed product: licensing review required.",
        applies: licensed_brand,
    },
    RiskRule {
        flag: FLAG_CLAIMS_NEED_EVIDENCE,
        lane: Some(ReviewLane::Legal),
        note: "Marketing claims require legal/evidence review.",
        applies: claims_need_evidence,
    },
    RiskRule {
        flag: FLAG_PLASTIC_PRESENT,
        lane: Some(ReviewLane::Sustainability),
        note: "Plastic/PVC/blister: sustainability review recommended.",
        applies: plastic_present,
    },
    RiskRule {
        flag: FLAG_HIGH_SEVERITY_ISSUES,
        lane: None,
        note: "High-severity issues from brief require attention.",
        applies: high_severity_issues,
    },
];

fn age_under_3(brief: &ExtractedBrief) -> bool {
    let age = brief.age_grade.trim().to_lowercase();
    UNDER_3_INDICATORS.iter().any(|frag| age.contains(frag))
}

fn licensed_brand(brief: &ExtractedBrief) -> bool {
    brief.licensed
}

fn claims_need_evidence(brief: &ExtractedBrief) -> bool {
    brief.claims.iter().any(|claim| {
        LEGAL_CLAIM_TYPES.contains(&claim.normalized_type.as_str())
            || claim.severity == Severity::High
    })
}

fn plastic_present(brief: &ExtractedBrief) -> bool {
    brief
        .materials
        .iter()
        .any(|material| PLASTIC_MATERIALS.contains(&material.trim().to_lowercase().as_str()))
}

/// Issues only escalate; they never route to a review lane on their own.
fn high_severity_issues(brief: &ExtractedBrief) -> bool {
    brief
        .issues
        .iter()
        .any(|issue| issue.severity == Severity::High)
}

/// Classify an extracted brief.
///
/// Pure and total: no I/O, no model calls, never fails. Shape validation
/// happens upstream at the extraction boundary.
pub fn classify(brief: &ExtractedBrief) -> ReviewDecision {
    let mut decision = ReviewDecision::default();

    for rule in &RISK_RULES {
        if !(rule.applies)(brief) {
            continue;
        }
        if let Some(lane) = rule.lane {
            match lane {
                ReviewLane::Quality => decision.requires_quality_review = true,
                ReviewLane::Legal => decision.requires_legal_review = true,
                ReviewLane::Licensing => decision.requires_licensing_review = true,
                ReviewLane::Sustainability => decision.requires_sustainability_review = true,
            }
        }
        if !decision.risk_flags.iter().any(|f| f == rule.flag) {
            decision.risk_flags.push(rule.flag.to_string());
            decision.routing_notes.push(rule.note.to_string());
        }
    }

    decision.human_approval_required = decision.risk_flags.iter().any(|flag| {
        flag == FLAG_UNDER_3 || flag == FLAG_LICENSED_BRAND || flag == FLAG_CLAIMS_NEED_EVIDENCE
    });

    decision.risk_level = if decision
        .risk_flags
        .iter()
        .any(|flag| flag == FLAG_UNDER_3 || flag == FLAG_LICENSED_BRAND)
    {
        RiskLevel::High
    } else if decision.risk_flags.is_empty() {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    };

    decision
}
