//! Data model for the review pipeline: extracted briefs in, review decisions out.

use serde::{Deserialize, Serialize};

use crate::error::{PackReviewError, Result};

/// Severity attached to claims and issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Overall risk level of a brief, derived from the raised flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// One marketing claim, normalized into a canonical category.
///
/// `normalized_type` is an open string (e.g. "CHEMICAL_SAFETY_CLAIM"): values
/// outside the known set are kept as-is and treated as OTHER_CLAIM downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimObject {
    pub raw_text: String,
    pub normalized_type: String,
    #[serde(default)]
    pub risk_keywords: Vec<String>,
    #[serde(default)]
    pub evidence_hint: String,
    #[serde(default)]
    pub severity: Severity,
}

/// A problem the extraction step found in the brief (missing info, conflicts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

/// Structured form of a packaging brief after extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedBrief {
    pub product_name: String,
    pub age_grade: String,
    #[serde(default)]
    pub markets: Vec<String>,
    #[serde(default)]
    pub claims: Vec<ClaimObject>,
    #[serde(default)]
    pub materials: Vec<String>,
    pub licensed: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub missing_info: Vec<String>,
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl ExtractedBrief {
    /// Boundary checks beyond what deserialization enforces. The risk rules
    /// assume a well-formed brief and never re-validate shape themselves.
    pub fn validate(&self) -> Result<()> {
        for (idx, claim) in self.claims.iter().enumerate() {
            if claim.raw_text.trim().is_empty() {
                return Err(PackReviewError::Validation {
                    message: format!("claim {} has empty raw_text", idx),
                });
            }
        }
        Ok(())
    }
}

/// Who must review the brief and the overall risk level.
///
/// Produced only by the deterministic rules in [`crate::risk`], never by a
/// model. `risk_flags` and `routing_notes` are parallel, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewDecision {
    pub requires_quality_review: bool,
    pub requires_legal_review: bool,
    pub requires_licensing_review: bool,
    pub requires_sustainability_review: bool,
    pub risk_flags: Vec<String>,
    pub risk_level: RiskLevel,
    pub routing_notes: Vec<String>,
    pub human_approval_required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        let parsed: Severity = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Severity::Medium);
    }

    #[test]
    fn severity_defaults_to_medium() {
        assert_eq!(Severity::default(), Severity::Medium);
        assert_eq!(RiskLevel::default(), RiskLevel::Low);
    }

    #[test]
    fn brief_deserializes_with_optional_fields_missing() {
        let brief: ExtractedBrief = serde_json::from_str(
            r#"{"product_name": "Blocks", "age_grade": "3+", "licensed": false}"#,
        )
        .unwrap();
        assert!(brief.claims.is_empty());
        assert!(brief.materials.is_empty());
        assert!(brief.notes.is_none());
        assert!(brief.validate().is_ok());
    }

    #[test]
    fn issue_type_uses_json_type_key() {
        let issue: Issue = serde_json::from_str(
            r#"{"type": "MISSING_AGE_GRADE", "message": "No age grade given.", "severity": "high"}"#,
        )
        .unwrap();
        assert_eq!(issue.issue_type, "MISSING_AGE_GRADE");
        assert_eq!(issue.severity, Severity::High);
    }

    #[test]
    fn empty_claim_text_fails_validation() {
        let brief: ExtractedBrief = serde_json::from_str(
            r#"{
                "product_name": "Blocks",
                "age_grade": "3+",
                "licensed": false,
                "claims": [{"raw_text": "  ", "normalized_type": "OTHER_CLAIM"}]
            }"#,
        )
        .unwrap();
        let err = brief.validate().unwrap_err();
        assert!(err.to_string().contains("empty raw_text"));
    }

    #[test]
    fn decision_round_trips_through_json() {
        let decision = ReviewDecision {
            requires_quality_review: true,
            risk_flags: vec!["under_3".to_string()],
            risk_level: RiskLevel::High,
            routing_notes: vec!["Age grade under 3: quality review required.".to_string()],
            human_approval_required: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&decision).unwrap();
        let back: ReviewDecision = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decision);
    }
}
