//! Extraction step: brief text to a structured [`ExtractedBrief`].
//!
//! The model does two jobs here: claim interpretation (messy marketing copy
//! into claim objects with canonical types) and issue discovery (what is
//! missing, ambiguous or risky). Output is validated at this boundary, with
//! exactly one repair attempt before the run fails.

use serde_json::{Value, json};
use tracing::warn;

use crate::audit::AuditLog;
use crate::error::{PackReviewError, Result};
use crate::llm::ChatCompletion;
use crate::prompts::EXTRACTION_SYSTEM;
use crate::schemas::ExtractedBrief;

/// Locate a JSON document in a model reply: a ```json fence wins, then any
/// fence, then the reply as-is.
pub fn extract_json_block(text: &str) -> Result<Value> {
    let text = text.trim();
    let candidate = if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        match rest.find("```") {
            Some(end) => rest[..end].trim(),
            None => {
                return Err(PackReviewError::Extraction {
                    message: "unterminated ```json fence in model reply".to_string(),
                });
            }
        }
    } else if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        match rest.find("```") {
            Some(end) => rest[..end].trim(),
            None => {
                return Err(PackReviewError::Extraction {
                    message: "unterminated ``` fence in model reply".to_string(),
                });
            }
        }
    } else {
        text
    };

    serde_json::from_str(candidate).map_err(|e| PackReviewError::Extraction {
        message: format!("model reply is not valid JSON: {}", e),
    })
}

/// Models sometimes emit bare strings where claim/issue objects belong;
/// promote those to the canonical shapes before strict validation.
pub fn coerce_shorthand(data: &mut Value) {
    if let Some(claims) = data.get_mut("claims").and_then(Value::as_array_mut) {
        for claim in claims.iter_mut() {
            if !claim.is_object() {
                let raw_text = value_to_text(claim);
                *claim = json!({
                    "raw_text": raw_text,
                    "normalized_type": "OTHER_CLAIM",
                    "risk_keywords": [],
                    "evidence_hint": "",
                    "severity": "medium",
                });
            }
        }
    }
    if let Some(issues) = data.get_mut("issues").and_then(Value::as_array_mut) {
        for issue in issues.iter_mut() {
            if !issue.is_object() {
                let message = value_to_text(issue);
                *issue = json!({
                    "type": "OTHER",
                    "message": message,
                    "severity": "medium",
                });
            }
        }
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse one model reply into a validated brief
fn parse_extracted(raw: &str) -> Result<ExtractedBrief> {
    let mut data = extract_json_block(raw)?;
    coerce_shorthand(&mut data);
    let brief: ExtractedBrief =
        serde_json::from_value(data).map_err(|e| PackReviewError::Validation {
            message: format!("extracted brief failed validation: {}", e),
        })?;
    brief.validate()?;
    Ok(brief)
}

/// Extract a brief with the configured model. Validates the reply and makes
/// one repair attempt (the error and previous output go back to the model)
/// before giving up.
pub async fn extract_brief(
    chat: &dyn ChatCompletion,
    audit: &AuditLog,
    brief_text: &str,
) -> Result<ExtractedBrief> {
    let user_msg = format!(
        "Extract and interpret this packaging brief (claims as objects, issues list).\n\nBrief:\n{}",
        brief_text
    );

    let raw = chat.complete(EXTRACTION_SYSTEM, &user_msg).await?;
    let first_error = match parse_extracted(&raw) {
        Ok(brief) => {
            audit.event_with_model(
                "extraction_ok",
                json!({
                    "product_name": &brief.product_name,
                    "claims_count": brief.claims.len(),
                    "issues_count": brief.issues.len(),
                }),
                chat.model_name(),
            )?;
            return Ok(brief);
        }
        Err(e) => e,
    };

    warn!("Extraction output invalid, attempting repair: {}", first_error);
    audit.event_with_model(
        "extraction_repair_attempt",
        json!({ "error": first_error.to_string() }),
        chat.model_name(),
    )?;

    let repair_msg = format!(
        "Previous output was invalid. Error:\n{}\n\nPrevious output:\n{}\n\nFix and output ONLY valid JSON for the same schema.",
        first_error, raw
    );
    let raw2 = chat.complete(EXTRACTION_SYSTEM, &repair_msg).await?;
    match parse_extracted(&raw2) {
        Ok(brief) => {
            audit.event_with_model(
                "extraction_repaired",
                json!({ "product_name": &brief.product_name }),
                chat.model_name(),
            )?;
            Ok(brief)
        }
        Err(second_error) => {
            audit.event_with_model(
                "failure",
                json!({ "stage": "extraction", "error": second_error.to_string() }),
                chat.model_name(),
            )?;
            Err(PackReviewError::Extraction {
                message: format!("extraction failed after repair attempt: {}", second_error),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_passes_through() {
        let value = extract_json_block(r#"{"product_name": "Blocks"}"#).unwrap();
        assert_eq!(value["product_name"], "Blocks");
    }

    #[test]
    fn json_fence_is_unwrapped() {
        let reply = "Here you go:\n```json\n{\"product_name\": \"Blocks\"}\n```\nDone.";
        let value = extract_json_block(reply).unwrap();
        assert_eq!(value["product_name"], "Blocks");
    }

    #[test]
    fn bare_fence_is_unwrapped() {
        let reply = "```\n{\"licensed\": true}\n```";
        let value = extract_json_block(reply).unwrap();
        assert_eq!(value["licensed"], true);
    }

    #[test]
    fn unterminated_fence_is_an_error() {
        let err = extract_json_block("```json\n{\"a\": 1}").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn prose_reply_is_an_error() {
        let err = extract_json_block("Sorry, I cannot help with that.").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn bare_string_claims_are_promoted() {
        let mut data = json!({
            "claims": ["Non-toxic", {"raw_text": "BPA-free", "normalized_type": "CHEMICAL_SAFETY_CLAIM"}],
            "issues": ["age grade unclear"],
        });
        coerce_shorthand(&mut data);
        assert_eq!(data["claims"][0]["raw_text"], "Non-toxic");
        assert_eq!(data["claims"][0]["normalized_type"], "OTHER_CLAIM");
        assert_eq!(data["claims"][0]["severity"], "medium");
        assert_eq!(data["claims"][1]["raw_text"], "BPA-free");
        assert_eq!(data["issues"][0]["type"], "OTHER");
        assert_eq!(data["issues"][0]["message"], "age grade unclear");
    }

    #[test]
    fn objects_are_left_alone() {
        let mut data = json!({
            "claims": [{"raw_text": "Safe", "normalized_type": "SAFETY_CLAIM", "severity": "high"}],
        });
        let before = data.clone();
        coerce_shorthand(&mut data);
        assert_eq!(data, before);
    }
}
