//! Review packet step: [`ExtractedBrief`] + [`ReviewDecision`] to Markdown.
//!
//! Two modes. Demo runs render a fixed template with no model involved.
//! Normal runs have the model draft the packet from a JSON context, check
//! the draft against a rubric, and revise at most once.

use serde_json::json;

use crate::audit::AuditLog;
use crate::error::{PackReviewError, Result};
use crate::llm::ChatCompletion;
use crate::prompts::{CRITIQUE_SYSTEM, DRAFT_SYSTEM};
use crate::schemas::{ExtractedBrief, ReviewDecision};

/// Approval lanes required by a decision, in presentation order
fn required_approvals(decision: &ReviewDecision) -> Vec<&'static str> {
    let mut approvals = Vec::new();
    if decision.requires_quality_review {
        approvals.push("Quality");
    }
    if decision.requires_legal_review {
        approvals.push("Legal");
    }
    if decision.requires_licensing_review {
        approvals.push("Licensing");
    }
    if decision.requires_sustainability_review {
        approvals.push("Sustainability");
    }
    approvals
}

/// JSON context handed to the drafting model. Nothing outside this document
/// may appear in the packet.
fn build_context(brief: &ExtractedBrief, decision: &ReviewDecision) -> Result<String> {
    let context = json!({
        "product_name": &brief.product_name,
        "age_grade": &brief.age_grade,
        "markets": &brief.markets,
        "licensed": brief.licensed,
        "claims": brief.claims.iter().map(|c| json!({
            "raw_text": &c.raw_text,
            "normalized_type": &c.normalized_type,
            "severity": c.severity,
        })).collect::<Vec<_>>(),
        "issues": brief.issues.iter().map(|i| json!({
            "type": &i.issue_type,
            "message": &i.message,
            "severity": i.severity,
        })).collect::<Vec<_>>(),
        "materials": &brief.materials,
        "risk_level": decision.risk_level,
        "risk_flags": &decision.risk_flags,
        "required_approvals": required_approvals(decision),
        "clarifying_questions": &brief.clarifying_questions,
    });
    serde_json::to_string_pretty(&context).map_err(|e| PackReviewError::Packet {
        message: format!("failed to build packet context: {}", e),
    })
}

/// Drop a wrapping Markdown code fence from a model reply, if present
fn strip_markdown_fences(text: &str) -> String {
    let mut out = text.trim();
    if out.starts_with("```") {
        for fence in ["```markdown", "```md", "```"] {
            if let Some(rest) = out.strip_prefix(fence) {
                out = rest.trim();
                break;
            }
        }
        if let Some(rest) = out.strip_suffix("```") {
            out = rest.trim();
        }
    }
    out.to_string()
}

/// The rubric reply is free text; accept only a clean OK with none of the
/// fix verbs the critique prompt asks for.
fn critique_is_ok(critique: &str) -> bool {
    let upper = critique.trim().to_uppercase();
    upper.contains("OK")
        && !upper.contains("ADD ")
        && !upper.contains("REMOVE ")
        && !upper.contains("REPHRASE ")
}

/// Render the packet from the fixed template, no model involved.
/// Demo runs use this so the whole pipeline works without an API key.
pub fn template_packet(
    brief: &ExtractedBrief,
    decision: &ReviewDecision,
    run_id: &str,
    model_name: &str,
    prompt_version: &str,
) -> String {
    let markets = brief.markets.join(", ");
    let mut lines: Vec<String> = vec![
        "# Packaging Review Packet".to_string(),
        String::new(),
        "## Summary".to_string(),
        format!("- **Product:** {}", brief.product_name),
        format!(
            "- **Markets:** {}",
            if markets.is_empty() { "Not specified" } else { markets.as_str() }
        ),
        format!("- **Age grade:** {}", brief.age_grade),
        format!("- **Licensed:** {}", if brief.licensed { "Yes" } else { "No" }),
        String::new(),
        "## Claims".to_string(),
    ];

    if !brief.claims.is_empty() {
        lines.push("| Raw text | Type | Severity |".to_string());
        lines.push("| --- | --- | --- |".to_string());
        for claim in &brief.claims {
            lines.push(format!(
                "| {} | {} | {} |",
                claim.raw_text,
                claim.normalized_type,
                claim.severity.as_str()
            ));
        }
        if decision.requires_legal_review {
            lines.push("\n*Evidence needed – legal review required.*".to_string());
        }
    } else {
        lines.push("- (None)".to_string());
    }

    lines.push(String::new());
    lines.push("## Issues".to_string());
    if !brief.issues.is_empty() {
        for issue in &brief.issues {
            lines.push(format!(
                "- [{}] {} ({})",
                issue.issue_type,
                issue.message,
                issue.severity.as_str()
            ));
        }
    } else {
        lines.push("- None".to_string());
    }

    lines.push(String::new());
    lines.push("## Materials".to_string());
    lines.push(if brief.materials.is_empty() {
        "(None)".to_string()
    } else {
        brief.materials.join(", ")
    });
    if decision.requires_sustainability_review {
        lines.push("\n*Sustainability review flagged.*".to_string());
    }

    lines.push(String::new());
    lines.push("## Risk".to_string());
    lines.push(format!("- **Risk level:** {}", decision.risk_level.as_str()));
    lines.push(format!(
        "- **Flags:** {}",
        if decision.risk_flags.is_empty() {
            "None".to_string()
        } else {
            decision.risk_flags.join(", ")
        }
    ));

    lines.push(String::new());
    lines.push("## Required Approvals".to_string());
    let approvals = required_approvals(decision);
    if approvals.is_empty() {
        lines.push("- None".to_string());
    } else {
        for approval in approvals {
            lines.push(format!("- {}", approval));
        }
    }

    lines.push(String::new());
    lines.push("## Checklist".to_string());
    lines.push("- [ ] Quality review (if required)".to_string());
    lines.push("- [ ] Legal review (if required)".to_string());
    lines.push("- [ ] Licensing review (if required)".to_string());
    lines.push("- [ ] Sustainability review (if required)".to_string());
    lines.push("- [ ] Human approval (if required)".to_string());

    if !brief.clarifying_questions.is_empty() {
        lines.push(String::new());
        lines.push("## Clarifying Questions".to_string());
        for question in &brief.clarifying_questions {
            lines.push(format!("- {}", question));
        }
    }

    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(format!(
        "*Run ID:* `{}` | *Model:* {} | *Prompt:* {}",
        run_id, model_name, prompt_version
    ));

    lines.join("\n")
}

/// Generate the packet with the model: draft, critique against the rubric,
/// revise once if the critique asks for fixes.
pub async fn generate_packet(
    chat: &dyn ChatCompletion,
    brief: &ExtractedBrief,
    decision: &ReviewDecision,
    audit: &AuditLog,
) -> Result<String> {
    let context = build_context(brief, decision)?;

    let draft_msg = format!(
        "Context (extracted brief + decision):\n{}\n\nWrite the Packaging Review Packet in Markdown.",
        context
    );
    let draft = strip_markdown_fences(&chat.complete(DRAFT_SYSTEM, &draft_msg).await?);

    let critique_msg = format!(
        "Context:\n{}\n\nDraft packet:\n{}\n\nCheck the draft against the rubric and reply with fixes or OK.",
        context, draft
    );
    let critique = chat
        .complete(CRITIQUE_SYSTEM, &critique_msg)
        .await?
        .trim()
        .to_uppercase();

    if critique_is_ok(&critique) {
        audit.event_with_model("packet_generated", json!({ "critique": "ok" }), chat.model_name())?;
        return Ok(draft);
    }

    let revise_msg = format!(
        "Context:\n{}\n\nDraft:\n{}\n\nRequested fixes:\n{}\n\nOutput the revised Markdown packet only.",
        context, draft, critique
    );
    let revised = strip_markdown_fences(&chat.complete(DRAFT_SYSTEM, &revise_msg).await?);
    audit.event_with_model(
        "packet_revised",
        json!({ "after_critique": true }),
        chat.model_name(),
    )?;
    Ok(revised)
}
