//! Pipeline orchestration: brief file in, per-run artifact folder out.
//!
//! brief (.txt) -> extract (claim objects + issues) -> risk (deterministic)
//! -> packet (draft + critique) -> outputs
//!
//! Each run writes extracted.json, decision.json, review_packet.md and
//! audit.jsonl under `<out>/<run_id>/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::audit::AuditLog;
use crate::config::Config;
use crate::error::Result;
use crate::extract::extract_brief;
use crate::llm::{ChatCompletion, create_chat};
use crate::packet::{generate_packet, template_packet};
use crate::risk::classify;
use crate::schemas::{ClaimObject, ExtractedBrief, Issue, RiskLevel, Severity};
use crate::utils::{ensure_output_dir, generate_run_id, read_brief};

/// Model label recorded when the demo path skips the LLM
const DEMO_MODEL_NAME: &str = "demo (no LLM)";

/// Summary handed back to the CLI when a run completes
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: String,
    pub risk_level: RiskLevel,
    pub out_dir: PathBuf,
}

/// Built-in brief for demo runs: licensed, under-3 age grade, chemical-safety
/// claims and a plastic material, so every rule fires.
pub fn demo_brief() -> ExtractedBrief {
    ExtractedBrief {
        product_name: "Disney Junior Wooden Blocks".to_string(),
        age_grade: "18m+".to_string(),
        markets: vec!["US".to_string(), "UK".to_string(), "AU".to_string()],
        claims: vec![
            ClaimObject {
                raw_text: "Non-toxic".to_string(),
                normalized_type: "CHEMICAL_SAFETY_CLAIM".to_string(),
                risk_keywords: vec!["non-toxic".to_string()],
                evidence_hint: "Requires test report".to_string(),
                severity: Severity::High,
            },
            ClaimObject {
                raw_text: "BPA-free".to_string(),
                normalized_type: "CHEMICAL_SAFETY_CLAIM".to_string(),
                risk_keywords: vec!["bpa".to_string()],
                evidence_hint: "Requires documentation".to_string(),
                severity: Severity::High,
            },
            ClaimObject {
                raw_text: "Safe for toddlers".to_string(),
                normalized_type: "SAFETY_CLAIM".to_string(),
                risk_keywords: vec!["safe".to_string()],
                evidence_hint: String::new(),
                severity: Severity::Medium,
            },
        ],
        materials: vec![
            "wood".to_string(),
            "plastic".to_string(),
            "cardboard".to_string(),
        ],
        licensed: true,
        notes: Some("Licensed character imagery.".to_string()),
        missing_info: vec![],
        clarifying_questions: vec![],
        issues: vec![Issue {
            issue_type: "AMBIGUOUS_AGE_GRADE".to_string(),
            message: "Age 18m+ targets under-3; quality review needed.".to_string(),
            severity: Severity::High,
        }],
    }
}

/// Run the full review workflow for one brief.
///
/// Demo mode skips the model entirely: the built-in brief is classified and
/// rendered through the fixed template. The input file is still read so both
/// modes exercise the same I/O path.
pub async fn run_review(
    config: &Config,
    input: &Path,
    out_base: &Path,
    demo: bool,
) -> Result<RunOutcome> {
    let run_id = generate_run_id();
    let out_dir = ensure_output_dir(out_base, &run_id)?;
    let audit = AuditLog::new(out_dir.join("audit.jsonl"), &run_id);

    let brief_text = read_brief(input)?;
    audit.event(
        "input_received",
        json!({
            "input_path": input.display().to_string(),
            "length": brief_text.len(),
            "demo": demo,
        }),
    )?;

    let chat: Option<Arc<dyn ChatCompletion>> = if demo { None } else { Some(create_chat(config)?) };

    let brief = match &chat {
        Some(chat) => extract_brief(chat.as_ref(), &audit, &brief_text).await?,
        None => {
            let brief = demo_brief();
            audit.event(
                "extraction_ok",
                json!({ "product_name": &brief.product_name, "demo": true }),
            )?;
            brief
        }
    };

    let decision = classify(&brief);
    audit.event(
        "risk_classified",
        json!({ "risk_level": decision.risk_level, "risk_flags": &decision.risk_flags }),
    )?;
    info!(
        "Risk classified: run_id={} level={} flags={:?}",
        run_id,
        decision.risk_level.as_str(),
        decision.risk_flags
    );

    let packet_md = match &chat {
        Some(chat) => generate_packet(chat.as_ref(), &brief, &decision, &audit).await?,
        None => template_packet(
            &brief,
            &decision,
            &run_id,
            DEMO_MODEL_NAME,
            &config.llm.prompt_version,
        ),
    };
    audit.event("packet_generated", json!({}))?;

    std::fs::write(
        out_dir.join("extracted.json"),
        serde_json::to_string_pretty(&brief)?,
    )?;
    std::fs::write(
        out_dir.join("decision.json"),
        serde_json::to_string_pretty(&decision)?,
    )?;
    std::fs::write(out_dir.join("review_packet.md"), &packet_md)?;
    audit.event("outputs_written", json!({}))?;

    Ok(RunOutcome {
        run_id,
        risk_level: decision.risk_level,
        out_dir,
    })
}
