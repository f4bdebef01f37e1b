//! Extraction contract against a scripted provider: accept valid output,
//! repair invalid output once, then fail terminally with a full audit trail.

use std::path::PathBuf;

use packreview::audit::{AuditLog, read_events};
use packreview::extract::extract_brief;
use packreview::llm::ScriptedChat;
use packreview::schemas::Severity;
use packreview::utils::generate_run_id;

fn temp_audit() -> (AuditLog, PathBuf) {
    let run_id = generate_run_id();
    let path = std::env::temp_dir().join(format!("packreview-extract-{}.jsonl", run_id));
    (AuditLog::new(&path, run_id), path)
}

fn valid_reply() -> String {
    r#"{
        "product_name": "Eco Stacking Cups",
        "age_grade": "3+",
        "markets": ["EU", "UK"],
        "claims": [
            {
                "raw_text": "Recyclable",
                "normalized_type": "SUSTAINABILITY_CLAIM",
                "risk_keywords": ["recyclable"],
                "evidence_hint": "Requires documentation",
                "severity": "medium"
            }
        ],
        "materials": ["plastic", "cardboard"],
        "licensed": false,
        "notes": null,
        "missing_info": [],
        "clarifying_questions": ["Which EU markets exactly?"],
        "issues": [
            {"type": "AMBIGUOUS_MARKET_REQUIREMENTS", "message": "EU scope unclear.", "severity": "medium"}
        ]
    }"#
    .to_string()
}

#[tokio::test]
async fn valid_output_is_accepted_first_try() {
    let (audit, path) = temp_audit();
    let chat = ScriptedChat::new(vec![valid_reply()]);

    let brief = extract_brief(&chat, &audit, "Eco cups brief text")
        .await
        .expect("extraction succeeds");
    assert_eq!(brief.product_name, "Eco Stacking Cups");
    assert_eq!(brief.claims.len(), 1);
    assert_eq!(brief.claims[0].severity, Severity::Medium);
    assert_eq!(brief.issues.len(), 1);

    let events = read_events(&path).expect("audit readable");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "extraction_ok");
    assert_eq!(events[0].model_name.as_deref(), Some("scripted"));
    assert_eq!(events[0].payload["claims_count"], 1);
    assert_eq!(events[0].payload["issues_count"], 1);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn fenced_output_is_accepted() {
    let (audit, path) = temp_audit();
    let reply = format!("Here is the JSON:\n```json\n{}\n```", valid_reply());
    let chat = ScriptedChat::new(vec![reply]);

    let brief = extract_brief(&chat, &audit, "brief").await.expect("fence unwrapped");
    assert_eq!(brief.product_name, "Eco Stacking Cups");

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn invalid_output_is_repaired_once() {
    let (audit, path) = temp_audit();
    let chat = ScriptedChat::new(vec![
        "Sure! Here's the analysis you asked for.".to_string(),
        valid_reply(),
    ]);

    let brief = extract_brief(&chat, &audit, "brief").await.expect("repair succeeds");
    assert_eq!(brief.product_name, "Eco Stacking Cups");

    let events = read_events(&path).expect("audit readable");
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["extraction_repair_attempt", "extraction_repaired"]);
    assert!(
        events[0].payload["error"]
            .as_str()
            .expect("error recorded")
            .contains("not valid JSON")
    );

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn missing_required_field_triggers_repair() {
    let (audit, path) = temp_audit();
    let chat = ScriptedChat::new(vec![
        r#"{"age_grade": "3+", "licensed": false}"#.to_string(),
        valid_reply(),
    ]);

    let brief = extract_brief(&chat, &audit, "brief").await.expect("repair succeeds");
    assert_eq!(brief.product_name, "Eco Stacking Cups");

    let events = read_events(&path).expect("audit readable");
    assert_eq!(events[0].event_type, "extraction_repair_attempt");
    assert!(
        events[0].payload["error"]
            .as_str()
            .expect("error recorded")
            .contains("failed validation")
    );

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn second_failure_is_terminal() {
    let (audit, path) = temp_audit();
    let chat = ScriptedChat::new(vec![
        "not json".to_string(),
        "still not json".to_string(),
    ]);

    let err = extract_brief(&chat, &audit, "brief").await.unwrap_err();
    assert!(err.to_string().contains("extraction failed after repair attempt"));

    let events = read_events(&path).expect("audit readable");
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["extraction_repair_attempt", "failure"]);
    assert_eq!(events[1].payload["stage"], "extraction");

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn bare_string_claims_are_coerced() {
    let (audit, path) = temp_audit();
    let reply = r#"{
        "product_name": "Basic Ball",
        "age_grade": "5+",
        "claims": ["Bouncy", "Durable"],
        "licensed": false,
        "issues": ["no materials listed"]
    }"#;
    let chat = ScriptedChat::new(vec![reply.to_string()]);

    let brief = extract_brief(&chat, &audit, "brief").await.expect("coercion applies");
    assert_eq!(brief.claims.len(), 2);
    assert_eq!(brief.claims[0].raw_text, "Bouncy");
    assert_eq!(brief.claims[0].normalized_type, "OTHER_CLAIM");
    assert_eq!(brief.claims[0].severity, Severity::Medium);
    assert_eq!(brief.issues[0].issue_type, "OTHER");
    assert_eq!(brief.issues[0].message, "no materials listed");

    std::fs::remove_file(&path).ok();
}
