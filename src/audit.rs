//! Append-only JSONL audit log: one event object per line, per run.
//!
//! Events are written in pipeline order and never rewritten, so the file
//! doubles as a replayable trace of what happened during a run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One audit record as it appears on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub run_id: String,
    pub event_type: String,
    /// Model that produced the step, or null for deterministic steps
    pub model_name: Option<String>,
    /// Event-specific structured data
    pub payload: Value,
}

/// Writer bound to one run's audit file
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    run_id: String,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            run_id: run_id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event from a deterministic pipeline step
    pub fn event(&self, event_type: &str, payload: Value) -> Result<()> {
        self.append(event_type, payload, None)
    }

    /// Append an event attributed to a model
    pub fn event_with_model(&self, event_type: &str, payload: Value, model_name: &str) -> Result<()> {
        self.append(event_type, payload, Some(model_name.to_string()))
    }

    fn append(&self, event_type: &str, payload: Value, model_name: Option<String>) -> Result<()> {
        let record = AuditEvent {
            timestamp: Utc::now(),
            run_id: self.run_id.clone(),
            event_type: event_type.to_string(),
            model_name,
            payload,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Read back every event in a run's audit file, in write order
pub fn read_events(path: &Path) -> Result<Vec<AuditEvent>> {
    let content = std::fs::read_to_string(path)?;
    let mut events = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        events.push(serde_json::from_str(line)?);
    }
    Ok(events)
}
