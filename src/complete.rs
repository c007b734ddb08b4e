//! Turns the state a stream left behind into the canonical report.

use crate::error::CompletionError;
use crate::ingest::{FinalState, IngestStats, WorkflowState};
use crate::report::Report;
use serde_json::Value;
use tracing::{error, info};

/// A report that passed completion, plus the object it was decoded from.
#[derive(Debug, Clone)]
pub struct Completed {
    pub report: Report,
    pub raw: Value,
    pub stats: Option<IngestStats>,
}

impl Completed {
    /// Same as [`complete`].
    pub fn from_state(state: &FinalState) -> Result<Self, CompletionError> {
        complete(state)
    }

    /// A stored report; it must still carry a status.
    pub fn from_stored(raw: Value) -> Result<Self, CompletionError> {
        let report = decode(&raw)?;
        Ok(Self {
            report,
            raw,
            stats: None,
        })
    }
}

/// Checks run in order and the first failure wins: state captured, then
/// `final_report` present, then `final_report.status` present.
pub fn final_report_value(
    latest_state: Option<&WorkflowState>,
) -> Result<&Value, CompletionError> {
    let state = latest_state.ok_or_else(|| {
        error!("no state captured from stream");
        CompletionError::NoStateCaptured
    })?;

    let report = state.get("final_report").filter(|v| truthy(v)).ok_or_else(|| {
        let keys: Vec<&str> = state.keys().map(String::as_str).collect();
        error!(?keys, "final state has no final_report");
        CompletionError::NoReportGenerated
    })?;

    if !has_status(report) {
        error!("final_report has no status");
        return Err(CompletionError::ReportMissingStatus);
    }
    Ok(report)
}

/// Unknown fields are carried along untouched in [`Report::extra`].
pub fn complete(state: &FinalState) -> Result<Completed, CompletionError> {
    let raw = final_report_value(state.latest_state.as_ref())?.clone();
    let report = decode(&raw)?;
    info!(status = %report.status, "report completed");
    Ok(Completed {
        report,
        raw,
        stats: Some(state.stats.clone()),
    })
}

/// Decodes a stored report object, applying the same status rule.
pub fn decode(value: &Value) -> Result<Report, CompletionError> {
    if !has_status(value) {
        return Err(CompletionError::ReportMissingStatus);
    }
    // Lenient fields cannot fail once the value is an object with a status.
    Report::from_value(value.clone()).map_err(|_| CompletionError::ReportMissingStatus)
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A status must be a truthy scalar; arrays and objects have no text form.
fn has_status(report: &Value) -> bool {
    match report.get("status") {
        Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => truthy(v),
        _ => false,
    }
}
