use ops_report::complete::{complete, decode, final_report_value};
use ops_report::error::CompletionError;
use ops_report::ingest::FinalState;
use ops_report::report::AlertLevel;
use serde_json::{Value, json};

fn state(v: Value) -> FinalState {
    FinalState {
        latest_state: v.as_object().cloned(),
        ..Default::default()
    }
}

#[test]
fn nothing_captured() {
    let err = complete(&FinalState::default()).unwrap_err();
    assert_eq!(err, CompletionError::NoStateCaptured);
    assert_eq!(
        err.to_string(),
        "Workflow completed but no state was captured from the stream."
    );
}

#[test]
fn empty_state_has_no_report() {
    let err = complete(&state(json!({}))).unwrap_err();
    assert_eq!(err, CompletionError::NoReportGenerated);
    assert_eq!(err.to_string(), "Workflow completed but no report was generated.");
}

#[test]
fn report_without_status() {
    let err = complete(&state(json!({"final_report": {}}))).unwrap_err();
    assert_eq!(err, CompletionError::ReportMissingStatus);
    assert_eq!(err.to_string(), "Workflow completed but report has no status.");
}

#[test]
fn falsy_final_report_is_not_generated() {
    for value in [json!(false), json!(""), json!(0), json!(null)] {
        let err = complete(&state(json!({"final_report": value}))).unwrap_err();
        assert_eq!(err, CompletionError::NoReportGenerated, "{value}");
    }
}

#[test]
fn structured_status_counts_as_missing() {
    for status in [json!({"code": "OK"}), json!(["OK"]), json!(0), json!(false)] {
        let err = complete(&state(json!({"final_report": {"status": status}}))).unwrap_err();
        assert_eq!(err, CompletionError::ReportMissingStatus, "{status}");
    }
}

#[test]
fn completion_keeps_ingest_stats() {
    let mut st = state(json!({"final_report": {"status": "OK"}}));
    st.stats.messages = 3;
    let done = complete(&st).unwrap();
    assert_eq!(done.stats.unwrap().messages, 3);
}

#[test]
fn frozen_report_is_returned_unchanged() {
    let st = state(json!({"final_report": {"status": "FROZEN"}, "other": 1}));
    let raw = final_report_value(st.latest_state.as_ref()).unwrap();
    assert_eq!(raw, &json!({"status": "FROZEN"}));

    let done = complete(&st).unwrap();
    assert_eq!(done.raw, json!({"status": "FROZEN"}));
    let report = done.report;
    assert!(report.is_frozen());
    assert_eq!(serde_json::to_value(&report).unwrap(), json!({"status": "FROZEN"}));
}

#[test]
fn unknown_fields_survive_decoding() {
    let raw = json!({"status": "OK", "run_label": "nightly", "alert_level": "yellow"});
    let report = decode(&raw).unwrap();
    assert_eq!(report.alert_level, AlertLevel::Yellow);
    assert_eq!(report.extra.get("run_label"), Some(&json!("nightly")));
}

#[test]
fn wrong_shapes_degrade_to_absent() {
    let raw = json!({
        "status": "OK",
        "summary": "not an object",
        "metrics": {"pricing_pass_rate": "85.5", "hallucination_rate": null},
        "catalog_issues": [1, {"type": "warning"}, "x"],
        "recommendations": ["a", 2, null],
        "merchant_locks": {"P1": {"reason": "hold"}, "P2": "odd"},
        "retry_count": 2.0
    });
    let report = decode(&raw).unwrap();
    assert!(report.summary.is_none());
    let metrics = report.metrics.unwrap();
    assert_eq!(metrics.pricing_pass_rate, Some(85.5));
    assert_eq!(metrics.hallucination_rate, None);
    assert_eq!(report.catalog_issues.len(), 1);
    assert_eq!(report.recommendations, vec!["a", "2"]);
    assert_eq!(report.merchant_locks["P1"].reason(), "hold");
    assert_eq!(report.merchant_locks["P2"].reason(), "Manual override");
    assert_eq!(report.retry_count, Some(2));
}

#[test]
fn merchant_locks_keep_upstream_order() {
    let raw = json!({"status": "OK", "merchant_locks": {"z": {}, "a": {}, "m": {}}});
    let report = decode(&raw).unwrap();
    let ids: Vec<&str> = report.merchant_locks.keys().map(String::as_str).collect();
    assert_eq!(ids, ["z", "a", "m"]);
}
