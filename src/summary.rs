//! Plain-text run summary handed back to the operator after a run.
//!
//! This is on-screen text, so it is not sanitized.

use crate::report::Report;

pub fn describe(report: &Report) -> String {
    let alert = report.alert_level.as_str().unwrap_or("N/A");
    if report.is_frozen() {
        return frozen(report, alert);
    }

    let (approved, blocked) = report
        .summary
        .as_ref()
        .map(|s| (s.approved_changes.unwrap_or(0), s.blocked_changes.unwrap_or(0)))
        .unwrap_or((0, 0));

    [
        "Report generated successfully.".to_string(),
        format!("Status: {}", report.status),
        format!("Alert Level: {alert}"),
        "Summary:".to_string(),
        format!("- Approved Pricing Changes: {approved}"),
        format!("- Blocked Changes: {blocked}"),
        format!("- Catalog Issues Found: {}", report.catalog_issues.len()),
        format!("- Warnings: {}", report.warnings.len()),
        String::new(),
        "The dashboard has been updated with the visual details.".to_string(),
    ]
    .join("\n")
}

fn frozen(report: &Report, alert: &str) -> String {
    let mut lines = vec![
        "\u{26a0}\u{fe0f} SYSTEM THROTTLED - Operations Frozen".to_string(),
        format!("Status: {}", report.status),
        format!("Alert Level: {alert}"),
        String::new(),
        "The system detected a viral complaint spike and automatically froze all pricing operations."
            .to_string(),
        "This is a safety feature to prevent automated changes during customer service crises."
            .to_string(),
        String::new(),
        "Recommendations:".to_string(),
    ];
    if report.recommendations.is_empty() {
        lines.push("- Review customer complaints immediately".to_string());
    } else {
        lines.extend(report.recommendations.iter().map(|r| format!("- {r}")));
    }
    lines.push(String::new());
    lines.push("The dashboard shows the full alert details.".to_string());
    lines.join("\n")
}
