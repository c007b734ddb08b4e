//! Section recipes, drawn top to bottom in a fixed order.

use super::layout::{
    Block, GRID_BOX_WIDTH, GRID_COLUMNS, GRID_GAP, INNER_WIDTH, MARGIN, MAX_CATALOG_ISSUES,
    MAX_PRICING_ACTIONS, PAGE_WIDTH, TOP_MARGIN, clamp_lines, line_height, truncate_to_width, wrap,
};
use super::{Canvas, RenderOptions, TextStyle};
use crate::policy::{ActionStatus, Metric, Rgb, Severity};
use crate::report::Report;

const ACCENT: Rgb = Rgb::hex(0x667eea);
const PANEL: Rgb = Rgb::hex(0xf9fafb);
const PANEL_BORDER: Rgb = Rgb::hex(0xe5e7eb);
const INK: Rgb = Rgb::hex(0x1f2937);
const HEADING: Rgb = Rgb::hex(0x374151);
const MUTED: Rgb = Rgb::hex(0x4b5563);
const FAINT: Rgb = Rgb::hex(0x6b7280);
const WARNING_INK: Rgb = Rgb::hex(0x7f1d1d);
const FIX_INK: Rgb = Rgb::hex(0x059669);

const MAX_ALERT_LINES: usize = 20;
const MAX_CARD_LINES: usize = 6;
/// Lines per tinted text box; longer items continue in a new box.
const MAX_BOX_LINES: usize = 24;
/// Table rows extend this far below their baseline.
const ROW_DEPTH: f64 = 3.0;

use super::FontWeight::{Bold, Italic, Normal};

pub(crate) fn draw_all(c: &mut Canvas, report: &Report, opts: &RenderOptions) {
    header(c, report, opts);
    alert_message(c, report);
    summary(c, report);
    metrics(c, report);
    validation_flags(c, report);
    support(c, report);
    catalog_issues(c, report);
    pricing_actions(c, report);
    recommendations(c, report);
    warnings(c, report);
    merchant_locks(c, report);
    audit_log(c, report);
}

fn grid_x(col: usize) -> f64 {
    MARGIN + col as f64 * (GRID_BOX_WIDTH + GRID_GAP)
}

fn clean_or(c: &Canvas, value: Option<&str>, fallback: &str) -> String {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => c.clean(v),
        None => fallback.to_string(),
    }
}

/// One primitive per line, `line_height` apart. Returns the last baseline.
fn draw_lines(
    c: &mut Canvas,
    x: f64,
    first_baseline: f64,
    lines: Vec<String>,
    style: TextStyle,
    max_width: f64,
) -> f64 {
    let lh = line_height(style.size);
    let mut baseline = first_baseline;
    for (i, line) in lines.into_iter().enumerate() {
        baseline = first_baseline + i as f64 * lh;
        c.text_wrapped(x, baseline, line, style, max_width);
    }
    baseline
}

fn section_header(c: &mut Canvas, title: &str) {
    let y = c.y;
    c.rect(MARGIN, y - 3.0, 3.0, 10.0, Some(ACCENT), None);
    c.text(
        MARGIN + 6.0,
        y + 4.0,
        title.to_string(),
        TextStyle::new(13.0, Bold, HEADING),
    );
    c.y = y + 12.0;
}

fn notice(c: &mut Canvas, content: String) {
    c.ensure_block(Block::Notice);
    let y = c.y;
    c.text(MARGIN, y, content, TextStyle::new(8.0, Italic, FAINT));
    c.y = y + 8.0;
}

#[derive(Clone, Copy)]
struct Tint {
    fill: Rgb,
    stroke: Rgb,
    ink: Rgb,
}

/// Word-wrapped text inside tinted boxes spanning the content width.
fn text_boxes(c: &mut Canvas, text: &str, block: Block, tint: Tint) {
    let size = 9.0;
    let width = INNER_WIDTH - 6.0;
    let lh = line_height(size);
    let mut lines = wrap(text, size, Normal, width);
    if lines.is_empty() {
        lines.push(String::new());
    }
    let style = TextStyle::new(size, Normal, tint.ink);
    for chunk in lines.chunks(MAX_BOX_LINES) {
        let height = (chunk.len() as f64 * lh + 4.0).max(8.0);
        c.ensure_space(block, height);
        let y = c.y;
        c.rect(MARGIN, y - 2.0, INNER_WIDTH, height, Some(tint.fill), Some(tint.stroke));
        draw_lines(c, MARGIN + 3.0, y + 2.0, chunk.to_vec(), style, width);
        c.y = y + height + 2.0;
    }
}

fn header(c: &mut Canvas, report: &Report, opts: &RenderOptions) {
    c.rect(0.0, TOP_MARGIN, PAGE_WIDTH, 20.0, Some(ACCENT), None);
    let title = c.clean(&opts.title);
    c.text(
        PAGE_WIDTH / 2.0,
        22.0,
        title,
        TextStyle::new(20.0, Bold, Rgb::WHITE).centered(),
    );

    let y = 38.0;
    let badge = Severity::from(report.alert_level).palette().border;
    c.rect(PAGE_WIDTH - MARGIN - 35.0, y, 30.0, 8.0, Some(badge), None);
    let level = report.alert_level.as_str().unwrap_or("N/A");
    c.text(
        PAGE_WIDTH - MARGIN - 30.0,
        y + 5.5,
        level.to_string(),
        TextStyle::new(10.0, Bold, Rgb::WHITE),
    );

    let status = clean_or(c, Some(report.status.as_str()), "N/A");
    c.text(
        MARGIN,
        y + 5.0,
        format!("Status: {status}"),
        TextStyle::new(11.0, Normal, Rgb::BLACK),
    );
    c.y = y + 15.0;
}

fn alert_message(c: &mut Canvas, report: &Report) {
    let Some(raw) = report.alert_message.as_deref().filter(|m| !m.is_empty()) else {
        return;
    };
    let size = 9.0;
    let width = INNER_WIDTH - 10.0;
    let lines = clamp_lines(wrap(&c.clean(raw), size, Normal, width), MAX_ALERT_LINES);
    let height = (lines.len() as f64 * line_height(size) + 6.0).max(25.0);

    c.ensure_space(Block::AlertMessage, height);
    let y = c.y;
    let palette = Severity::Critical.palette();
    c.rect(MARGIN, y, INNER_WIDTH, height, Some(palette.background), Some(palette.border));
    let style = TextStyle::new(size, Normal, WARNING_INK);
    draw_lines(c, MARGIN + 5.0, y + 5.0, lines, style, width);
    c.y = y + height + 5.0;
}

fn summary(c: &mut Canvas, report: &Report) {
    let Some(summary) = &report.summary else {
        return;
    };
    c.ensure_block(Block::Summary);
    section_header(c, "SUMMARY");

    let y = c.y;
    for (idx, (label, value)) in summary.cells().into_iter().enumerate() {
        let x = grid_x(idx);
        let cx = x + GRID_BOX_WIDTH / 2.0;
        c.rect(x, y, GRID_BOX_WIDTH, 18.0, Some(PANEL), Some(PANEL_BORDER));
        c.text(cx, y + 6.0, label.to_string(), TextStyle::new(8.0, Normal, FAINT).centered());
        c.text(cx, y + 14.0, value.to_string(), TextStyle::new(16.0, Bold, INK).centered());
    }
    c.y = y + 25.0;
}

fn metrics(c: &mut Canvas, report: &Report) {
    let Some(m) = &report.metrics else {
        return;
    };
    c.ensure_block(Block::Metrics);
    section_header(c, "RELIABILITY METRICS");

    let values = [
        m.pricing_pass_rate,
        m.automated_block_rate,
        m.hallucination_rate,
        m.sentiment_score,
    ];
    let y = c.y;
    for (idx, (metric, value)) in Metric::ALL.into_iter().zip(values).enumerate() {
        let value = value.unwrap_or(0.0);
        let palette = metric.assess(value).palette();
        let x = grid_x(idx);
        let cx = x + GRID_BOX_WIDTH / 2.0;
        c.rect(x, y, GRID_BOX_WIDTH, 20.0, Some(palette.background), Some(palette.border));
        c.text(cx, y + 4.0, metric.label().to_string(), TextStyle::new(7.0, Normal, MUTED).centered());
        c.text(cx, y + 11.0, metric.format(value), TextStyle::new(14.0, Bold, INK).centered());
        c.text(
            cx,
            y + 16.0,
            format!("Target: {}", metric.target()),
            TextStyle::new(6.0, Italic, FAINT).centered(),
        );
    }
    c.y = y + 26.0;
}

/// Box height for a card whose body starts at `first_baseline` and runs
/// `lines` lines of `size` points.
fn card_height(min: f64, first_baseline: f64, lines: usize, size: f64) -> f64 {
    let extra = lines.saturating_sub(1) as f64 * line_height(size);
    min.max(first_baseline + extra + 3.0)
}

fn validation_flags(c: &mut Canvas, report: &Report) {
    if report.validation_flags.is_empty() {
        return;
    }
    c.ensure_block(Block::ValidationFlags);
    section_header(c, "VALIDATION FLAGS (HALLUCINATION DETECTION)");

    let width = INNER_WIDTH - 6.0;
    let meta = TextStyle::new(7.0, Normal, MUTED);
    for flag in &report.validation_flags {
        let kind = clean_or(c, flag.kind.as_deref(), "VALIDATION").to_uppercase();
        let severity = flag.severity.as_deref().filter(|s| !s.is_empty()).unwrap_or("HIGH");
        let palette = Severity::from_tag(severity).palette();
        let severity = c.clean(severity).to_uppercase();
        let id = clean_or(c, flag.product_id.as_deref(), "N/A");
        let message = c.clean(flag.message.as_deref().unwrap_or(""));
        let lines = clamp_lines(wrap(&message, 8.0, Normal, width), MAX_CARD_LINES);
        let height = card_height(14.0, 9.0, lines.len(), 8.0);

        c.ensure_space(Block::FlagCard, height);
        let y = c.y;
        c.rect(MARGIN, y, INNER_WIDTH, height, Some(palette.background), Some(palette.border));
        c.text(MARGIN + 2.0, y + 4.0, format!("[{kind}]"), TextStyle::new(8.0, Bold, Rgb::BLACK));
        c.text(MARGIN + 35.0, y + 4.0, format!("ID: {id}"), meta);
        c.text(MARGIN + 70.0, y + 4.0, format!("Severity: {severity}"), meta);
        draw_lines(c, MARGIN + 2.0, y + 9.0, lines, TextStyle::new(8.0, Normal, INK), width);
        c.y = y + height + 2.0;
    }
}

fn support(c: &mut Canvas, report: &Report) {
    let Some(s) = report.support_summary.as_ref().filter(|s| !s.is_empty()) else {
        return;
    };
    c.ensure_block(Block::Support);
    section_header(c, "CUSTOMER SUPPORT ANALYSIS");

    let mut stats = Vec::new();
    if let Some(v) = s.sentiment {
        stats.push(("Sentiment", format!("{v:.2}")));
    }
    if let Some(v) = s.velocity {
        stats.push(("Complaint Velocity", format!("{v:.1}/10")));
    }
    if let Some(n) = s.total_messages.filter(|n| *n != 0) {
        stats.push(("Messages Analyzed", n.to_string()));
    }
    if let Some(n) = s.complaint_count {
        stats.push(("Complaints", n.to_string()));
    }
    if !stats.is_empty() {
        let y = c.y;
        for (idx, (label, value)) in stats.into_iter().enumerate() {
            let x = grid_x(idx);
            c.rect(x, y, GRID_BOX_WIDTH, 12.0, Some(PANEL), Some(PANEL_BORDER));
            c.text(x + 2.0, y + 5.0, label.to_string(), TextStyle::new(8.0, Bold, HEADING));
            c.text(x + 2.0, y + 9.0, value, TextStyle::new(9.0, Normal, HEADING));
        }
        c.y = y + 18.0;
    }

    if !s.topics.is_empty() {
        c.ensure_block(Block::Topics);
        section_header(c, "TRENDING TOPICS");
        let joined = s
            .topics
            .iter()
            .map(|t| c.clean(t))
            .collect::<Vec<_>>()
            .join(", ");
        let amber = Severity::Warning.palette();
        let tint = Tint {
            fill: amber.background,
            stroke: amber.border,
            ink: HEADING,
        };
        text_boxes(c, &joined, Block::Topics, tint);
    }

    let breakdown: Vec<(String, usize)> = s.breakdown().into_iter().collect();
    if !breakdown.is_empty() {
        c.ensure_block(Block::Classification);
        section_header(c, "MESSAGE CLASSIFICATION");
        for row in breakdown.chunks(GRID_COLUMNS) {
            c.ensure_space(Block::Classification, 12.0);
            let y = c.y;
            for (col, (kind, count)) in row.iter().enumerate() {
                let x = grid_x(col);
                let label = truncate_to_width(&c.clean(kind), 7.0, Bold, GRID_BOX_WIDTH - 4.0);
                c.rect(x, y, GRID_BOX_WIDTH, 12.0, Some(PANEL), Some(PANEL_BORDER));
                c.text(x + 2.0, y + 5.0, label, TextStyle::new(7.0, Bold, HEADING));
                c.text(x + 2.0, y + 10.0, count.to_string(), TextStyle::new(12.0, Bold, HEADING));
            }
            c.y = y + 14.0;
        }
        c.y += 2.0;
    }
}

fn catalog_issues(c: &mut Canvas, report: &Report) {
    let issues = &report.catalog_issues;
    if issues.is_empty() {
        return;
    }
    c.ensure_block(Block::CatalogIssues);
    section_header(c, "CATALOG HEALTH ANALYSIS");

    let width = INNER_WIDTH - 6.0;
    for issue in issues.iter().take(MAX_CATALOG_ISSUES) {
        let kind = issue.kind.as_deref().filter(|k| !k.is_empty());
        let palette = Severity::from_tag(kind.unwrap_or("info")).palette();
        let label = clean_or(c, kind, "NOTICE").to_uppercase();
        let id = clean_or(c, issue.product_id.as_deref(), "N/A");
        let message = clamp_lines(wrap(&c.clean(issue.text()), 8.0, Normal, width), MAX_CARD_LINES);
        let fix = issue
            .suggestion()
            .map(|s| {
                let text = format!("> Fixed: {}", c.clean(s));
                clamp_lines(wrap(&text, 7.0, Italic, width), MAX_CARD_LINES)
            })
            .unwrap_or_default();

        let message_end = 8.0 + message.len().saturating_sub(1) as f64 * line_height(8.0);
        let fix_start = message_end + 5.0;
        let height = if fix.is_empty() {
            card_height(12.0, message_end, 1, 8.0)
        } else {
            card_height(18.0, fix_start, fix.len(), 7.0)
        };

        c.ensure_space(Block::IssueCard, height);
        let y = c.y;
        c.rect(MARGIN, y, INNER_WIDTH, height, Some(palette.background), Some(palette.border));
        c.text(MARGIN + 2.0, y + 4.0, format!("[{label}]"), TextStyle::new(8.0, Bold, Rgb::BLACK));
        c.text(MARGIN + 30.0, y + 4.0, format!("ID: {id}"), TextStyle::new(7.0, Normal, MUTED));
        draw_lines(c, MARGIN + 2.0, y + 8.0, message, TextStyle::new(8.0, Normal, INK), width);
        if !fix.is_empty() {
            draw_lines(c, MARGIN + 2.0, y + fix_start, fix, TextStyle::new(7.0, Italic, FIX_INK), width);
        }
        c.y = y + height + 2.0;
    }

    if issues.len() > MAX_CATALOG_ISSUES {
        notice(c, format!("... and {} more issues", issues.len() - MAX_CATALOG_ISSUES));
    }
}

fn table_header(c: &mut Canvas, columns: &[(f64, &str)]) {
    let y = c.y;
    c.rect(MARGIN, y, INNER_WIDTH, 8.0, Some(PANEL), Some(PANEL_BORDER));
    let style = TextStyle::new(8.0, Bold, HEADING);
    for (dx, label) in columns {
        c.text(MARGIN + dx, y + 5.0, label.to_string(), style);
    }
    c.y = y + 10.0;
}

/// Every even row gets a light fill behind it.
fn stripe(c: &mut Canvas, idx: usize) {
    if idx % 2 == 0 {
        let y = c.y;
        c.rect(MARGIN, y - ROW_DEPTH, INNER_WIDTH, 2.0 * ROW_DEPTH, Some(PANEL), None);
    }
}

fn badge(c: &mut Canvas, x: f64, label: String, status: ActionStatus) {
    let y = c.y;
    let (fill, ink) = status.badge();
    let label = truncate_to_width(&label, 6.0, Bold, 24.0);
    c.rect(x, y - ROW_DEPTH, 25.0, 5.0, Some(fill), None);
    c.text(x + 12.5, y, label, TextStyle::new(6.0, Bold, ink).centered());
}

fn pricing_actions(c: &mut Canvas, report: &Report) {
    let actions = &report.pricing_actions;
    if actions.is_empty() {
        return;
    }
    c.ensure_block(Block::PricingActions);
    section_header(c, "PRICING ACTIONS");
    table_header(
        c,
        &[
            (2.0, "Product"),
            (60.0, "Current"),
            (85.0, "Proposed"),
            (115.0, "Final"),
            (140.0, "Status"),
        ],
    );

    let cell = TextStyle::new(7.0, Normal, MUTED);
    for (idx, action) in actions.iter().take(MAX_PRICING_ACTIONS).enumerate() {
        c.ensure_space(Block::PricingRow, ROW_DEPTH);
        stripe(c, idx);
        let y = c.y;
        let name: String = c.clean(action.label()).chars().take(30).collect();
        c.text(MARGIN + 2.0, y, name, cell);
        let prices = [
            (60.0, action.current_price),
            (85.0, action.proposed_price),
            (115.0, action.final_price),
        ];
        for (dx, price) in prices {
            c.text(MARGIN + dx, y, format!("${:.2}", price.unwrap_or(0.0)), cell);
        }
        let status = clean_or(c, action.status.as_deref(), "UNKNOWN");
        let kind = ActionStatus::from_tag(&status);
        badge(c, MARGIN + 140.0, status, kind);
        c.y = y + 6.0;
    }

    if actions.len() > MAX_PRICING_ACTIONS {
        c.y += 2.0;
        notice(c, format!("... and {} more actions", actions.len() - MAX_PRICING_ACTIONS));
    }
}

fn recommendations(c: &mut Canvas, report: &Report) {
    if report.recommendations.is_empty() {
        return;
    }
    c.ensure_block(Block::Recommendations);
    section_header(c, "RECOMMENDATIONS");
    let tint = Tint {
        fill: PANEL,
        stroke: ACCENT,
        ink: HEADING,
    };
    for rec in &report.recommendations {
        let text = format!("> {}", c.clean(rec));
        text_boxes(c, &text, Block::TextItem, tint);
    }
}

fn warnings(c: &mut Canvas, report: &Report) {
    if report.warnings.is_empty() {
        return;
    }
    c.ensure_block(Block::Warnings);
    section_header(c, "WARNINGS");
    let tint = Tint {
        fill: Rgb::hex(0xfef2f2),
        stroke: Severity::Critical.palette().border,
        ink: WARNING_INK,
    };
    for warning in &report.warnings {
        let text = format!("! {}", c.clean(warning));
        text_boxes(c, &text, Block::TextItem, tint);
    }
}

fn merchant_locks(c: &mut Canvas, report: &Report) {
    if report.merchant_locks.is_empty() {
        return;
    }
    c.ensure_block(Block::MerchantLocks);
    section_header(c, "LOCKED PRODUCTS (MERCHANT OVERRIDES)");
    table_header(c, &[(2.0, "Product ID"), (50.0, "Reason"), (130.0, "Status")]);

    let cell = TextStyle::new(7.0, Normal, MUTED);
    for (idx, (product_id, lock)) in report.merchant_locks.iter().enumerate() {
        c.ensure_space(Block::LockRow, ROW_DEPTH);
        stripe(c, idx);
        let y = c.y;
        let id = truncate_to_width(&c.clean(product_id), 7.0, Normal, 46.0);
        let reason = truncate_to_width(&c.clean(lock.reason()), 7.0, Normal, 78.0);
        c.text(MARGIN + 2.0, y, id, cell);
        c.text(MARGIN + 50.0, y, reason, cell);
        badge(c, MARGIN + 130.0, "LOCKED".to_string(), ActionStatus::Locked);
        c.y = y + 6.0;
    }
}

fn audit_log(c: &mut Canvas, report: &Report) {
    if report.audit_log.is_empty() {
        return;
    }
    c.ensure_block(Block::AuditLog);
    section_header(c, "AUDIT TRAIL");

    let detail = TextStyle::new(7.0, Normal, MUTED);
    for (idx, entry) in report.audit_log.iter().enumerate() {
        c.ensure_space(Block::AuditCard, 12.0);
        let y = c.y;
        c.rect(MARGIN, y, INNER_WIDTH, 12.0, Some(PANEL), Some(ACCENT));
        let headline = format!("Step {}: {}", idx + 1, c.clean(&entry.headline()));
        c.text(MARGIN + 2.0, y + 4.0, headline, TextStyle::new(8.0, Bold, ACCENT));

        if let Some(merchant) = entry.merchant_id.as_deref().filter(|m| !m.is_empty()) {
            let merchant = format!("Merchant: {}", c.clean(merchant));
            c.text(MARGIN + 2.0, y + 8.0, merchant, detail);
        }
        if let Some(flags) = entry.flags_found {
            c.text(MARGIN + 60.0, y + 8.0, format!("Flags: {flags}"), detail);
        }
        if let Some(level) = entry.alert_level.as_deref().filter(|l| !l.is_empty()) {
            let level = format!("Alert: {}", c.clean(level));
            c.text(MARGIN + 90.0, y + 8.0, level, detail);
        }
        c.y = y + 14.0;
    }
}
