use ops_report::policy::Rgb;
use ops_report::render::layout::{
    CONTENT_BOTTOM, FOOTER_BASELINE, FOOTER_TOP, MARGIN, TOP_MARGIN, ascent,
};
use ops_report::render::{Page, Primitive, RenderOptions, render};
use ops_report::report::Report;
use serde_json::{Value, json};

const STAMP: &str = "2024-05-01 10:00:00 UTC";

fn pages_for(v: Value) -> Vec<Page> {
    let report = Report::from_value(v).unwrap();
    let opts = RenderOptions {
        generated_at: STAMP.to_string(),
        ..Default::default()
    };
    render(&report, &opts)
}

fn all_texts(pages: &[Page]) -> Vec<&str> {
    pages.iter().flat_map(|p| p.texts()).collect()
}

fn full_report() -> Value {
    let issues: Vec<Value> = (0..9)
        .map(|i| json!({"type": "critical", "product_id": format!("C{i}"), "message": "Missing image", "suggestion": "Upload one"}))
        .collect();
    let actions: Vec<Value> = (0..20)
        .map(|i| json!({"product_name": format!("Item {i}"), "current_price": 10.0, "proposed_price": 12.5, "final_price": 12.0, "status": "ADJUSTED"}))
        .collect();
    let audit: Vec<Value> = (0..10)
        .map(|i| json!({"action": "step_done", "merchant_id": "m1", "flags_found": i, "alert_level": "GREEN"}))
        .collect();
    json!({
        "status": "OK",
        "alert_level": "YELLOW",
        "alert_message": "Complaint velocity rising \u{2014} review soon",
        "summary": {"total_products": 120, "approved_changes": 40, "blocked_changes": 3, "locked_products": 2},
        "metrics": {"pricing_pass_rate": 92.5, "automated_block_rate": 4.0, "hallucination_rate": 0.0, "sentiment_score": 0.31},
        "validation_flags": [{"type": "price_mismatch", "product_id": "P9", "severity": "medium", "message": "Claimed price differs"}],
        "support_summary": {
            "sentiment": -0.2, "velocity": 3.5, "total_messages": 41, "complaint_count": 7,
            "topics": ["shipping", "refunds"],
            "classifications": [{"type": "Complaint"}, {"type": "Question"}, {"type": "Complaint"}]
        },
        "catalog_issues": issues,
        "pricing_actions": actions,
        "recommendations": ["Raise margin floor", "Audit images"],
        "warnings": ["Two products below cost"],
        "merchant_locks": {"P1": {"reason": "Seasonal"}, "P2": {}},
        "audit_log": audit
    })
}

fn is_footer(p: &Primitive) -> bool {
    match p {
        Primitive::Rect { y, .. } => *y == FOOTER_TOP,
        Primitive::Text { y, .. } => *y == FOOTER_BASELINE,
    }
}

#[test]
fn minimal_report_is_one_page() {
    let pages = pages_for(json!({"status": "OK"}));
    assert_eq!(pages.len(), 1);
    let texts = all_texts(&pages);
    assert!(texts.contains(&"Status: OK"));
    assert!(texts.contains(&"N/A"));
    assert!(texts.contains(&"SALLA OPERATIONS REPORT"));
}

#[test]
fn catalog_issues_cap_at_twelve() {
    let issues: Vec<Value> = (0..15)
        .map(|i| json!({"type": "warning", "product_id": format!("P{i}"), "message": format!("issue {i}")}))
        .collect();
    let pages = pages_for(json!({"status": "OK", "catalog_issues": issues}));
    let texts = all_texts(&pages);

    assert_eq!(texts.iter().filter(|t| **t == "[WARNING]").count(), 12);
    assert_eq!(
        texts.iter().filter(|t| **t == "... and 3 more issues").count(),
        1
    );
    let ids: Vec<&str> = texts.iter().copied().filter(|t| t.starts_with("ID: ")).collect();
    let expected: Vec<String> = (0..12).map(|i| format!("ID: P{i}")).collect();
    assert_eq!(ids, expected);
}

#[test]
fn pricing_rows_cap_at_twenty_five() {
    let actions: Vec<Value> = (0..30)
        .map(|i| json!({"product_id": format!("SKU-{i}"), "current_price": 1.0}))
        .collect();
    let pages = pages_for(json!({"status": "OK", "pricing_actions": actions}));
    let texts = all_texts(&pages);
    assert_eq!(texts.iter().filter(|t| t.starts_with("SKU-")).count(), 25);
    assert!(texts.contains(&"... and 5 more actions"));
    assert_eq!(texts.iter().filter(|t| **t == "UNKNOWN").count(), 25);
}

#[test]
fn sections_follow_fixed_order() {
    let pages = pages_for(full_report());
    let texts = all_texts(&pages);
    let order = [
        "SUMMARY",
        "RELIABILITY METRICS",
        "VALIDATION FLAGS (HALLUCINATION DETECTION)",
        "CUSTOMER SUPPORT ANALYSIS",
        "TRENDING TOPICS",
        "MESSAGE CLASSIFICATION",
        "CATALOG HEALTH ANALYSIS",
        "PRICING ACTIONS",
        "RECOMMENDATIONS",
        "WARNINGS",
        "LOCKED PRODUCTS (MERCHANT OVERRIDES)",
        "AUDIT TRAIL",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|title| {
            texts
                .iter()
                .position(|t| t == title)
                .unwrap_or_else(|| panic!("missing section {title}"))
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
}

#[test]
fn every_page_gets_the_footer_pair() {
    let pages = pages_for(full_report());
    let n = pages.len();
    assert!(n > 1);
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.number, i + 1);
        let texts: Vec<&str> = page.texts().collect();
        let numbered = format!("Page {} of {}", i + 1, n);
        let stamped = format!("Generated: {STAMP}");
        assert_eq!(texts.iter().filter(|t| **t == numbered).count(), 1);
        assert_eq!(texts.iter().filter(|t| **t == stamped).count(), 1);
    }
}

#[test]
fn content_stays_inside_margins() {
    let mut report = full_report();
    report["warnings"] = json!((0..40).map(|i| format!("warning {i} ").repeat(12)).collect::<Vec<_>>());
    let pages = pages_for(report);
    for page in &pages {
        for p in page.primitives.iter().filter(|p| !is_footer(p)) {
            match p {
                Primitive::Rect { y, h, .. } => {
                    assert!(*y >= TOP_MARGIN, "page {}: {p:?}", page.number);
                    assert!(y + h <= CONTENT_BOTTOM, "page {}: {p:?}", page.number);
                }
                Primitive::Text { y, size, .. } => {
                    assert!(y - ascent(*size) >= TOP_MARGIN, "page {}: {p:?}", page.number);
                    assert!(*y <= CONTENT_BOTTOM, "page {}: {p:?}", page.number);
                }
            }
        }
    }
}

#[test]
fn long_lists_keep_their_order_across_pages() {
    let warnings: Vec<String> = (0..80).map(|i| format!("w{i:02}")).collect();
    let pages = pages_for(json!({"status": "OK", "warnings": warnings}));
    assert!(pages.len() > 1);
    let seen: Vec<&str> = all_texts(&pages)
        .into_iter()
        .filter(|t| t.starts_with("! w"))
        .collect();
    let expected: Vec<String> = (0..80).map(|i| format!("! w{i:02}")).collect();
    assert_eq!(seen, expected);
}

#[test]
fn missing_numbers_render_as_zero() {
    let pages = pages_for(json!({
        "status": "OK",
        "summary": {},
        "metrics": {},
        "pricing_actions": [{"product_name": "Widget"}]
    }));
    let texts = all_texts(&pages);
    assert_eq!(texts.iter().filter(|t| **t == "0").count(), 4);
    assert_eq!(texts.iter().filter(|t| **t == "0.0%").count(), 3);
    assert!(texts.contains(&"0.00"));
    assert_eq!(texts.iter().filter(|t| **t == "$0.00").count(), 3);
}

#[test]
fn document_text_is_ascii() {
    let pages = pages_for(json!({
        "status": "OK \u{2705}",
        "alert_message": "\u{1f6a8} Spike \u{2014} \u{201c}urgent\u{201d}",
        "warnings": ["caf\u{e9} \u{2192} closed"],
        "merchant_locks": {"\u{1f512}P1": {"reason": "\u{2026}"}}
    }));
    for t in all_texts(&pages) {
        assert!(t.is_ascii(), "{t}");
    }
    let texts = all_texts(&pages);
    assert!(texts.contains(&"Spike - \"urgent\""));
    assert!(texts.contains(&"! caf > closed"));
}

#[test]
fn classification_grid_wraps_after_four() {
    let kinds = ["Shipping", "Refund", "Quality", "Billing", "Delivery", "Other"];
    let classifications: Vec<Value> = kinds.iter().map(|k| json!({"type": k})).collect();
    let pages = pages_for(json!({
        "status": "OK",
        "support_summary": {"classifications": classifications}
    }));
    let position = |label: &str| {
        pages[0]
            .primitives
            .iter()
            .find_map(|p| match p {
                Primitive::Text { x, y, content, .. } if content == label => Some((*x, *y)),
                _ => None,
            })
            .unwrap()
    };
    let (x0, y0) = position("Shipping");
    let (x4, y4) = position("Delivery");
    assert_eq!(x0, MARGIN + 2.0);
    assert_eq!(x4, x0);
    assert!(y4 > y0);
}

#[test]
fn status_badges_follow_action_status() {
    let pages = pages_for(json!({
        "status": "OK",
        "pricing_actions": [{"product_id": "A", "status": "BLOCKED"}]
    }));
    let badge = pages[0].primitives.iter().any(|p| {
        matches!(p, Primitive::Rect { w, fill: Some(fill), .. } if *w == 25.0 && *fill == Rgb::hex(0xfee2e2))
    });
    assert!(badge);
}
