//! Fixed page geometry, the page-break table, and text measurement.
//!
//! Units are millimetres on an A4 portrait page; font sizes are points.

use super::FontWeight;

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
pub const MARGIN: f64 = 15.0;
pub const INNER_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

/// Nothing but the title band is drawn above this line.
pub const TOP_MARGIN: f64 = 10.0;
/// Cursor position on a freshly added page.
pub const CONTENT_TOP: f64 = 20.0;
/// Content never extends below this line; the footer band lives under it.
pub const CONTENT_BOTTOM: f64 = 285.0;
pub const FOOTER_TOP: f64 = 287.0;
pub const FOOTER_BASELINE: f64 = 292.0;

pub const GRID_COLUMNS: usize = 4;
pub const GRID_GAP: f64 = 3.0;
pub const GRID_BOX_WIDTH: f64 = (INNER_WIDTH - GRID_GAP * (GRID_COLUMNS as f64 - 1.0)) / GRID_COLUMNS as f64;

pub const MAX_CATALOG_ISSUES: usize = 12;
pub const MAX_PRICING_ACTIONS: usize = 25;

const PT_TO_MM: f64 = 0.3528;
const LINE_SPACING: f64 = 1.15;
const BOLD_WIDTH_FACTOR: f64 = 1.06;

/// Every block that can trigger a page break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    AlertMessage,
    Summary,
    Metrics,
    ValidationFlags,
    FlagCard,
    Support,
    Topics,
    Classification,
    CatalogIssues,
    IssueCard,
    PricingActions,
    PricingRow,
    Recommendations,
    Warnings,
    TextItem,
    MerchantLocks,
    LockRow,
    AuditLog,
    AuditCard,
    Notice,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRule {
    /// Height reserved when the caller has no exact measurement.
    pub estimated_height: f64,
    /// Start a new page when the cursor is already below this line.
    pub break_threshold: Option<f64>,
}

const fn rule(estimated_height: f64, break_threshold: Option<f64>) -> BlockRule {
    BlockRule {
        estimated_height,
        break_threshold,
    }
}

impl Block {
    pub fn rule(self) -> BlockRule {
        match self {
            Block::AlertMessage => rule(30.0, Some(240.0)),
            Block::Summary => rule(37.0, None),
            Block::Metrics => rule(38.0, Some(240.0)),
            Block::ValidationFlags => rule(28.0, Some(220.0)),
            Block::FlagCard => rule(16.0, Some(260.0)),
            Block::Support => rule(30.0, Some(240.0)),
            Block::Topics => rule(22.0, None),
            Block::Classification => rule(28.0, None),
            Block::CatalogIssues => rule(26.0, Some(220.0)),
            Block::IssueCard => rule(14.0, Some(260.0)),
            Block::PricingActions => rule(31.0, Some(200.0)),
            Block::PricingRow => rule(6.0, Some(275.0)),
            Block::Recommendations => rule(22.0, Some(230.0)),
            Block::Warnings => rule(22.0, Some(230.0)),
            Block::TextItem => rule(10.0, Some(275.0)),
            Block::MerchantLocks => rule(31.0, Some(220.0)),
            Block::LockRow => rule(6.0, Some(275.0)),
            Block::AuditLog => rule(26.0, Some(220.0)),
            Block::AuditCard => rule(14.0, Some(270.0)),
            Block::Notice => rule(8.0, None),
        }
    }
}

/// Helvetica advance widths for printable ASCII, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn char_width(ch: char) -> u16 {
    let cp = ch as usize;
    if (32..127).contains(&cp) {
        HELVETICA_WIDTHS[cp - 32]
    } else {
        556
    }
}

pub fn text_width(text: &str, size: f64, weight: FontWeight) -> f64 {
    let em: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    let factor = match weight {
        FontWeight::Bold => BOLD_WIDTH_FACTOR,
        _ => 1.0,
    };
    f64::from(em) / 1000.0 * size * PT_TO_MM * factor
}

pub fn line_height(size: f64) -> f64 {
    size * PT_TO_MM * LINE_SPACING
}

/// Distance from a baseline up to the top of its glyphs.
pub fn ascent(size: f64) -> f64 {
    size * PT_TO_MM * 0.8
}

/// Greedy word wrap. Explicit newlines start new lines; words wider than
/// `max_width` are broken between characters.
pub fn wrap(text: &str, size: f64, weight: FontWeight, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, size, weight) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, size, weight) <= max_width {
                current = word.to_string();
            } else {
                for ch in word.chars() {
                    current.push(ch);
                    if text_width(&current, size, weight) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::replace(&mut current, ch.to_string()));
                    }
                }
            }
        }
        lines.push(current);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Keeps at most `max` lines, marking the cut with an ellipsis.
pub fn clamp_lines(mut lines: Vec<String>, max: usize) -> Vec<String> {
    if lines.len() > max {
        lines.truncate(max.max(1));
        if let Some(last) = lines.last_mut() {
            last.push_str("...");
        }
    }
    lines
}

/// Shortens a single line to fit `max_width`, ending it with `...`.
pub fn truncate_to_width(text: &str, size: f64, weight: FontWeight, max_width: f64) -> String {
    if text_width(text, size, weight) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if text_width(&format!("{out}..."), size, weight) > max_width {
            out.pop();
            break;
        }
    }
    format!("{}...", out.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(8);
        let lines = wrap(&text, 9.0, FontWeight::Normal, 60.0);
        assert!(lines.len() > 1);
        for l in &lines {
            assert!(text_width(l, 9.0, FontWeight::Normal) <= 60.0, "{l}");
        }
    }

    #[test]
    fn wrap_breaks_long_words() {
        let lines = wrap(&"x".repeat(200), 8.0, FontWeight::Normal, 30.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat().len(), 200);
    }

    #[test]
    fn wrap_keeps_explicit_newlines() {
        let lines = wrap("one\ntwo", 9.0, FontWeight::Normal, 100.0);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn empty_text_wraps_to_nothing() {
        assert!(wrap("   ", 9.0, FontWeight::Normal, 100.0).is_empty());
    }

    #[test]
    fn thresholds_sit_above_content_bottom() {
        let blocks = [
            Block::Metrics,
            Block::FlagCard,
            Block::IssueCard,
            Block::PricingRow,
            Block::TextItem,
            Block::LockRow,
            Block::AuditCard,
        ];
        for b in blocks {
            let t = b.rule().break_threshold.unwrap();
            assert!(t < CONTENT_BOTTOM);
        }
    }
}
