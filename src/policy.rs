//! Severity and status coloring shared by every surface that shows a report.

use crate::report::AlertLevel;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(v: u32) -> Self {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    pub const WHITE: Rgb = Rgb::hex(0xffffff);
    pub const BLACK: Rgb = Rgb::hex(0x000000);
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: Rgb,
    pub border: Rgb,
    pub text: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Good,
    Neutral,
}

impl Severity {
    /// Case-insensitive; unknown or empty tags are `Neutral`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "red" | "critical" | "blocked" | "high" => Severity::Critical,
            "yellow" | "warning" | "medium" | "locked" => Severity::Warning,
            "green" | "good" | "approved" => Severity::Good,
            _ => Severity::Neutral,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Severity::Critical => Palette {
                background: Rgb::hex(0xfee2e2),
                border: Rgb::hex(0xef4444),
                text: Rgb::hex(0x991b1b),
            },
            Severity::Warning => Palette {
                background: Rgb::hex(0xfef3c7),
                border: Rgb::hex(0xf59e0b),
                text: Rgb::hex(0x92400e),
            },
            Severity::Good => Palette {
                background: Rgb::hex(0xd1fae5),
                border: Rgb::hex(0x10b981),
                text: Rgb::hex(0x065f46),
            },
            Severity::Neutral => Palette {
                background: Rgb::hex(0xf3f4f6),
                border: Rgb::hex(0x6b7280),
                text: Rgb::hex(0x374151),
            },
        }
    }
}

impl From<AlertLevel> for Severity {
    fn from(level: AlertLevel) -> Self {
        level.as_str().map(Severity::from_tag).unwrap_or(Severity::Neutral)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    PassRate,
    BlockRate,
    HallucinationRate,
    Sentiment,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::PassRate,
        Metric::BlockRate,
        Metric::HallucinationRate,
        Metric::Sentiment,
    ];

    /// Hallucinations have no warning band: any positive rate is critical.
    pub fn assess(self, value: f64) -> Severity {
        match self {
            Metric::PassRate if value >= 80.0 => Severity::Good,
            Metric::PassRate => Severity::Warning,
            Metric::BlockRate if value <= 10.0 => Severity::Good,
            Metric::BlockRate => Severity::Warning,
            Metric::HallucinationRate if value == 0.0 => Severity::Good,
            Metric::HallucinationRate => Severity::Critical,
            Metric::Sentiment if value >= 0.0 => Severity::Good,
            Metric::Sentiment => Severity::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::PassRate => "Pass Rate",
            Metric::BlockRate => "Block Rate",
            Metric::HallucinationRate => "Hallucinations",
            Metric::Sentiment => "Sentiment",
        }
    }

    pub fn target(self) -> &'static str {
        match self {
            Metric::PassRate => ">= 80%",
            Metric::BlockRate => "<= 10%",
            Metric::HallucinationRate => "0%",
            Metric::Sentiment => ">= 0.0",
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            Metric::Sentiment => format!("{value:.2}"),
            _ => format!("{value:.1}%"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Approved,
    Blocked,
    Locked,
    Adjusted,
    Other,
}

impl ActionStatus {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "APPROVED" => ActionStatus::Approved,
            "BLOCKED" => ActionStatus::Blocked,
            "LOCKED" => ActionStatus::Locked,
            "ADJUSTED" => ActionStatus::Adjusted,
            _ => ActionStatus::Other,
        }
    }

    /// Badge (fill, text) colors; separate from the severity table.
    pub fn badge(self) -> (Rgb, Rgb) {
        match self {
            ActionStatus::Approved => (Rgb::hex(0xd1fae5), Rgb::hex(0x065f46)),
            ActionStatus::Blocked => (Rgb::hex(0xfee2e2), Rgb::hex(0x991b1b)),
            ActionStatus::Locked => (Rgb::hex(0xfef3c7), Rgb::hex(0x92400e)),
            ActionStatus::Adjusted => (Rgb::hex(0xdbeafe), Rgb::hex(0x1e40af)),
            ActionStatus::Other => (Rgb::hex(0xe5e7eb), Rgb::hex(0x374151)),
        }
    }
}
