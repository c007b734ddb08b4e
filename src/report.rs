//! The canonical final report carried by the workflow state.
//!
//! Only `status` is mandatory. Every other field decodes leniently: a missing,
//! `null` or wrong-typed value becomes "absent" rather than an error, and each
//! accessor below documents the single fallback it substitutes.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(default, skip_serializing_if = "AlertLevel::is_unset")]
    pub alert_level: AlertLevel,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub alert_message: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_object", skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(default, deserialize_with = "lenient::opt_object", skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    #[serde(default, deserialize_with = "lenient::seq", skip_serializing_if = "Vec::is_empty")]
    pub catalog_issues: Vec<CatalogIssue>,
    #[serde(default, deserialize_with = "lenient::seq", skip_serializing_if = "Vec::is_empty")]
    pub pricing_actions: Vec<PricingAction>,
    #[serde(default, deserialize_with = "lenient::seq", skip_serializing_if = "Vec::is_empty")]
    pub validation_flags: Vec<ValidationFlag>,
    #[serde(default, deserialize_with = "lenient::opt_object", skip_serializing_if = "Option::is_none")]
    pub support_summary: Option<SupportSummary>,
    #[serde(default, deserialize_with = "lenient::texts", skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "lenient::texts", skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, deserialize_with = "lenient::locks", skip_serializing_if = "IndexMap::is_empty")]
    pub merchant_locks: IndexMap<String, MerchantLock>,
    #[serde(default, deserialize_with = "lenient::seq", skip_serializing_if = "Vec::is_empty")]
    pub audit_log: Vec<AuditEntry>,
    #[serde(default, deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub schema_validation_passed: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub throttle_mode_active: Option<bool>,
    /// Fields this crate does not interpret; kept so nothing upstream is lost.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Report {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn is_frozen(&self) -> bool {
        self.status == "FROZEN"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertLevel {
    Red,
    Yellow,
    Green,
    #[default]
    Unset,
}

impl AlertLevel {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "RED" => AlertLevel::Red,
            "YELLOW" => AlertLevel::Yellow,
            "GREEN" => AlertLevel::Green,
            _ => AlertLevel::Unset,
        }
    }

    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            AlertLevel::Red => Some("RED"),
            AlertLevel::Yellow => Some("YELLOW"),
            AlertLevel::Green => Some("GREEN"),
            AlertLevel::Unset => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, AlertLevel::Unset)
    }
}

impl Serialize for AlertLevel {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(tag) => s.serialize_str(tag),
            None => s.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for AlertLevel {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(v.as_str().map(AlertLevel::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub total_products: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub approved_changes: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub blocked_changes: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub locked_products: Option<i64>,
}

impl Summary {
    /// Labelled counts in display order; absent counts read as 0.
    pub fn cells(&self) -> [(&'static str, i64); 4] {
        [
            ("Total Products", self.total_products.unwrap_or(0)),
            ("Approved", self.approved_changes.unwrap_or(0)),
            ("Blocked", self.blocked_changes.unwrap_or(0)),
            ("Locked", self.locked_products.unwrap_or(0)),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub pricing_pass_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub automated_block_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub hallucination_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogIssue {
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl CatalogIssue {
    /// `message`, else `description`, else empty.
    pub fn text(&self) -> &str {
        non_empty(&self.message)
            .or_else(|| non_empty(&self.description))
            .unwrap_or("")
    }

    pub fn suggestion(&self) -> Option<&str> {
        non_empty(&self.suggestion)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingAction {
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub proposed_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub final_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PricingAction {
    /// `product_name`, else `product_id`, else empty.
    pub fn label(&self) -> &str {
        non_empty(&self.product_name)
            .or_else(|| non_empty(&self.product_id))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationFlag {
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportSummary {
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub total_messages: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub complaint_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient::texts", skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "lenient::seq", skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<Classification>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SupportSummary {
    pub fn is_empty(&self) -> bool {
        self.sentiment.is_none()
            && self.velocity.is_none()
            && self.total_messages.is_none()
            && self.complaint_count.is_none()
            && self.topics.is_empty()
            && self.classifications.is_empty()
            && self.extra.is_empty()
    }

    /// Message count per classification type in first-seen order.
    pub fn breakdown(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for c in &self.classifications {
            let kind = non_empty(&c.kind).unwrap_or("Unknown").to_string();
            *counts.entry(kind).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantLock {
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<String>,
}

impl MerchantLock {
    pub fn reason(&self) -> &str {
        non_empty(&self.reason).unwrap_or("Manual override")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub flags_found: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub alert_level: Option<String>,
}

impl AuditEntry {
    /// `workflow_started` reads as `WORKFLOW STARTED`; absent reads as `ACTION`.
    pub fn headline(&self) -> String {
        non_empty(&self.action)
            .map(|a| a.replace('_', " ").to_uppercase())
            .unwrap_or_else(|| "ACTION".to_string())
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// Deserializers that never fail on shape: anything unexpected reads as absent.
mod lenient {
    use super::MerchantLock;
    use indexmap::IndexMap;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn text_of(v: &Value) -> Option<String> {
        match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(text_of(&Value::deserialize(d)?))
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_text(d)?.unwrap_or_default())
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let n = match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(n.filter(|x| x.is_finite()))
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    }

    pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(Value::deserialize(d)?.as_bool())
    }

    pub fn opt_object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let v = Value::deserialize(d)?;
        if !v.is_object() {
            return Ok(None);
        }
        Ok(serde_json::from_value(v).ok())
    }

    pub fn seq<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }

    pub fn texts<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items.iter().filter_map(text_of).collect())
    }

    pub fn locks<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<IndexMap<String, MerchantLock>, D::Error> {
        let Value::Object(entries) = Value::deserialize(d)? else {
            return Ok(IndexMap::new());
        };
        Ok(entries
            .into_iter()
            .map(|(id, info)| {
                let lock = serde_json::from_value(info).unwrap_or_default();
                (id, lock)
            })
            .collect())
    }
}
