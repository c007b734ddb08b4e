use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    format!("{:x}", h.finalize())
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// `YYYY-MM-DD`, used to stamp output filenames.
pub fn date_stamp(at: OffsetDateTime) -> String {
    at.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "1970-01-01".to_string())
}

/// Formats `at` with a `time` format description such as
/// `[year]-[month]-[day] [hour]:[minute]`.
pub fn format_timestamp(at: OffsetDateTime, description: &str) -> Result<String> {
    let items = time::format_description::parse_borrowed::<2>(description)
        .with_context(|| format!("invalid timestamp format: {description}"))?;
    at.format(&items)
        .with_context(|| format!("formatting timestamp with: {description}"))
}
