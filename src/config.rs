use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: Endpoint,
    #[serde(default)]
    pub ingest: Ingest,
    #[serde(default)]
    pub render: Render,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    pub url: String,
    pub assistant_id: String,
    pub stream_mode: String,
    pub merchant_id: String,
    pub connect_timeout_seconds: u64,
    /// Per-read socket timeout; 0 disables it.
    pub read_timeout_seconds: u64,
}
impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000/runs/stream".into(),
            assistant_id: "salla_ops".into(),
            stream_mode: "values".into(),
            merchant_id: "merchant_001".into(),
            connect_timeout_seconds: 10,
            read_timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingest {
    pub read_chunk_bytes: usize,
    pub flush_unterminated_tail: bool,
    pub stream_timeout_seconds: u64,
}
impl Default for Ingest {
    fn default() -> Self {
        Self {
            read_chunk_bytes: 8192,
            flush_unterminated_tail: false,
            stream_timeout_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Render {
    pub title: String,
    pub fold_compatibility: bool,
    /// `time` format description used for the footer timestamp.
    pub timestamp_format: String,
}
impl Default for Render {
    fn default() -> Self {
        Self {
            title: "SALLA OPERATIONS REPORT".into(),
            fold_compatibility: false,
            timestamp_format: "[year]-[month]-[day] [hour]:[minute]:[second] UTC".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub out_dir: String,
    pub filename_prefix: String,
    pub write_document_json: bool,
    pub write_report_json: bool,
    pub write_summary_text: bool,
    pub write_index_json: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            filename_prefix: "salla-operations-report".into(),
            write_document_json: true,
            write_report_json: true,
            write_summary_text: true,
            write_index_json: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Debug {
    pub dump_effective_config: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            dump_effective_config: false,
        }
    }
}
