use crate::{
    complete,
    config::Config,
    error::StreamError,
    ingest::{FinalState, IngestEngine, IngestOptions},
    render::{self, Document, RenderOptions},
    summary,
    transport::{CancelToken, RunRequest, Transport, pump},
    util::{date_stamp, ensure_dir, format_timestamp, sha256_hex},
};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

pub use crate::complete::Completed;

/// Live runs: open the stream, ingest it, complete the report.
pub struct Pipeline<T: Transport> {
    cfg: Config,
    transport: T,
}

#[derive(Debug, Default)]
pub struct Artifacts {
    pub document: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub index: Option<PathBuf>,
    pub pages: usize,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(cfg: &Config, transport: T) -> Self {
        Self {
            cfg: cfg.clone(),
            transport,
        }
    }

    pub fn run(&self, req: &RunRequest, cancel: &CancelToken) -> Result<Completed> {
        let started = Instant::now();
        let mut body = self.transport.open(req)?;
        let state = ingest_stream(&self.cfg, &mut body, cancel)?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stream ingested"
        );
        Ok(complete::complete(&state)?)
    }
}

/// Pumps any byte source through a fresh ingestion engine.
pub fn ingest_stream<R: Read + ?Sized>(
    cfg: &Config,
    reader: &mut R,
    cancel: &CancelToken,
) -> Result<FinalState, StreamError> {
    let mut engine = IngestEngine::new(IngestOptions {
        flush_unterminated_tail: cfg.ingest.flush_unterminated_tail,
    });
    pump(reader, &mut engine, cancel, cfg.ingest.read_chunk_bytes)?;
    Ok(engine.finish())
}

/// Renders the report and writes every enabled output under `out_dir`.
pub fn write_outputs(
    cfg: &Config,
    out_dir: &Path,
    done: &Completed,
    started: &str,
    now: OffsetDateTime,
) -> Result<Artifacts> {
    ensure_dir(out_dir)?;

    let generated_at = format_timestamp(now, &cfg.render.timestamp_format)?;
    let pages = render::render(&done.report, &RenderOptions::from_config(cfg, &generated_at));
    let document = Document::new(pages, &generated_at);
    let stem = format!("{}-{}", cfg.output.filename_prefix, date_stamp(now));
    let mut out = Artifacts {
        pages: document.pages.len(),
        ..Default::default()
    };

    if cfg.output.write_document_json {
        let path = out_dir.join(format!("{stem}.document.json"));
        std::fs::write(&path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("writing document: {}", path.display()))?;
        out.document = Some(path);
    }

    if cfg.output.write_report_json {
        let path = out_dir.join(format!("{stem}.report.json"));
        std::fs::write(&path, serde_json::to_string_pretty(&done.raw)?)
            .with_context(|| format!("writing report: {}", path.display()))?;
        out.report = Some(path);
    }

    if cfg.output.write_summary_text {
        let path = out_dir.join(format!("{stem}.summary.txt"));
        std::fs::write(&path, summary::describe(&done.report))
            .with_context(|| format!("writing summary: {}", path.display()))?;
        out.summary = Some(path);
    }

    if cfg.output.write_index_json {
        let file_name = |p: &Option<PathBuf>| {
            p.as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
        };
        let index = serde_json::json!({
            "started": started,
            "finished": now.format(&Rfc3339).unwrap_or_default(),
            "status": done.report.status,
            "alert_level": done.report.alert_level,
            "pages": out.pages,
            "report_sha256": sha256_hex(&serde_json::to_vec(&done.raw)?),
            "config_sha256": sha256_hex(cfg.normalized_for_hash().as_bytes()),
            "ingest": done.stats,
            "files": {
                "document": file_name(&out.document),
                "report": file_name(&out.report),
                "summary": file_name(&out.summary),
            },
        });
        let path = out_dir.join("index.json");
        std::fs::write(&path, serde_json::to_string_pretty(&index)?)
            .with_context(|| format!("writing index: {}", path.display()))?;
        out.index = Some(path);
    }

    debug!(?out, "outputs written");
    Ok(out)
}
