use crate::{
    complete,
    config::Config,
    pipeline::{Completed, Pipeline, ingest_stream, write_outputs},
    transport::{CancelToken, RunRequest, http::HttpTransport},
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ops-report")]
#[command(about = "Stream an operations workflow run and render its final report")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./ops-report.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a run on the configured endpoint and render its report.
    Run {
        #[arg(long)]
        merchant_id: Option<String>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Replay a captured event stream from a file, or `-` for stdin.
    Ingest {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Render a stored `final_report` JSON object.
    Render {
        #[arg(long)]
        report: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = Config::load(&cfg_path)?;

    let out_override = match &args.cmd {
        Command::Run { out_dir, .. }
        | Command::Ingest { out_dir, .. }
        | Command::Render { out_dir, .. } => out_dir.as_deref(),
    };
    let out_dir = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.out_dir));

    let log_path = resolve_log_path(&cfg, &out_dir);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
    info!(config = %cfg_path.display(), out = %out_dir.display(), "starting");

    if cfg.debug.dump_effective_config {
        ensure_dir(&out_dir)?;
        let raw = toml::to_string(&cfg).unwrap_or_default();
        std::fs::write(out_dir.join("effective-config.toml"), raw)?;
    }

    let started = now_rfc3339();
    let done = match &args.cmd {
        Command::Run { merchant_id, .. } => run(&cfg, merchant_id.as_deref())?,
        Command::Ingest { input, .. } => replay(&cfg, input)?,
        Command::Render { report, .. } => load_report(report)?,
    };

    let artifacts = write_outputs(&cfg, &out_dir, &done, &started, OffsetDateTime::now_utc())?;
    println!("{}", crate::summary::describe(&done.report));
    info!(pages = artifacts.pages, "done");
    Ok(())
}

fn cancel_token(cfg: &Config) -> CancelToken {
    CancelToken::with_timeout(Duration::from_secs(cfg.ingest.stream_timeout_seconds))
}

fn run(cfg: &Config, merchant_id: Option<&str>) -> Result<Completed> {
    let req = RunRequest::from_config(cfg, merchant_id);
    let pipeline = Pipeline::new(cfg, HttpTransport::new(cfg));
    pipeline.run(&req, &cancel_token(cfg))
}

fn replay(cfg: &Config, input: &Path) -> Result<Completed> {
    let mut reader: Box<dyn Read> = if input == Path::new("-") {
        Box::new(std::io::stdin().lock())
    } else {
        let file = std::fs::File::open(input)
            .with_context(|| format!("opening stream capture: {}", input.display()))?;
        Box::new(file)
    };
    let state = ingest_stream(cfg, &mut reader, &cancel_token(cfg))?;
    Ok(complete::complete(&state)?)
}

fn load_report(path: &Path) -> Result<Completed> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading report: {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing report: {}", path.display()))?;
    Ok(Completed::from_stored(value)?)
}

fn resolve_config_path(user: Option<&Path>) -> PathBuf {
    if let Some(p) = user {
        return p.to_path_buf();
    }
    let default = PathBuf::from("ops-report.toml");
    if default.exists() {
        default
    } else {
        PathBuf::from("ops-report.example.toml")
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the summary; logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config, out_dir: &Path) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(out_dir.join("ops-report.log"))
}
