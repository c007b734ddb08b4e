pub mod http;
pub mod types;

use crate::error::StreamError;
use crate::ingest::IngestEngine;
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

pub use types::{RunInput, RunRequest};

/// Anything that can start a run and hand back its response body.
pub trait Transport {
    fn open(&self, req: &RunRequest) -> Result<Box<dyn Read + Send>, StreamError>;
}

/// Stops ingestion between reads, either on request or once a deadline passes.
/// A read already in progress is bounded by the transport's own read timeout,
/// which [`http::HttpTransport`] caps at the stream deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero timeout means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: (!timeout.is_zero()).then(|| Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn check(&self) -> Result<(), StreamError> {
        if self.flag.load(Ordering::SeqCst) {
            return Err(StreamError::StreamCancelled("cancelled by caller".into()));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(StreamError::StreamCancelled("stream deadline exceeded".into()));
            }
        }
        Ok(())
    }
}

/// Reads the body one chunk at a time and feeds each chunk in order.
pub fn pump<R: Read + ?Sized>(
    reader: &mut R,
    engine: &mut IngestEngine,
    cancel: &CancelToken,
    chunk_bytes: usize,
) -> Result<(), StreamError> {
    let mut buf = vec![0u8; chunk_bytes.max(1)];
    loop {
        cancel.check()?;
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::StreamTransportError(e.to_string())),
        };
        engine.feed_bytes(&buf[..n]);
    }
    debug!(bytes = engine.stats().bytes, "end of stream");
    Ok(())
}
