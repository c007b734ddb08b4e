use super::{RunRequest, Transport};
use crate::config::Config;
use crate::error::StreamError;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, info};

/// Blocking HTTP client for the streaming run endpoint.
pub struct HttpTransport {
    agent: ureq::Agent,
    url: String,
}

impl HttpTransport {
    pub fn new(cfg: &Config) -> Self {
        let mut builder = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(cfg.endpoint.connect_timeout_seconds));
        if let Some(timeout) = read_timeout(cfg) {
            builder = builder.timeout_read(timeout);
        }
        Self {
            agent: builder.build(),
            url: cfg.endpoint.url.clone(),
        }
    }
}

/// The smaller of the per-read and whole-stream timeouts, ignoring zeros.
/// A stalled read then cannot outlive the stream deadline.
fn read_timeout(cfg: &Config) -> Option<Duration> {
    [cfg.endpoint.read_timeout_seconds, cfg.ingest.stream_timeout_seconds]
        .into_iter()
        .filter(|s| *s > 0)
        .min()
        .map(Duration::from_secs)
}

impl Transport for HttpTransport {
    fn open(&self, req: &RunRequest) -> Result<Box<dyn Read + Send>, StreamError> {
        info!(
            url = %self.url,
            assistant_id = %req.assistant_id,
            merchant_id = %req.input.merchant_id,
            "starting run"
        );
        let resp = self
            .agent
            .post(&self.url)
            .set("Accept", "text/event-stream")
            .send_json(req)
            .map_err(|err| match err {
                ureq::Error::Status(code, resp) => StreamError::StreamTransportError(format!(
                    "run endpoint returned HTTP {code} {}",
                    resp.status_text()
                )),
                ureq::Error::Transport(t) => StreamError::StreamTransportError(t.to_string()),
            })?;
        debug!(
            status = resp.status(),
            content_type = resp.content_type(),
            "stream opened"
        );
        Ok(Box::new(resp.into_reader()))
    }
}
