//! Error types for stream ingestion and report completion.

use thiserror::Error;

/// Failures raised while pulling and parsing the event stream.
#[derive(Error, Debug)]
pub enum StreamError {
    /// A `values` payload was not a JSON object. Absorbed by the engine.
    #[error("malformed `{event}` payload: {reason}")]
    MalformedEventPayload { event: String, reason: String },

    /// The chunk source failed.
    #[error("stream transport failed: {0}")]
    StreamTransportError(String),

    /// Ingestion was stopped before end-of-stream.
    #[error("stream cancelled: {0}")]
    StreamCancelled(String),
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::StreamTransportError(err.to_string())
    }
}

/// Why a finished stream did not yield a usable report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Workflow completed but no state was captured from the stream.")]
    NoStateCaptured,

    #[error("Workflow completed but no report was generated.")]
    NoReportGenerated,

    #[error("Workflow completed but report has no status.")]
    ReportMissingStatus,
}
