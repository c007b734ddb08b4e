use crate::error::StreamError;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

const PAYLOAD_PREVIEW_CHARS: usize = 200;

/// One snapshot of the remote workflow, as carried by a `values` event.
pub type WorkflowState = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Values,
    End,
    Metadata,
    Other(String),
}

impl EventKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "values" => EventKind::Values,
            "end" => EventKind::End,
            "metadata" => EventKind::Metadata,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Values => "values",
            EventKind::End => "end",
            EventKind::Metadata => "metadata",
            EventKind::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `latest_state` now holds this payload.
    Replaced,
    /// Recognized or unknown event with no effect on state.
    Ignored,
    /// Payload failed to parse; nothing changed.
    Dropped,
}

/// Record of one finalized logical message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub event: EventKind,
    pub outcome: Outcome,
    pub payload_bytes: usize,
}

/// Parser state threaded through [`ParserState::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserState {
    /// Unterminated tail of the last incomplete line.
    pub text_buffer: String,
    pub pending_event: String,
    pub pending_data: String,
    /// Last successfully parsed `values` payload. Never merged, only replaced.
    pub latest_state: Option<WorkflowState>,
}

impl ParserState {
    pub fn has_pending_message(&self) -> bool {
        !self.pending_event.is_empty() || !self.pending_data.is_empty()
    }

    /// Applies one complete line (without its newline).
    ///
    /// `event:` and `data:` lines overwrite their pending field. A blank line
    /// finalizes the message only when both fields are non-empty.
    pub fn step(mut self, line: &str) -> (ParserState, Option<Dispatch>) {
        trace!(line, "protocol line");
        if let Some(rest) = line.strip_prefix("event:") {
            self.pending_event = rest.trim().to_string();
            return (self, None);
        }
        if let Some(rest) = line.strip_prefix("data:") {
            self.pending_data = rest.trim().to_string();
            return (self, None);
        }
        if !line.trim().is_empty() || self.pending_event.is_empty() || self.pending_data.is_empty()
        {
            return (self, None);
        }

        let event = EventKind::parse(&std::mem::take(&mut self.pending_event));
        let data = std::mem::take(&mut self.pending_data);
        let outcome = match apply(&event, &data, &mut self.latest_state) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("{err}; payload preview: {}", preview(&data, PAYLOAD_PREVIEW_CHARS));
                Outcome::Dropped
            }
        };
        let dispatch = Dispatch {
            event,
            outcome,
            payload_bytes: data.len(),
        };
        (self, Some(dispatch))
    }
}

fn apply(
    event: &EventKind,
    data: &str,
    latest: &mut Option<WorkflowState>,
) -> Result<Outcome, StreamError> {
    match event {
        EventKind::Values => {
            let parsed: Value =
                serde_json::from_str(data).map_err(|e| StreamError::MalformedEventPayload {
                    event: event.as_str().to_string(),
                    reason: e.to_string(),
                })?;
            let Value::Object(state) = parsed else {
                return Err(StreamError::MalformedEventPayload {
                    event: event.as_str().to_string(),
                    reason: "payload is not a JSON object".to_string(),
                });
            };
            if let Some(status) = state
                .get("final_report")
                .and_then(|r| r.get("status"))
                .and_then(Value::as_str)
            {
                debug!(status, "values event carries final_report");
            }
            debug!(keys = state.len(), "values event replaced workflow state");
            *latest = Some(state);
            Ok(Outcome::Replaced)
        }
        EventKind::End | EventKind::Metadata => {
            debug!(event = event.as_str(), "informational event");
            Ok(Outcome::Ignored)
        }
        EventKind::Other(tag) => {
            debug!(event = tag.as_str(), "ignoring unrecognized event");
            Ok(Outcome::Ignored)
        }
    }
}

pub(crate) fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lines: &[&str]) -> (ParserState, Vec<Dispatch>) {
        let mut out = Vec::new();
        let state = lines.iter().fold(ParserState::default(), |st, line| {
            let (st, d) = st.step(line);
            out.extend(d);
            st
        });
        (state, out)
    }

    #[test]
    fn blank_line_without_both_fields_is_inert() {
        let (state, out) = run(&["event: values", "", "data: {}"]);
        assert!(out.is_empty());
        assert_eq!(state.pending_event, "values");
        assert_eq!(state.pending_data, "{}");
    }

    #[test]
    fn data_line_overwrites() {
        let (state, out) = run(&["event: values", "data: {\"a\":1}", "data: {\"b\":2}", ""]);
        assert_eq!(out.len(), 1);
        let latest = state.latest_state.unwrap();
        assert!(latest.contains_key("b"));
        assert!(!latest.contains_key("a"));
    }

    #[test]
    fn non_object_values_payload_is_dropped() {
        let (state, out) = run(&["event: values", "data: [1,2]", ""]);
        assert_eq!(out[0].outcome, Outcome::Dropped);
        assert!(state.latest_state.is_none());
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("h\u{e9}llo", 2), "h\u{e9}");
        assert_eq!(preview("hi", 10), "hi");
    }
}
