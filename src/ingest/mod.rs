//! Reconstructs line-delimited protocol messages from arbitrarily split
//! chunks and folds them into the last known workflow state.

pub mod decode;
pub mod parser;

pub use decode::Utf8ChunkDecoder;
pub use parser::{Dispatch, EventKind, Outcome, ParserState, WorkflowState};

use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Force-flush a trailing message that never got its blank line.
    pub flush_unterminated_tail: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub chunks: u64,
    pub bytes: u64,
    pub lines: u64,
    pub messages: u64,
    pub state_updates: u64,
    pub dropped: u64,
    pub discarded_tail: bool,
}

/// What the stream left behind once it ended.
#[derive(Debug, Clone, Default)]
pub struct FinalState {
    pub latest_state: Option<WorkflowState>,
    pub stats: IngestStats,
    pub history: Vec<Dispatch>,
}

/// Feed chunks in arrival order, then call [`IngestEngine::finish`].
#[derive(Debug, Default)]
pub struct IngestEngine {
    opts: IngestOptions,
    state: ParserState,
    decoder: Utf8ChunkDecoder,
    stats: IngestStats,
    history: Vec<Dispatch>,
}

impl IngestEngine {
    pub fn new(opts: IngestOptions) -> Self {
        Self {
            opts,
            ..Default::default()
        }
    }

    pub fn feed_bytes(&mut self, bytes: &[u8]) {
        self.stats.bytes += bytes.len() as u64;
        let text = self.decoder.decode(bytes);
        self.feed_text(&text);
    }

    /// Appends a decoded chunk and processes every line it completes.
    pub fn feed(&mut self, chunk: &str) {
        self.stats.bytes += chunk.len() as u64;
        self.feed_text(chunk);
    }

    fn feed_text(&mut self, chunk: &str) {
        self.stats.chunks += 1;
        // The buffer never holds a newline between calls, so only the new
        // chunk needs scanning.
        let Some(cut) = chunk.rfind('\n') else {
            self.state.text_buffer.push_str(chunk);
            return;
        };
        let mut state = std::mem::take(&mut self.state);
        let cut = state.text_buffer.len() + cut;
        state.text_buffer.push_str(chunk);
        let tail = state.text_buffer.split_off(cut + 1);
        let complete = std::mem::replace(&mut state.text_buffer, tail);

        let state = self.fold_lines(state, complete[..cut].split('\n'));
        self.state = state;
    }

    fn fold_lines<'a>(
        &mut self,
        state: ParserState,
        lines: impl Iterator<Item = &'a str>,
    ) -> ParserState {
        lines.fold(state, |st, line| {
            self.stats.lines += 1;
            let (st, dispatch) = st.step(line);
            if let Some(d) = dispatch {
                self.record(d);
            }
            st
        })
    }

    fn record(&mut self, d: Dispatch) {
        self.stats.messages += 1;
        match d.outcome {
            Outcome::Replaced => self.stats.state_updates += 1,
            Outcome::Dropped => self.stats.dropped += 1,
            Outcome::Ignored => {}
        }
        self.history.push(d);
    }

    pub fn latest_state(&self) -> Option<&WorkflowState> {
        self.state.latest_state.as_ref()
    }

    pub fn history(&self) -> &[Dispatch] {
        &self.history
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn finish(mut self) -> FinalState {
        if let Some(ch) = self.decoder.finish() {
            self.state.text_buffer.push(ch);
        }

        let mut state = std::mem::take(&mut self.state);
        let has_tail = !state.text_buffer.is_empty() || state.has_pending_message();
        if has_tail && self.opts.flush_unterminated_tail {
            debug!("flushing unterminated trailing message");
            let tail = std::mem::take(&mut state.text_buffer);
            let lines = [tail.as_str(), ""];
            state = self.fold_lines(state, lines.into_iter());
        } else if has_tail {
            warn!(
                pending_event = state.pending_event.as_str(),
                buffered_bytes = state.text_buffer.len(),
                "stream ended mid-message; discarding unterminated tail"
            );
            self.stats.discarded_tail = true;
        }

        info!(
            chunks = self.stats.chunks,
            messages = self.stats.messages,
            updates = self.stats.state_updates,
            dropped = self.stats.dropped,
            "ingestion finished"
        );

        FinalState {
            latest_state: state.latest_state,
            stats: self.stats,
            history: self.history,
        }
    }
}
