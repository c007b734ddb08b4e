use ops_report::complete::complete;
use ops_report::ingest::{EventKind, IngestEngine, IngestOptions, Outcome};
use ops_report::transport::{CancelToken, pump};
use proptest::prelude::*;
use serde_json::json;

const STREAM: &str = concat!(
    "event: metadata\n",
    "data: {\"run_id\":\"r-1\"}\n",
    "\n",
    "event: values\n",
    "data: {\"step\":\"catalog\",\"note\":\"caf\u{e9} \u{2014} d\u{e9}j\u{e0} vu \u{1f680}\"}\n",
    "\n",
    "event: values\n",
    "data: {\"step\":\"pricing\",\n",
    "\n",
    "event: heartbeat\n",
    "data: {}\n",
    "\n",
    "event: values\n",
    "data: {\"final_report\":{\"status\":\"OK\",\"alert_level\":\"GREEN\"}}\n",
    "\n",
    "event: end\n",
    "data: null\n",
    "\n",
);

fn feed_all(chunks: &[&[u8]]) -> IngestEngine {
    let mut engine = IngestEngine::default();
    for c in chunks {
        engine.feed_bytes(c);
    }
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Chunk boundaries, even inside multi-byte characters, never change the result.
    #[test]
    fn chunk_boundaries_do_not_matter(mut cuts in prop::collection::vec(0usize..STREAM.len(), 0..16)) {
        let bytes = STREAM.as_bytes();
        cuts.sort_unstable();
        cuts.dedup();

        let mut chunks = Vec::new();
        let mut start = 0;
        for cut in cuts {
            chunks.push(&bytes[start..cut]);
            start = cut;
        }
        chunks.push(&bytes[start..]);

        let whole = feed_all(&[bytes]).finish();
        let split = feed_all(&chunks).finish();
        prop_assert_eq!(&split.history, &whole.history);
        prop_assert_eq!(&split.latest_state, &whole.latest_state);
        prop_assert_eq!(split.stats.messages, whole.stats.messages);
    }
}

#[test]
fn whole_stream_dispatches_in_order() {
    let done = feed_all(&[STREAM.as_bytes()]).finish();
    let kinds: Vec<(EventKind, Outcome)> = done
        .history
        .iter()
        .map(|d| (d.event.clone(), d.outcome))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (EventKind::Metadata, Outcome::Ignored),
            (EventKind::Values, Outcome::Replaced),
            (EventKind::Values, Outcome::Dropped),
            (EventKind::Other("heartbeat".into()), Outcome::Ignored),
            (EventKind::Values, Outcome::Replaced),
            (EventKind::End, Outcome::Ignored),
        ]
    );
    assert_eq!(done.stats.dropped, 1);
    assert_eq!(done.stats.state_updates, 2);
    assert!(!done.stats.discarded_tail);
}

#[test]
fn latest_values_payload_replaces_without_merging() {
    let mut engine = IngestEngine::default();
    engine.feed("event: values\ndata: {\"a\":1,\"b\":2}\n\n");
    engine.feed("event: values\ndata: {\"b\":3}\n\n");
    let done = engine.finish();
    let latest = done.latest_state.unwrap();
    assert_eq!(serde_json::Value::Object(latest), json!({"b": 3}));
}

#[test]
fn malformed_payload_does_not_disturb_later_messages() {
    let mut engine = IngestEngine::default();
    engine.feed("event: values\ndata: {\"first\":true}\n\n");
    engine.feed("event: values\ndata: {not json\n\n");
    assert!(engine.latest_state().unwrap().contains_key("first"));
    engine.feed("event: values\ndata: {\"third\":true}\n\n");
    let done = engine.finish();
    assert!(done.latest_state.unwrap().contains_key("third"));
    assert_eq!(done.stats.dropped, 1);
}

#[test]
fn report_split_mid_payload_completes() {
    let mut engine = IngestEngine::default();
    engine.feed("event: values\ndata: {\"final_r");
    engine.feed("eport\":{\"status\":\"OK\"}}\n\n");
    let report = complete(&engine.finish()).unwrap().report;
    assert_eq!(report.status, "OK");
}

#[test]
fn long_single_line_payload_across_many_chunks() {
    let warnings: Vec<String> = (0..5000).map(|i| format!("warning number {i}")).collect();
    let payload = json!({"final_report": {"status": "OK", "warnings": warnings}});
    let stream = format!("event: values\ndata: {payload}\n\nevent: end\ndata: {{}}\n\n");

    let mut engine = IngestEngine::default();
    for chunk in stream.as_bytes().chunks(64) {
        engine.feed_bytes(chunk);
    }
    let done = engine.finish();
    assert_eq!(done.stats.messages, 2);
    assert!(!done.stats.discarded_tail);
    let report = complete(&done).unwrap().report;
    assert_eq!(report.warnings.len(), 5000);
    assert_eq!(report.warnings[4999], "warning number 4999");
}

#[test]
fn crlf_line_endings_are_accepted() {
    let mut engine = IngestEngine::default();
    engine.feed("event: values\r\ndata: {\"final_report\":{\"status\":\"OK\"}}\r\n\r\n");
    let report = complete(&engine.finish()).unwrap().report;
    assert_eq!(report.status, "OK");
}

const UNTERMINATED: &str = "event: values\ndata: {\"final_report\":{\"status\":\"LATE\"}}";

#[test]
fn unterminated_tail_is_discarded_by_default() {
    let mut engine = IngestEngine::default();
    engine.feed(UNTERMINATED);
    let done = engine.finish();
    assert!(done.latest_state.is_none());
    assert!(done.stats.discarded_tail);
}

#[test]
fn unterminated_tail_can_be_flushed() {
    let mut engine = IngestEngine::new(IngestOptions {
        flush_unterminated_tail: true,
    });
    engine.feed(UNTERMINATED);
    let done = engine.finish();
    assert!(!done.stats.discarded_tail);
    assert_eq!(complete(&done).unwrap().report.status, "LATE");
}

#[test]
fn pump_reads_small_chunks_in_order() {
    let mut body = STREAM.as_bytes();
    let mut engine = IngestEngine::default();
    pump(&mut body, &mut engine, &CancelToken::new(), 3).unwrap();
    let pumped = engine.finish();
    let whole = feed_all(&[STREAM.as_bytes()]).finish();
    assert_eq!(pumped.history, whole.history);
    assert_eq!(pumped.latest_state, whole.latest_state);
    assert!(pumped.stats.chunks > 1);
}
