//! Streaming conversion (NDJSON -> SSE).
//!
//! Ollama streams `/api/generate` results as newline-delimited JSON, one
//! record per line, with `done: true` on the last one. Codestral clients expect
//! Server-Sent Events:
//!
//! ```text
//! data: {"id":"...","object":"text_completion",...}
//!
//! data: [DONE]
//!
//! ```
//!
//! [`NdjsonReframer`] is a pull-based state machine that turns raw body chunks
//! into ready-to-send frames. [`reframe`] drives it from an async byte stream.

use super::transform::map_stream_record;
use super::types::GenerateResponse;
use crate::provider::{Clock, IdGenerator, ProviderContext};
use async_stream::stream;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DONE_FRAME: &[u8] = b"data: [DONE]\n\n";

/// Result of asking the reframer for its next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A complete SSE frame, ready to write.
    Frame(Bytes),
    /// No complete line is buffered; push more input (or call `finish`).
    NeedMore,
    /// The stream is over. Nothing more will be produced.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Source still open.
    Open,
    /// Source ended; drain the remaining complete lines, then stop.
    Exhausted,
    /// Terminal record seen or source drained.
    Done,
}

/// Incremental NDJSON-to-SSE reframer.
///
/// Input is buffered as raw bytes and only split on `\n`. A newline byte never
/// occurs inside a multi-byte UTF-8 sequence, so a character split across two
/// reads is decoded only once its whole line has arrived.
pub struct NdjsonReframer {
    buf: BytesMut,
    model: String,
    state: State,
    sentinel_pending: bool,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl NdjsonReframer {
    pub fn new(
        model: impl Into<String>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            buf: BytesMut::new(),
            model: model.into(),
            state: State::Open,
            sentinel_pending: false,
            ids,
            clock,
        }
    }

    /// Append one read from the backend body. Ignored once the stream is done.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.state == State::Open {
            self.buf.extend_from_slice(chunk);
        }
    }

    /// Mark the source as exhausted.
    ///
    /// Complete lines already buffered are still emitted. A trailing fragment
    /// with no newline is dropped, and no `[DONE]` sentinel is synthesized.
    pub fn finish(&mut self) {
        if self.state == State::Open {
            self.state = State::Exhausted;
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done && !self.sentinel_pending
    }

    pub fn next_frame(&mut self) -> Step {
        if self.sentinel_pending {
            self.sentinel_pending = false;
            return Step::Frame(Bytes::from_static(DONE_FRAME));
        }

        if self.state == State::Done {
            return Step::Done;
        }

        loop {
            let Some(pos) = self.buf.iter().position(|b| *b == b'\n') else {
                if self.state == State::Exhausted {
                    if !self.buf.is_empty() {
                        debug!(bytes = self.buf.len(), "dropping unterminated trailing line");
                    }
                    self.terminate();
                    return Step::Done;
                }
                return Step::NeedMore;
            };

            let line = self.buf.split_to(pos + 1);
            let line = String::from_utf8_lossy(&line[..pos]);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let record: GenerateResponse = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(e) => {
                    debug!(error = %e, line, "skipping malformed ollama stream line");
                    continue;
                }
            };

            let done = record.done;
            let chunk = map_stream_record(
                record,
                &self.model,
                self.ids.as_ref(),
                self.clock.as_ref(),
            );
            let data = match serde_json::to_string(&chunk) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "failed to encode stream chunk");
                    continue;
                }
            };

            if done {
                self.terminate();
                self.sentinel_pending = true;
            }

            return Step::Frame(sse_data(&data));
        }
    }

    fn terminate(&mut self) {
        self.state = State::Done;
        self.buf.clear();
    }
}

fn sse_data(data: &str) -> Bytes {
    Bytes::from(format!("data: {}\n\n", data))
}

/// Convert an Ollama NDJSON body into Codestral SSE frames.
///
/// Reading stops as soon as the terminal record has been emitted. A read error
/// from the backend ends the stream the same way an early EOF does: headers are
/// already on the wire, so the client just sees the stream close.
pub fn reframe<S, E>(
    body: S,
    model: String,
    ctx: &ProviderContext,
) -> impl Stream<Item = Result<Bytes, Infallible>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut reframer = NdjsonReframer::new(model, ctx.ids.clone(), ctx.clock.clone());

    stream! {
        futures::pin_mut!(body);
        loop {
            match reframer.next_frame() {
                Step::Frame(frame) => yield Ok(frame),
                Step::Done => break,
                Step::NeedMore => match body.next().await {
                    Some(Ok(chunk)) => reframer.push(&chunk),
                    Some(Err(e)) => {
                        warn!(error = %e, "ollama stream interrupted");
                        reframer.finish();
                    }
                    None => reframer.finish(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use crate::providers::codestral::transform::tests::{FixedClock, SeqIds};
    use serde_json::Value;

    fn test_context() -> ProviderContext {
        ProviderContext::new(
            ProxyConfig::for_backend("http://ollama"),
            reqwest::Client::new(),
        )
    }

    fn reframer() -> NdjsonReframer {
        NdjsonReframer::new(
            "codestral:latest",
            Arc::new(SeqIds::default()),
            Arc::new(FixedClock(100)),
        )
    }

    /// Feed `chunks` then drain everything the reframer produces.
    fn run(chunks: &[&[u8]]) -> Vec<String> {
        let mut r = reframer();
        let mut out = Vec::new();
        for chunk in chunks {
            r.push(chunk);
            while let Step::Frame(f) = r.next_frame() {
                out.push(String::from_utf8(f.to_vec()).unwrap());
            }
        }
        r.finish();
        while let Step::Frame(f) = r.next_frame() {
            out.push(String::from_utf8(f.to_vec()).unwrap());
        }
        assert_eq!(r.next_frame(), Step::Done);
        out
    }

    fn payload(frame: &str) -> Value {
        let json = frame
            .strip_prefix("data: ")
            .and_then(|s| s.strip_suffix("\n\n"))
            .unwrap();
        serde_json::from_str(json).unwrap()
    }

    const BODY: &str = concat!(
        r#"{"model":"codestral:latest","response":"result","done":false}"#,
        "\n",
        r#"{"model":"codestral:latest","response":" = a + b ✓ café","done":false}"#,
        "\n",
        r#"{"model":"codestral:latest","response":"","done":true,"done_reason":"stop","eval_count":4}"#,
        "\n",
    );

    #[test]
    fn emits_frames_then_single_sentinel() {
        let frames = run(&[BODY.as_bytes()]);

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[3], "data: [DONE]\n\n");

        let first = payload(&frames[0]);
        assert_eq!(first["id"], "id-0");
        assert_eq!(first["object"], "text_completion");
        assert_eq!(first["model"], "codestral:latest");
        assert_eq!(first["created"], 100);
        assert_eq!(first["choices"][0]["text"], "result");
        assert!(first["choices"][0]["finish_reason"].is_null());

        assert_eq!(payload(&frames[1])["choices"][0]["text"], " = a + b ✓ café");
        assert_eq!(payload(&frames[1])["id"], "id-1");

        let last = payload(&frames[2]);
        assert_eq!(last["choices"][0]["finish_reason"], "stop");
        assert!(last.get("usage").is_none());
    }

    #[test]
    fn output_is_independent_of_chunk_boundaries() {
        let expected = run(&[BODY.as_bytes()]);
        let bytes = BODY.as_bytes();

        // Every single split point, including inside the multi-byte characters.
        for i in 0..=bytes.len() {
            let (a, b) = bytes.split_at(i);
            assert_eq!(run(&[a, b]), expected, "split at byte {}", i);
        }

        // One byte per read.
        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(run(&singles), expected);

        // Irregular reads.
        let irregular: Vec<&[u8]> = bytes.chunks(7).collect();
        assert_eq!(run(&irregular), expected);
    }

    #[test]
    fn malformed_and_blank_lines_are_skipped() {
        let body = concat!(
            r#"{"response":"a","done":false}"#,
            "\n\n   \n",
            "{not json at all\n",
            r#"{"response":"b","done":false}"#,
            "\r\n",
            r#"{"response":"","done":true}"#,
            "\n",
        );

        let frames = run(&[body.as_bytes()]);

        assert_eq!(frames.len(), 4);
        assert_eq!(payload(&frames[0])["choices"][0]["text"], "a");
        assert_eq!(payload(&frames[1])["choices"][0]["text"], "b");
        assert_eq!(payload(&frames[2])["choices"][0]["finish_reason"], "stop");
        assert_eq!(frames[3], "data: [DONE]\n\n");
    }

    #[test]
    fn source_ending_without_done_emits_no_sentinel() {
        let body = concat!(
            r#"{"response":"a","done":false}"#,
            "\n",
            r#"{"response":"b","done":false}"#,
            "\n",
            r#"{"response":"never terminated","done":false}"#,
        );

        let frames = run(&[body.as_bytes()]);

        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f != "data: [DONE]\n\n"));
    }

    #[test]
    fn input_after_done_is_ignored() {
        let mut r = reframer();
        r.push(b"{\"response\":\"x\",\"done\":true}\n{\"response\":\"late\",\"done\":false}\n");

        assert!(matches!(r.next_frame(), Step::Frame(_)));
        assert!(!r.is_done());
        assert_eq!(r.next_frame(), Step::Frame(Bytes::from_static(DONE_FRAME)));
        assert!(r.is_done());

        r.push(b"{\"response\":\"later\",\"done\":false}\n");
        assert_eq!(r.next_frame(), Step::Done);
    }

    #[test]
    fn partial_line_needs_more_input() {
        let mut r = reframer();
        r.push(br#"{"response":"hal"#);
        assert_eq!(r.next_frame(), Step::NeedMore);

        r.push(b"f\",\"done\":false}\n");
        let Step::Frame(frame) = r.next_frame() else {
            panic!("expected a frame");
        };
        let frame = String::from_utf8(frame.to_vec()).unwrap();
        assert_eq!(payload(&frame)["choices"][0]["text"], "half");
        assert_eq!(r.next_frame(), Step::NeedMore);
    }

    #[tokio::test]
    async fn reframe_drives_reframer_from_async_body() {
        let ctx = test_context()
            .with_ids(Arc::new(SeqIds::default()))
            .with_clock(Arc::new(FixedClock(100)));

        let bytes = BODY.as_bytes();
        let chunks: Vec<Result<Bytes, String>> = bytes
            .chunks(5)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let body = futures::stream::iter(chunks);
        let frames: Vec<String> = reframe(body, "codestral:latest".to_string(), &ctx)
            .map(|f| String::from_utf8(f.unwrap().to_vec()).unwrap())
            .collect()
            .await;

        assert_eq!(frames, run(&[bytes]));
    }

    #[tokio::test]
    async fn reframe_stops_reading_after_done() {
        let ctx = test_context();

        let body = futures::stream::iter(vec![
            Ok::<_, String>(Bytes::from_static(b"{\"response\":\"x\",\"done\":true}\n")),
            Err("connection reset".to_string()),
        ]);

        let frames: Vec<_> = reframe(body, "m".to_string(), &ctx).collect().await;
        assert_eq!(frames.len(), 2);
    }

    #[tokio::test]
    async fn reframe_ends_quietly_on_read_error() {
        let ctx = test_context();

        let body = futures::stream::iter(vec![
            Ok::<_, String>(Bytes::from_static(
                b"{\"response\":\"x\",\"done\":false}\n{\"resp",
            )),
            Err("connection reset".to_string()),
            Ok(Bytes::from_static(b"onse\":\"y\",\"done\":true}\n")),
        ]);

        let frames: Vec<_> = reframe(body, "m".to_string(), &ctx).collect().await;
        assert_eq!(frames.len(), 1);
        assert!(frames.iter().all(|f| f.is_ok()));
    }
}
