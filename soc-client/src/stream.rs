//! Newline-delimited JSON events over a chunked response body.
//!
//! Each line may carry an SSE-style `data:` prefix. The body ends the
//! sequence; there is no terminator event.

use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;

const DATA_PREFIX: &str = "data:";

/// Accumulates raw bytes and hands back complete lines. Lines are decoded
/// only once complete so a character split across chunks survives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// Prefix of `pending` already known to hold no newline.
    scanned: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.pending[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset;
            lines.push(String::from_utf8_lossy(&self.pending[start..end]).into_owned());
            start = end + 1;
            from = start;
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();
        lines
    }

    /// Remainder after the body closed, if it holds anything but whitespace.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        self.scanned = 0;
        let text = String::from_utf8_lossy(&rest).into_owned();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Parses one line. Blank lines are skipped silently, bad JSON with a warning.
pub fn parse_event_line(line: &str) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line).trim_start();

    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::warn!(line = %payload, error = %err, "dropping unparseable stream line");
            None
        }
    }
}

enum Phase {
    Reading,
    Draining,
    Done,
}

struct Reader<S> {
    body: Pin<Box<S>>,
    lines: LineBuffer,
    ready: VecDeque<Value>,
    phase: Phase,
}

impl<S> Reader<S> {
    fn accept(&mut self, line: &str) {
        if let Some(event) = parse_event_line(line) {
            self.ready.push_back(event);
        }
    }
}

/// Lazy sequence of parsed events. A body error is yielded once and ends
/// the sequence.
pub fn event_stream<S, B, E>(body: S) -> impl Stream<Item = Result<Value, E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    let reader = Reader {
        body: Box::pin(body),
        lines: LineBuffer::new(),
        ready: VecDeque::new(),
        phase: Phase::Reading,
    };

    stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(event) = reader.ready.pop_front() {
                return Some((Ok(event), reader));
            }
            match reader.phase {
                Phase::Reading => match reader.body.next().await {
                    Some(Ok(chunk)) => {
                        for line in reader.lines.push(chunk.as_ref()) {
                            reader.accept(&line);
                        }
                    }
                    Some(Err(err)) => {
                        reader.phase = Phase::Done;
                        return Some((Err(err), reader));
                    }
                    None => reader.phase = Phase::Draining,
                },
                Phase::Draining => {
                    if let Some(line) = reader.lines.finish() {
                        reader.accept(&line);
                    }
                    reader.phase = Phase::Done;
                }
                Phase::Done => return None,
            }
        }
    })
}

/// Callback form: hands every event to `on_event` and returns the last one.
pub async fn read_event_stream<S, B, E, F>(body: S, mut on_event: F) -> Result<Option<Value>, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    F: FnMut(&Value),
{
    let mut events = std::pin::pin!(event_stream(body));
    let mut last = None;
    while let Some(event) = events.next().await {
        let event = event?;
        on_event(&event);
        last = Some(event);
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;
    use std::convert::Infallible;

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = Result<Vec<u8>, Infallible>> {
        stream::iter(
            parts
                .iter()
                .map(|part| Ok(part.to_vec()))
                .collect::<Vec<_>>(),
        )
    }

    fn read_all(parts: &[&[u8]]) -> (Vec<Value>, Option<Value>) {
        let mut seen = Vec::new();
        let last = block_on(read_event_stream(chunks(parts), |event| {
            seen.push(event.clone())
        }))
        .expect("infallible");
        (seen, last)
    }

    #[test]
    fn data_prefix_with_trailing_newline() {
        let (seen, last) = read_all(&[b"data: {\"a\":1}\n{\"b\":2}\n"]);
        assert_eq!(seen, vec![json!({"a": 1}), json!({"b": 2})]);
        assert_eq!(last, Some(json!({"b": 2})));
    }

    #[test]
    fn final_line_without_newline_is_drained() {
        let (seen, last) = read_all(&[b"data: {\"a\":1}\n{\"b\":2}"]);
        assert_eq!(seen, vec![json!({"a": 1}), json!({"b": 2})]);
        assert_eq!(last, Some(json!({"b": 2})));
    }

    #[test]
    fn malformed_line_is_skipped() {
        let (seen, last) = read_all(&[b"not-json\n", b"{\"ok\":true}\n"]);
        assert_eq!(seen, vec![json!({"ok": true})]);
        assert_eq!(last, Some(json!({"ok": true})));
    }

    #[test]
    fn lines_split_across_chunks() {
        let (seen, _) = read_all(&[
            b"data: {\"ev",
            b"ent\":\"message\"}\r\n\n",
            b"da",
            b"ta:{\"n\":2}\n",
        ]);
        assert_eq!(seen, vec![json!({"event": "message"}), json!({"n": 2})]);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let text = "{\"answer\":\"告警\"}\n".as_bytes();
        let (head, tail) = text.split_at(13);
        let (seen, _) = read_all(&[head, tail]);
        assert_eq!(seen, vec![json!({"answer": "告警"})]);
    }

    #[test]
    fn empty_body_yields_nothing() {
        let (seen, last) = read_all(&[]);
        assert!(seen.is_empty());
        assert_eq!(last, None);

        let (seen, last) = read_all(&[b"\n\n   \n"]);
        assert!(seen.is_empty());
        assert_eq!(last, None);
    }

    #[test]
    fn body_error_ends_the_sequence() {
        let body = stream::iter(vec![
            Ok(b"{\"a\":1}\n".to_vec()),
            Err("connection reset"),
            Ok(b"{\"b\":2}\n".to_vec()),
        ]);
        let events: Vec<_> = block_on(event_stream(body).collect());
        assert_eq!(events, vec![Ok(json!({"a": 1})), Err("connection reset")]);
    }

    #[test]
    fn callback_form_propagates_body_error() {
        let body = stream::iter(vec![Ok(b"{\"a\":1}\n".to_vec()), Err("boom")]);
        let mut count = 0;
        let result = block_on(read_event_stream(body, |_| count += 1));
        assert_eq!(result, Err("boom"));
        assert_eq!(count, 1);
    }

    #[test]
    fn line_buffer_keeps_partial_line() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.push(b"one\ntw"), vec!["one".to_string()]);
        assert_eq!(buffer.push(b"o\n"), vec!["two".to_string()]);
        assert_eq!(buffer.push(b"  "), Vec::<String>::new());
        assert_eq!(buffer.finish(), None);
        buffer.push(b"tail");
        assert_eq!(buffer.finish().as_deref(), Some("tail"));
    }

    #[test]
    fn long_line_in_small_chunks_is_scanned_once() {
        let line = format!("{{\"answer\":\"{}\"}}", "x".repeat(200_000));
        let mut buffer = LineBuffer::new();
        for piece in line.as_bytes().chunks(16) {
            assert!(buffer.push(piece).is_empty());
            assert_eq!(buffer.scanned, buffer.pending.len());
        }
        let lines = buffer.push(b"\n{\"next\":1}\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], line);
        assert_eq!(lines[1], "{\"next\":1}");
        assert_eq!(buffer.scanned, 0);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn many_lines_in_one_chunk() {
        let body: String = (0..500).map(|n| format!("{{\"n\":{n}}}\n")).collect();
        let (seen, last) = read_all(&[body.as_bytes()]);
        assert_eq!(seen.len(), 500);
        assert_eq!(last, Some(json!({"n": 499})));
    }

    #[test]
    fn parse_event_line_strips_one_prefix() {
        assert_eq!(parse_event_line("  data:{\"x\":1}  "), Some(json!({"x": 1})));
        assert_eq!(parse_event_line("data: data: 1"), None);
        assert_eq!(parse_event_line(""), None);
        assert_eq!(parse_event_line("42"), Some(json!(42)));
    }
}
