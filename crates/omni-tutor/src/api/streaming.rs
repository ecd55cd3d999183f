//! Server-Sent Events (SSE) decoding for the streaming chat completions API.
//!
//! [`SseDecoder`] is fed raw body chunks as they come off the wire and
//! yields [`StreamEvent`] values. Lines are split on bytes before UTF-8
//! decoding, so a multi-byte character cut across two chunks survives.
//!
//! The stream is complete on `data: [DONE]`. A connection that closes after
//! a `finish_reason` was reported also counts as complete; one that closes
//! earlier is a malformed response.

use serde::Deserialize;
use tracing::{debug, trace};

use crate::UsageInfo;
use crate::error::RemoteError;

/// A single decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental text content delta.
    TextDelta(String),
    /// Token usage information (sent in the final chunk).
    Usage(UsageInfo),
    /// The stream is complete.
    Done,
}

/// Raw SSE data chunk.
#[derive(Deserialize, Debug)]
struct StreamChunk {
    choices: Option<Vec<StreamChoice>>,
    usage: Option<UsageInfo>,
    error: Option<StreamError>,
}

#[derive(Deserialize, Debug)]
struct StreamChoice {
    delta: Option<StreamDelta>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct StreamError {
    message: String,
}

/// Events decoded from one body chunk.
///
/// `error` is set when decoding stopped on a bad line; `events` still holds
/// everything decoded from the lines before it.
#[derive(Debug, Default)]
pub struct Decoded {
    pub events: Vec<StreamEvent>,
    pub error: Option<RemoteError>,
}

/// Incremental SSE decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    finish_reason: Option<String>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk and return the events completed by it.
    ///
    /// Input after `Done` or after an error is ignored.
    pub fn push(&mut self, bytes: &[u8]) -> Decoded {
        let mut out = Decoded::default();
        if self.done {
            return out;
        }
        self.buffer.extend_from_slice(bytes);

        while let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            if let Err(e) = self.process_line(&line, &mut out.events) {
                self.fail(e, &mut out);
                break;
            }
            if self.done {
                self.buffer.clear();
                break;
            }
        }
        out
    }

    /// Signal end of body. Flushes an unterminated final line and checks
    /// that the server actually signalled completion.
    pub fn finish(&mut self) -> Decoded {
        let mut out = Decoded::default();
        if self.done {
            return out;
        }

        let remaining = std::mem::take(&mut self.buffer);
        if let Err(e) = self.process_line(&remaining, &mut out.events) {
            self.fail(e, &mut out);
            return out;
        }

        if !self.done {
            if self.finish_reason.is_none() {
                self.fail(
                    RemoteError::MalformedStream(
                        "stream closed before the model signalled completion".to_string(),
                    ),
                    &mut out,
                );
                return out;
            }
            self.done = true;
            out.events.push(StreamEvent::Done);
        }
        out
    }

    fn fail(&mut self, error: RemoteError, out: &mut Decoded) {
        self.done = true;
        self.buffer.clear();
        out.error = Some(error);
    }

    fn process_line(
        &mut self,
        raw: &[u8],
        events: &mut Vec<StreamEvent>,
    ) -> Result<(), RemoteError> {
        let line = std::str::from_utf8(raw)
            .map_err(|e| RemoteError::MalformedStream(format!("invalid UTF-8 in stream: {e}")))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(':') {
            return Ok(());
        }
        let Some(data) = line.strip_prefix("data:") else {
            // Other SSE fields (event:, id:, retry:) carry nothing we use.
            trace!("Skipping SSE line: {line}");
            return Ok(());
        };
        let data = data.trim_start();
        if data == "[DONE]" {
            debug!("Stream signalled [DONE]");
            self.done = true;
            events.push(StreamEvent::Done);
            return Ok(());
        }
        self.parse_data(data, events)
    }

    /// Parse a single SSE `data:` payload into stream events.
    fn parse_data(&mut self, data: &str, events: &mut Vec<StreamEvent>) -> Result<(), RemoteError> {
        let chunk: StreamChunk = serde_json::from_str(data)
            .map_err(|e| RemoteError::MalformedStream(format!("{e}: {data}")))?;

        if let Some(err) = chunk.error {
            return Err(RemoteError::Api(err.message));
        }

        if let Some(choices) = chunk.choices {
            for choice in choices {
                if let Some(content) = choice.delta.and_then(|d| d.content)
                    && !content.is_empty()
                {
                    events.push(StreamEvent::TextDelta(content));
                }
                if let Some(reason) = choice.finish_reason {
                    trace!("Stream finish_reason: {reason}");
                    self.finish_reason = Some(reason);
                }
            }
        }

        if let Some(usage) = chunk.usage {
            events.push(StreamEvent::Usage(usage));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": content}, "finish_reason": null}]})
        )
    }

    /// Events of a chunk that must decode cleanly.
    fn events(decoded: Decoded) -> Vec<StreamEvent> {
        assert!(decoded.error.is_none(), "unexpected error: {:?}", decoded.error);
        decoded.events
    }

    #[test]
    fn decodes_deltas_until_done() {
        let mut decoder = SseDecoder::new();
        let body = format!("{}{}data: [DONE]\n\n", chunk("Hello "), chunk("world!"));
        assert_eq!(
            events(decoder.push(body.as_bytes())),
            vec![
                StreamEvent::TextDelta("Hello ".into()),
                StreamEvent::TextDelta("world!".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[test]
    fn lines_split_across_chunks_are_joined() {
        let mut decoder = SseDecoder::new();
        let body = chunk("2 + 2 = 4");
        let (a, b) = body.as_bytes().split_at(17);
        assert!(events(decoder.push(a)).is_empty());
        assert_eq!(
            events(decoder.push(b)),
            vec![StreamEvent::TextDelta("2 + 2 = 4".into())]
        );
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let body = chunk("π ≈ 3.14");
        let bytes = body.as_bytes();
        let cut = body.find('π').unwrap() + 1;
        events(decoder.push(&bytes[..cut]));
        assert_eq!(
            events(decoder.push(&bytes[cut..])),
            vec![StreamEvent::TextDelta("π ≈ 3.14".into())]
        );
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let mut decoder = SseDecoder::new();
        let decoded = decoder.push(b": keep-alive\n\nevent: message\ndata: [DONE]\n");
        assert_eq!(events(decoded), vec![StreamEvent::Done]);
    }

    #[test]
    fn usage_chunk_is_reported() {
        let mut decoder = SseDecoder::new();
        let body = "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":12,\"completion_tokens\":3,\"total_tokens\":15}}\n";
        assert_eq!(
            events(decoder.push(body.as_bytes())),
            vec![StreamEvent::Usage(UsageInfo {
                prompt_tokens: Some(12),
                completion_tokens: Some(3),
                total_tokens: Some(15),
            })]
        );
    }

    #[test]
    fn unparseable_chunk_is_malformed() {
        let mut decoder = SseDecoder::new();
        let decoded = decoder.push(b"data: {not json}\n");
        assert!(decoded.events.is_empty());
        assert!(matches!(decoded.error, Some(RemoteError::MalformedStream(_))));
    }

    #[test]
    fn deltas_before_a_bad_line_in_the_same_chunk_are_kept() {
        let mut decoder = SseDecoder::new();
        let body = format!("{}data: {{not json\n\n{}", chunk("partial"), chunk("after"));
        let decoded = decoder.push(body.as_bytes());
        assert_eq!(decoded.events, vec![StreamEvent::TextDelta("partial".into())]);
        assert!(matches!(decoded.error, Some(RemoteError::MalformedStream(_))));

        // Decoding stops at the first error.
        assert!(events(decoder.push(chunk("late").as_bytes())).is_empty());
        assert!(events(decoder.finish()).is_empty());
    }

    #[test]
    fn error_object_is_api_error() {
        let mut decoder = SseDecoder::new();
        let body = format!(
            "{}data: {{\"error\":{{\"message\":\"Insufficient Balance\"}}}}\n",
            chunk("so far")
        );
        let decoded = decoder.push(body.as_bytes());
        assert_eq!(decoded.events, vec![StreamEvent::TextDelta("so far".into())]);
        match decoded.error {
            Some(RemoteError::Api(message)) => assert_eq!(message, "Insufficient Balance"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn close_after_finish_reason_completes() {
        let mut decoder = SseDecoder::new();
        let decoded = decoder
            .push(b"data: {\"choices\":[{\"delta\":{\"content\":\"4\"},\"finish_reason\":\"stop\"}]}");
        assert!(events(decoded).is_empty());
        assert_eq!(
            events(decoder.finish()),
            vec![StreamEvent::TextDelta("4".into()), StreamEvent::Done]
        );
    }

    #[test]
    fn close_without_completion_is_malformed() {
        let mut decoder = SseDecoder::new();
        events(decoder.push(chunk("partial").as_bytes()));
        let decoded = decoder.finish();
        assert!(decoded.events.is_empty());
        assert!(matches!(decoded.error, Some(RemoteError::MalformedStream(_))));
    }

    #[test]
    fn input_after_done_is_ignored() {
        let mut decoder = SseDecoder::new();
        events(decoder.push(b"data: [DONE]\n"));
        assert!(events(decoder.push(chunk("late").as_bytes())).is_empty());
        assert!(events(decoder.finish()).is_empty());
    }
}
