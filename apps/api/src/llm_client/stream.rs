//! Streaming: ordered token deltas with caller-driven cancellation.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::{stream, Stream, StreamExt};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::llm_client::AdapterError;

pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, AdapterError>> + Send>>;

/// Drains `tokens` in order, calling `on_token` once per non-empty chunk.
///
/// Cancellation wins over a ready chunk. On cancel or error the partial text is
/// dropped with the stream; nothing accumulated so far escapes.
pub async fn collect_stream<F>(
    mut tokens: TokenStream,
    cancel: &CancellationToken,
    mut on_token: F,
) -> Result<String, AdapterError>
where
    F: FnMut(&str),
{
    let mut text = String::new();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AdapterError::Cancelled),
            next = tokens.next() => match next {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    on_token(&chunk);
                    text.push_str(&chunk);
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(text),
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Server-sent events
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<StreamDelta>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(rename = "type")]
    delta_type: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

enum SseLine {
    Text(String),
    Stop,
    Failed(AdapterError),
    Skip,
}

fn decode_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let Ok(event) = serde_json::from_str::<StreamEvent>(data.trim()) else {
        return SseLine::Skip;
    };
    match event.event_type.as_str() {
        "content_block_delta" => match event.delta {
            Some(StreamDelta {
                delta_type,
                text: Some(text),
            }) if delta_type.as_deref().unwrap_or("text_delta") == "text_delta" => {
                SseLine::Text(text)
            }
            _ => SseLine::Skip,
        },
        "message_stop" => SseLine::Stop,
        "error" => SseLine::Failed(AdapterError::Request {
            status: None,
            message: event
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "stream error".to_string()),
        }),
        _ => SseLine::Skip,
    }
}

struct SseState<S> {
    body: Pin<Box<S>>,
    /// Raw bytes; a chunk boundary may fall inside a multi-byte character.
    buffer: BytesMut,
    pending: VecDeque<Result<String, AdapterError>>,
    finished: bool,
}

/// Turns a raw SSE byte stream into text deltas. Lines may be split across
/// chunks; each complete `data:` line yields at most one delta.
pub fn sse_text_deltas<S, E>(body: S) -> TokenStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = SseState {
        body: Box::pin(body),
        buffer: BytesMut::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(&chunk);
                    drain_lines(&mut state);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state.pending.push_back(Err(AdapterError::Request {
                        status: None,
                        message: format!("stream interrupted: {e}"),
                    }));
                }
                None => {
                    state.buffer.extend_from_slice(b"\n");
                    drain_lines(&mut state);
                    state.finished = true;
                }
            }
        }
    }))
}

fn drain_lines<S>(state: &mut SseState<S>) {
    while let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
        let line = state.buffer.split_to(pos + 1);
        if state.finished {
            continue;
        }
        match decode_line(String::from_utf8_lossy(&line).trim_end()) {
            SseLine::Text(text) => state.pending.push_back(Ok(text)),
            SseLine::Stop => state.finished = true,
            SseLine::Failed(e) => {
                state.pending.push_back(Err(e));
                state.finished = true;
            }
            SseLine::Skip => {}
        }
    }
}
