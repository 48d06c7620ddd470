//! NDJSON streaming support for the Ollama generate API.
//!
//! Ollama emits one JSON object per line, not SSE:
//! ```text
//! {"model":"llama3.2","created_at":"t0","response":"Hel","done":false}
//! {"model":"llama3.2","created_at":"t1","response":"lo","done":false}
//! {"model":"llama3.2","created_at":"t2","response":"!","done":true,"context":[1,2,3],"total_duration":500}
//! ```
//!
//! [`chunk_stream`] reframes the raw byte stream into decoded
//! [`GenerationChunk`]s; [`collect_final`] folds those into one
//! [`GenerationResponse`].
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion>

use futures::{Stream, StreamExt};

use crate::error::OllamaError;
use crate::types::{GenerationChunk, GenerationResponse};

/// Decode one NDJSON line into a [`GenerationChunk`].
///
/// The caller filters out blank lines first; every line handed here must be a
/// self-contained JSON object.
pub(crate) fn decode_chunk(line: &str) -> Result<GenerationChunk, OllamaError> {
    serde_json::from_str(line).map_err(|e| OllamaError::MalformedRecord {
        reason: e.to_string(),
        partial: String::new(),
    })
}

/// Reframe a raw HTTP byte stream into a stream of decoded chunks.
///
/// Lines may arrive split across byte chunks in any way — including in the
/// middle of a multi-byte UTF-8 character — so bytes are buffered raw and
/// only complete lines are UTF-8-decoded; an incomplete trailing sequence
/// simply waits in the buffer for the next chunk. Blank lines (the usual
/// trailing one included) are skipped, `\r` is stripped, and a final
/// unterminated line is still decoded. The stream ends right after the chunk
/// with `done: true`; anything the server sends past it is discarded.
///
/// A transport error or an undecodable line ends the stream with an `Err`
/// item.
pub(crate) fn chunk_stream(
    byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = Result<GenerationChunk, OllamaError>> + Send + 'static {
    async_stream::try_stream! {
        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut line_buf = bytes::BytesMut::new();

        while let Some(chunk_result) = byte_stream.next().await {
            line_buf.extend_from_slice(&chunk_result?);

            while let Some(newline_pos) = line_buf.iter().position(|&b| b == b'\n') {
                let line_bytes = line_buf.split_to(newline_pos + 1);
                let line = decode_line(&line_bytes[..newline_pos])?;
                let line = line.trim_end_matches('\r');

                if line.trim().is_empty() {
                    continue;
                }

                let chunk = decode_chunk(line)?;
                let done = chunk.done;
                yield chunk;
                if done {
                    return;
                }
            }
        }

        // A well-behaved server terminates every line, but decode a leftover
        // anyway rather than dropping it on the floor.
        if !line_buf.iter().all(|b| b.is_ascii_whitespace()) {
            let line = decode_line(&line_buf)?;
            yield decode_chunk(line.trim())?;
        }
    }
}

/// UTF-8-decode one complete line's bytes.
fn decode_line(bytes: &[u8]) -> Result<&str, OllamaError> {
    std::str::from_utf8(bytes).map_err(|e| OllamaError::MalformedRecord {
        reason: format!("invalid UTF-8 in stream: {e}"),
        partial: String::new(),
    })
}

/// Fold a chunk stream into a single finalized [`GenerationResponse`].
///
/// Fragments are concatenated strictly in arrival order, empty ones included.
/// The context holder is last-write-wins, so the terminal chunk's context
/// supersedes any earlier one. Telemetry is read from the terminal chunk
/// only; values on intermediate chunks are ignored.
///
/// If the stream ends without a `done: true` chunk the accumulated text is
/// not returned as a response — the caller gets
/// [`OllamaError::IncompleteStream`] carrying it as diagnostic text instead,
/// so a truncated answer can never be mistaken for a complete one.
pub(crate) async fn collect_final(
    chunks: impl Stream<Item = Result<GenerationChunk, OllamaError>>,
) -> Result<GenerationResponse, OllamaError> {
    let mut chunks = std::pin::pin!(chunks);
    let mut text = String::new();
    let mut context = None;

    while let Some(result) = chunks.next().await {
        let chunk = match result {
            Ok(chunk) => chunk,
            Err(e) => return Err(e.with_partial(text)),
        };

        text.push_str(&chunk.response);
        if chunk.context.is_some() {
            context = chunk.context;
        }

        if chunk.done {
            tracing::debug!(
                model = %chunk.model,
                response_len = text.len(),
                eval_count = ?chunk.eval_count,
                "generation stream finished"
            );
            return Ok(GenerationResponse {
                model: chunk.model,
                created_at: chunk.created_at,
                response: text,
                done: true,
                context,
                total_duration: chunk.total_duration,
                prompt_eval_count: chunk.prompt_eval_count,
                prompt_eval_duration: chunk.prompt_eval_duration,
                eval_count: chunk.eval_count,
                eval_duration: chunk.eval_duration,
            });
        }
    }

    Err(OllamaError::IncompleteStream { partial: text })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
