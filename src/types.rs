//! Ollama `/api/generate` and `/api/tags` wire types.
//!
//! The generate endpoint answers with newline-delimited JSON: one
//! [`GenerationChunk`] per line, the last one carrying `done: true` together
//! with the conversation context and timing fields.
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion>

use serde::{Deserialize, Serialize};

/// Opaque encoding of a conversation, produced by the inference engine on the
/// terminal chunk of a generation.
///
/// Pass it back whole via [`GenerationRequest::context`] to continue the same
/// conversation; omit it to start a fresh one. The token values inside are an
/// engine-internal detail, so this type deliberately exposes no accessors —
/// the supported operations are cloning, comparing, and serde round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationContext(Vec<i64>);

/// Request body for POST `/api/generate`.
///
/// # Example
///
/// ```no_run
/// use ollama_client::GenerationRequest;
///
/// let request = GenerationRequest::new("llama3.2", "Why is the sky blue?")
///     .system("Answer in one sentence.");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// Model identifier (e.g. "llama3.2").
    pub model: String,
    /// The prompt to complete.
    pub prompt: String,
    /// Whether the server should stream the response. Always `true` for this
    /// client; the aggregator reconstitutes the full response.
    pub(crate) stream: bool,
    /// System prompt overriding the model's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Context from a previous response, to continue that conversation.
    /// Omitted from the wire entirely when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<GenerationContext>,
    /// How long to keep the model loaded in memory (e.g. "5m", "0").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    /// Free-form generation options forwarded to the server
    /// (e.g. `{"temperature": 0.2}`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

impl GenerationRequest {
    /// Create a streaming generation request for `model` with `prompt`.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
            system: None,
            context: None,
            keep_alive: None,
            options: None,
        }
    }

    /// Set the system prompt.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Continue the conversation encoded by `context`.
    ///
    /// The value must come from a previous [`GenerationResponse`] unchanged.
    pub fn context(mut self, context: GenerationContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the `keep_alive` duration for this request.
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    /// Set generation options (temperature, num_predict, seed, ...).
    pub fn options(mut self, options: serde_json::Value) -> Self {
        self.options = Some(options);
        self
    }
}

/// One decoded NDJSON record from the `/api/generate` stream.
///
/// `model`, `response` and `done` are required; a line missing any of them
/// fails to decode. Unknown fields are ignored so newer servers keep
/// working. Timing fields are only populated on the terminal chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationChunk {
    /// Model that produced this chunk.
    pub model: String,
    /// Creation timestamp, e.g. `2023-08-04T08:52:19.385406455-07:00`.
    /// Kept as an opaque string; the client never parses it. Empty when the
    /// server omits it.
    #[serde(default)]
    pub created_at: String,
    /// Text fragment delivered by this chunk. May be empty.
    pub response: String,
    /// True only on the last chunk of a generation.
    pub done: bool,
    /// Conversation context; expected only when `done` is true.
    #[serde(default)]
    pub context: Option<GenerationContext>,
    /// Total time spent on the request, in nanoseconds.
    #[serde(default)]
    pub total_duration: Option<u64>,
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Time spent evaluating the prompt, in nanoseconds.
    #[serde(default)]
    pub prompt_eval_duration: Option<u64>,
    /// Number of tokens generated.
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Time spent generating the response, in nanoseconds.
    #[serde(default)]
    pub eval_duration: Option<u64>,
}

/// A complete generation, reassembled from the chunk stream.
///
/// `response` is every fragment concatenated in arrival order; the remaining
/// fields come from the terminal chunk only.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Model that produced the response.
    pub model: String,
    /// Creation timestamp of the terminal chunk.
    pub created_at: String,
    /// The full response text.
    pub response: String,
    /// Always true; a response is only produced from a finished stream.
    pub done: bool,
    /// Context to pass into the next request to keep conversational memory.
    /// `None` when the server sent none; never coerced to an empty sequence.
    pub context: Option<GenerationContext>,
    /// Total time spent on the request, in nanoseconds.
    pub total_duration: Option<u64>,
    /// Number of tokens in the prompt.
    pub prompt_eval_count: Option<u64>,
    /// Time spent evaluating the prompt, in nanoseconds.
    pub prompt_eval_duration: Option<u64>,
    /// Number of tokens generated.
    pub eval_count: Option<u64>,
    /// Time spent generating the response, in nanoseconds.
    pub eval_duration: Option<u64>,
}

/// A locally installed model, as reported by GET `/api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalModel {
    /// Model name, including tag (e.g. "llama3.2:1b").
    pub name: String,
    /// Last-modified timestamp string.
    pub modified_at: String,
    /// On-disk size in bytes.
    pub size: u64,
}

/// Envelope of the `/api/tags` response.
#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    pub models: Vec<LocalModel>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_minimal_fields() {
        let request = GenerationRequest::new("llama3.2", "Hello");
        let value = serde_json::to_value(&request).expect("serializes");
        assert_eq!(
            value,
            json!({"model": "llama3.2", "prompt": "Hello", "stream": true})
        );
    }

    #[test]
    fn request_omits_absent_context() {
        let request = GenerationRequest::new("llama3.2", "Hello");
        let value = serde_json::to_value(&request).expect("serializes");
        assert!(value.get("context").is_none(), "context key must be absent");
    }

    #[test]
    fn request_serializes_context_verbatim() {
        let context: GenerationContext =
            serde_json::from_value(json!([5, 1, -3])).expect("decodes");
        let request = GenerationRequest::new("llama3.2", "Hello").context(context);
        let value = serde_json::to_value(&request).expect("serializes");
        assert_eq!(value["context"], json!([5, 1, -3]));
    }

    #[test]
    fn request_builder_sets_optional_fields() {
        let request = GenerationRequest::new("llama3.2", "Hi")
            .system("Be terse.")
            .keep_alive("5m")
            .options(json!({"temperature": 0.2}));
        let value = serde_json::to_value(&request).expect("serializes");
        assert_eq!(value["system"], "Be terse.");
        assert_eq!(value["keep_alive"], "5m");
        assert_eq!(value["options"]["temperature"], 0.2);
    }

    #[test]
    fn chunk_decodes_intermediate_record() {
        let chunk: GenerationChunk = serde_json::from_str(
            r#"{"model":"llama3.2","created_at":"2023-08-04T08:52:19.385406455-07:00","response":"Hel","done":false}"#,
        )
        .expect("decodes");
        assert_eq!(chunk.response, "Hel");
        assert!(!chunk.done);
        assert!(chunk.context.is_none());
        assert!(chunk.total_duration.is_none());
    }

    #[test]
    fn chunk_decodes_terminal_record_with_telemetry() {
        let chunk: GenerationChunk = serde_json::from_str(
            r#"{"model":"llama3.2","created_at":"t2","response":"","done":true,"context":[1,2,3],"total_duration":5000000000,"prompt_eval_count":20,"prompt_eval_duration":500000000,"eval_count":10,"eval_duration":3500000000}"#,
        )
        .expect("decodes");
        assert!(chunk.done);
        assert_eq!(chunk.total_duration, Some(5_000_000_000));
        assert_eq!(chunk.prompt_eval_count, Some(20));
        assert_eq!(chunk.eval_count, Some(10));
        let expected: GenerationContext =
            serde_json::from_value(json!([1, 2, 3])).expect("decodes");
        assert_eq!(chunk.context, Some(expected));
    }

    #[test]
    fn chunk_missing_required_field_fails() {
        let result = serde_json::from_str::<GenerationChunk>(
            r#"{"model":"llama3.2","created_at":"t0","done":false}"#,
        );
        assert!(result.is_err(), "missing response field must fail");
    }

    #[test]
    fn chunk_without_created_at_still_decodes() {
        let chunk: GenerationChunk = serde_json::from_str(
            r#"{"model":"llama3.2","response":"Hi","done":false}"#,
        )
        .expect("created_at is not required");
        assert_eq!(chunk.response, "Hi");
        assert_eq!(chunk.created_at, "");
    }

    #[test]
    fn chunk_ignores_unknown_fields() {
        let chunk: GenerationChunk = serde_json::from_str(
            r#"{"model":"llama3.2","created_at":"t0","response":"x","done":false,"done_reason":"stop","load_duration":7}"#,
        )
        .expect("unknown fields are tolerated");
        assert_eq!(chunk.response, "x");
    }

    #[test]
    fn chunk_rejects_negative_telemetry() {
        let result = serde_json::from_str::<GenerationChunk>(
            r#"{"model":"llama3.2","created_at":"t0","response":"","done":true,"total_duration":-1}"#,
        );
        assert!(result.is_err(), "negative durations must fail to decode");
    }

    #[test]
    fn context_round_trips_through_serde() {
        let context: GenerationContext =
            serde_json::from_value(json!([1, 2, 3])).expect("decodes");
        let value = serde_json::to_value(&context).expect("serializes");
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn tags_response_decodes_models_in_order() {
        let tags: TagsResponse = serde_json::from_value(json!({
            "models": [
                {"name": "llama3.2:1b", "modified_at": "2024-01-01T00:00:00Z", "size": 1234},
                {"name": "mistral", "modified_at": "2024-02-01T00:00:00Z", "size": 5678}
            ]
        }))
        .expect("decodes");
        assert_eq!(tags.models.len(), 2);
        assert_eq!(tags.models[0].name, "llama3.2:1b");
        assert_eq!(tags.models[1].size, 5678);
    }
}
