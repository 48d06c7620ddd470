//! Ollama API client struct and builder.

use futures::Stream;

use crate::error::OllamaError;
use crate::streaming;
use crate::types::{
    GenerationChunk, GenerationRequest, GenerationResponse, LocalModel, TagsResponse,
};

/// Default Ollama API base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Client for a local Ollama server.
///
/// Each generation call is an independent, stateless invocation: the client
/// holds no conversation state, so one instance can serve any number of
/// concurrent conversations. Continuity lives entirely in the
/// [`GenerationResponse::context`] value the caller threads into the next
/// request.
///
/// # Example
///
/// ```no_run
/// use ollama_client::{GenerationRequest, Ollama};
///
/// # async fn demo() -> Result<(), ollama_client::OllamaError> {
/// let client = Ollama::new().base_url("http://localhost:11434");
///
/// let first = client
///     .generate(GenerationRequest::new("llama3.2", "Name a planet."))
///     .await?;
///
/// // Thread the context through to continue the same conversation.
/// let mut followup = GenerationRequest::new("llama3.2", "Name another one.");
/// if let Some(context) = first.context {
///     followup = followup.context(context);
/// }
/// let second = client.generate(followup).await?;
/// println!("{}", second.response);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Ollama {
    /// API base URL (override for testing or remote instances).
    base_url: String,
    /// Default keep_alive applied to requests that do not set their own.
    keep_alive: Option<String>,
    /// Shared HTTP client.
    client: reqwest::Client,
}

impl Ollama {
    /// Create a new client pointed at the default local endpoint.
    ///
    /// Default base URL: `http://localhost:11434`. No authentication is
    /// involved; Ollama is a local server.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            keep_alive: None,
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a mock server or a remote Ollama instance.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a default `keep_alive` duration for model memory residency.
    ///
    /// Examples: `"5m"` (keep for 5 minutes), `"0"` (unload immediately).
    /// A request-level `keep_alive` takes precedence over this default.
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    /// Build the generate endpoint URL.
    pub(crate) fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    /// Build the model listing endpoint URL.
    pub(crate) fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url.trim_end_matches('/'))
    }

    /// Run a generation to completion and return the finalized response.
    ///
    /// Consumes the server's NDJSON stream, concatenating fragments in
    /// arrival order until the terminal chunk arrives. The result carries the
    /// full text, the terminal chunk's timing fields, and the conversation
    /// [`context`](GenerationResponse::context) for the next request.
    ///
    /// Fails with [`OllamaError::IncompleteStream`] if the server closes the
    /// stream before the terminal chunk, and [`OllamaError::MalformedRecord`]
    /// if any line fails to decode; neither returns partial text through the
    /// success path.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, OllamaError> {
        let chunks = self.generate_stream(request).await?;
        streaming::collect_final(chunks).await
    }

    /// Run a generation and expose the decoded chunk stream directly.
    ///
    /// Each item is one [`GenerationChunk`] in arrival order; the stream ends
    /// after the chunk with `done: true`. Dropping the stream before that
    /// cancels the generation and closes the underlying connection — no
    /// finalized response exists for an abandoned stream.
    pub async fn generate_stream(
        &self,
        mut request: GenerationRequest,
    ) -> Result<
        impl Stream<Item = Result<GenerationChunk, OllamaError>> + Send + 'static,
        OllamaError,
    > {
        if request.keep_alive.is_none() {
            request.keep_alive = self.keep_alive.clone();
        }

        let response = self
            .client
            .post(self.generate_url())
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(model = %request.model, "generation stream opened");
        Ok(streaming::chunk_stream(response.bytes_stream()))
    }

    /// List the models installed on the server.
    ///
    /// Maps the `/api/tags` payload to [`LocalModel`] descriptors, order
    /// preserved.
    pub async fn list_models(&self) -> Result<Vec<LocalModel>, OllamaError> {
        let response = self.client.get(self.tags_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let tags: TagsResponse =
            serde_json::from_str(&body).map_err(|e| OllamaError::MalformedRecord {
                reason: format!("invalid model listing: {e}"),
                partial: String::new(),
            })?;
        tracing::debug!(count = tags.models.len(), "listed local models");
        Ok(tags.models)
    }
}

impl Default for Ollama {
    fn default() -> Self {
        Self::new()
    }
}
