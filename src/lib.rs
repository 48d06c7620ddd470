#![deny(missing_docs)]
//! Streaming client for the [Ollama](https://github.com/ollama/ollama)
//! generate API.
//!
//! Ollama answers `POST /api/generate` with newline-delimited JSON: a stream
//! of partial records, the last one marked `done: true` and carrying timing
//! fields plus an opaque conversation `context`. This crate reassembles that
//! stream into one [`GenerationResponse`] and threads the context into
//! follow-up requests so independent calls behave like one conversation.
//!
//! # Usage
//!
//! ```no_run
//! use ollama_client::{GenerationRequest, Ollama};
//!
//! # async fn demo() -> Result<(), ollama_client::OllamaError> {
//! let client = Ollama::new();
//!
//! for model in client.list_models().await? {
//!     println!("{} ({} bytes)", model.name, model.size);
//! }
//!
//! let response = client
//!     .generate(GenerationRequest::new("llama3.2", "Why is the sky blue?"))
//!     .await?;
//! println!("{}", response.response);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - NDJSON streaming (Ollama uses newline-delimited JSON, not SSE)
//! - Aggregated [`Ollama::generate`] and raw [`Ollama::generate_stream`]
//! - Conversation continuity via the opaque [`GenerationContext`]
//! - Model listing from `/api/tags`
//! - Cancellation by dropping the stream; typed errors that distinguish a
//!   broken connection from a server that hung up mid-generation

pub mod client;
pub mod error;
pub(crate) mod streaming;
pub mod types;

pub use client::Ollama;
pub use error::OllamaError;
pub use types::{
    GenerationChunk, GenerationContext, GenerationRequest, GenerationResponse, LocalModel,
};
