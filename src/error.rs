//! Error types for Ollama API calls.

/// Errors from talking to an Ollama server.
///
/// All variants are terminal for the current call: the client never retries
/// internally. Retrying a partially consumed stream would duplicate text that
/// was already delivered, so retries (if wanted) are a caller policy applied
/// to the whole generation call — [`OllamaError::is_retryable`] says which
/// failures are worth one.
#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    /// Network-level failure (connection refused, reset, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("api error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        message: String,
    },

    /// A stream line failed to decode into a generation record.
    ///
    /// Aborts the call immediately; a skipped line could silently drop
    /// response text.
    #[error("malformed record: {reason}")]
    MalformedRecord {
        /// Why decoding failed.
        reason: String,
        /// Text accumulated before the bad line, for diagnostic display.
        /// Never a substitute for a complete response.
        partial: String,
    },

    /// The stream ended cleanly before a terminal (`done: true`) record.
    ///
    /// Distinct from [`OllamaError::Transport`] so callers can tell "server
    /// hung up early" from "network broke".
    #[error("stream ended before the terminal record")]
    IncompleteStream {
        /// Text accumulated before the stream ended.
        partial: String,
    },
}

impl OllamaError {
    /// Whether this failure is likely transient and the whole call can be
    /// retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => (500..600).contains(status),
            Self::MalformedRecord { .. } | Self::IncompleteStream { .. } => false,
        }
    }

    /// Text that had been accumulated when the stream failed, if any.
    ///
    /// Present on [`OllamaError::MalformedRecord`] and
    /// [`OllamaError::IncompleteStream`]; intended for diagnostics only.
    #[must_use]
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            Self::MalformedRecord { partial, .. } | Self::IncompleteStream { partial } => {
                Some(partial)
            }
            _ => None,
        }
    }

    /// Attach the aggregator's accumulated text to a stream-shaped error.
    pub(crate) fn with_partial(self, text: String) -> Self {
        match self {
            Self::MalformedRecord { reason, .. } => Self::MalformedRecord {
                reason,
                partial: text,
            },
            Self::IncompleteStream { .. } => Self::IncompleteStream { partial: text },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_5xx_is_retryable() {
        let err = OllamaError::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn api_4xx_is_not_retryable() {
        let err = OllamaError::Api {
            status: 404,
            message: "model not found".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn incomplete_stream_is_not_retryable() {
        let err = OllamaError::IncompleteStream {
            partial: "half an ans".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn partial_text_exposed_for_stream_errors() {
        let err = OllamaError::MalformedRecord {
            reason: "bad json".into(),
            partial: "Hel".into(),
        };
        assert_eq!(err.partial_text(), Some("Hel"));

        let err = OllamaError::Api {
            status: 400,
            message: "bad".into(),
        };
        assert!(err.partial_text().is_none());
    }

    #[test]
    fn with_partial_fills_accumulated_text() {
        let err = OllamaError::MalformedRecord {
            reason: "bad json".into(),
            partial: String::new(),
        }
        .with_partial("Hello".into());
        assert_eq!(err.partial_text(), Some("Hello"));
    }
}
