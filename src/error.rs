//! Error types for stream processing.

use thiserror::Error;

/// Fallback message used when an upstream `error` event carries no text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Ways a stream run can fail.
///
/// Cancellation is not an error: an aborted run still produces a
/// [`StreamResult`](crate::StreamResult) with `was_aborted` set.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The agent run emitted an `error` event. Displays as the upstream text.
    #[error("{0}")]
    Upstream(String),

    /// A caller-supplied hook returned an error.
    #[error("{hook} hook failed: {source}")]
    Hook {
        /// Name of the hook that failed.
        hook: &'static str,
        /// The error the hook returned.
        #[source]
        source: anyhow::Error,
    },
}

impl StreamError {
    /// Build the upstream error, falling back to [`UNKNOWN_ERROR`] for absent or empty text.
    pub fn upstream(content: Option<String>) -> Self {
        let message = content
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        Self::Upstream(message)
    }

    /// Whether this error came from the upstream agent run rather than a local hook.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}

/// Result type for stream processing.
pub type StreamOutcome<T> = Result<T, StreamError>;
