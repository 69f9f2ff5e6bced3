//! Configuration for a stream processing run

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A read-only cancellation handle, polled once per event.
pub trait AbortSignal: Send + Sync {
    fn is_aborted(&self) -> bool;
}

impl AbortSignal for AtomicBool {
    fn is_aborted(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}

impl AbortSignal for CancellationToken {
    fn is_aborted(&self) -> bool {
        self.is_cancelled()
    }
}

impl<T: AbortSignal + ?Sized> AbortSignal for Arc<T> {
    fn is_aborted(&self) -> bool {
        (**self).is_aborted()
    }
}

/// A cloneable flag that trips once and stays tripped
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl AbortSignal for AbortFlag {
    fn is_aborted(&self) -> bool {
        self.0.is_aborted()
    }
}

/// Infrastructure callback fired with the type tag of every event processed.
pub type ActivityCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Configuration for one call to [`process_stream`](crate::process_stream).
#[derive(Clone)]
pub struct StreamProcessorConfig {
    /// Console session the run belongs to.
    pub session_id: String,

    /// Message the accumulated content is written into.
    pub message_id: String,

    pub created_at: DateTime<Utc>,

    /// Fold `result` event text into the accumulated content.
    pub capture_result_text: bool,

    /// Polled at the top of each loop iteration.
    pub abort_signal: Option<Arc<dyn AbortSignal>>,

    /// Fired for every event that gets past the abort check, e.g. for idle-timeout tracking.
    pub on_stream_activity: Option<ActivityCallback>,
}

impl StreamProcessorConfig {
    /// Create a new configuration.
    pub fn new(session_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message_id: message_id.into(),
            created_at: Utc::now(),
            capture_result_text: true,
            abort_signal: None,
            on_stream_activity: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_capture_result_text(mut self, capture: bool) -> Self {
        self.capture_result_text = capture;
        self
    }

    /// Set the abort signal.
    pub fn with_abort_signal(mut self, signal: impl AbortSignal + 'static) -> Self {
        self.abort_signal = Some(Arc::new(signal));
        self
    }

    /// Set the per-event activity callback.
    pub fn with_stream_activity<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_stream_activity = Some(Arc::new(callback));
        self
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.abort_signal
            .as_ref()
            .is_some_and(|signal| signal.is_aborted())
    }

    pub(crate) fn notify_activity(&self, event_type: &str) {
        if let Some(callback) = &self.on_stream_activity {
            callback(event_type);
        }
    }
}

impl fmt::Debug for StreamProcessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamProcessorConfig")
            .field("session_id", &self.session_id)
            .field("message_id", &self.message_id)
            .field("created_at", &self.created_at)
            .field("capture_result_text", &self.capture_result_text)
            .field("aborted", &self.is_aborted())
            .field("on_stream_activity", &self.on_stream_activity.is_some())
            .finish()
    }
}
