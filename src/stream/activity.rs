//! Stream activity tracking for idle detection

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::config::ActivityCallback;

#[derive(Debug)]
struct ActivityState {
    last_activity: Instant,
    counts: BTreeMap<String, u64>,
}

/// Records when the stream last showed activity and how many events of each type it saw.
///
/// Clones share the same state, so one clone can feed
/// [`StreamProcessorConfig::on_stream_activity`](crate::StreamProcessorConfig)
/// while another is read from a watchdog.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    inner: Arc<Mutex<ActivityState>>,
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ActivityState {
                last_activity: Instant::now(),
                counts: BTreeMap::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ActivityState> {
        // Nothing can leave the state half-updated, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, event_type: &str) {
        let mut state = self.state();
        state.last_activity = Instant::now();
        *state.counts.entry(event_type.to_string()).or_default() += 1;
    }

    /// Time since the last recorded event (or since creation).
    pub fn idle_for(&self) -> Duration {
        self.state().last_activity.elapsed()
    }

    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.state().counts.clone()
    }

    pub fn total(&self) -> u64 {
        self.state().counts.values().sum()
    }

    /// A callback that records into this tracker.
    pub fn callback(&self) -> ActivityCallback {
        let tracker = self.clone();
        Arc::new(move |event_type: &str| tracker.record(event_type))
    }
}
