//! Accumulated text and summary fields for a single run

use super::types::StreamResult;

/// Per-run state. Created fresh for every call and consumed into a [`StreamResult`].
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    content: String,
    claude_session_id: Option<String>,
    cost: Option<f64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Merge a `message` chunk. Returns `false` (and leaves the content untouched) for an empty chunk.
    ///
    /// Chunks are joined with a single space unless the content already ends in a newline.
    pub fn append_message(&mut self, chunk: &str) -> bool {
        if chunk.is_empty() {
            return false;
        }
        if !self.content.is_empty() && !self.content.ends_with('\n') {
            self.content.push(' ');
        }
        self.content.push_str(chunk);
        true
    }

    /// Merge `result` text as its own block. Returns whether the content changed.
    ///
    /// Text already present anywhere in the content is not added again.
    pub fn merge_result_text(&mut self, text: &str) -> bool {
        if text.is_empty() || self.content.contains(text) {
            return false;
        }
        if !self.content.is_empty() {
            self.content.push('\n');
        }
        self.content.push_str(text);
        true
    }

    /// Record the upstream session id. The first non-empty id wins.
    pub fn record_session_id(&mut self, id: &str) {
        if self.claude_session_id.is_none() && !id.is_empty() {
            self.claude_session_id = Some(id.to_string());
        }
    }

    /// Record a reported cost. The latest one wins.
    pub fn record_cost(&mut self, cost: f64) {
        self.cost = Some(cost);
    }

    pub fn into_result(self, was_aborted: bool) -> StreamResult {
        StreamResult {
            content: self.content,
            was_aborted,
            claude_session_id: self.claude_session_id,
            cost: self.cost,
        }
    }
}
