//! Types for agent run stream events and the run summary

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Read a field the handling rules validate. A null or wrong-typed value counts as absent,
/// so one bad field drops only its own rule instead of the whole event.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// One event emitted by an agent run.
///
/// Events are untrusted: payload fields the handling rules depend on are
/// optional and validated where they are used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The upstream agent session started
    SessionInit {
        #[serde(default, deserialize_with = "lenient")]
        data: SessionInitPayload,
    },
    /// Incremental assistant text
    Message {
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    /// A tool invocation started
    ToolUse {
        #[serde(default, deserialize_with = "lenient")]
        data: ToolUsePayload,
    },
    /// A running tool reported progress
    ToolProgress {
        #[serde(default, deserialize_with = "lenient")]
        data: ToolProgressPayload,
    },
    /// A tool invocation finished
    ToolResult {
        #[serde(default, deserialize_with = "lenient")]
        data: ToolResultPayload,
    },
    /// Thinking trace
    Thinking {
        #[serde(default, deserialize_with = "lenient")]
        data: ThinkingPayload,
    },
    /// Final result of the run (or of a sub-agent)
    Result {
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        data: Option<ResultPayload>,
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        total_cost_usd: Option<f64>,
    },
    /// The run finished normally
    Complete,
    /// The run failed upstream
    Error {
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

impl StreamEvent {
    /// The wire tag of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionInit { .. } => "session_init",
            Self::Message { .. } => "message",
            Self::ToolUse { .. } => "tool_use",
            Self::ToolProgress { .. } => "tool_progress",
            Self::ToolResult { .. } => "tool_result",
            Self::Thinking { .. } => "thinking",
            Self::Result { .. } => "result",
            Self::Complete => "complete",
            Self::Error { .. } => "error",
        }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self::Message {
            content: Some(content.into()),
        }
    }

    pub fn thinking(content: impl Into<String>) -> Self {
        Self::Thinking {
            data: ThinkingPayload {
                content: Some(content.into()),
            },
        }
    }

    pub fn session_init(claude_session_id: impl Into<String>) -> Self {
        Self::SessionInit {
            data: SessionInitPayload {
                claude_session_id: Some(claude_session_id.into()),
                extra: Map::new(),
            },
        }
    }

    /// A `result` event carrying only result text.
    pub fn result_text(result: impl Into<String>) -> Self {
        Self::Result {
            data: Some(ResultPayload {
                cost: None,
                result: Some(result.into()),
            }),
            total_cost_usd: None,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::Error {
            content: Some(content.into()),
        }
    }
}

/// Payload of a `session_init` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInitPayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub claude_session_id: Option<String>,
    /// Any other fields the upstream sent along, passed through to the hook untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a `tool_use` event, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUsePayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub parent_tool_use_id: Option<String>,
}

impl ToolUsePayload {
    /// Validate into an invocation; `None` when the id or name is missing.
    pub fn into_invocation(self) -> Option<ToolInvocation> {
        Some(ToolInvocation {
            tool_use_id: self.tool_use_id?,
            tool_name: self.tool_name?,
            input: self.input,
            parent_tool_use_id: self.parent_tool_use_id,
        })
    }
}

/// A validated tool invocation, as handed to the `on_tool_use` hook
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool_use_id: String,
    pub tool_name: String,
    pub input: Option<Value>,
    pub parent_tool_use_id: Option<String>,
}

/// Payload of a `tool_progress` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolProgressPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub tool_use_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub tool_name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub elapsed_seconds: f64,
}

/// Payload of a `tool_result` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub tool_use_id: String,
    #[serde(default)]
    pub output: Value,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: i64,
}

/// Payload of a `thinking` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinkingPayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Payload of a `result` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// Summary of one processed stream
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResult {
    /// Accumulated assistant text
    pub content: String,
    /// Whether the run stopped because the abort signal tripped
    pub was_aborted: bool,
    /// First upstream session id announced by `session_init`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claude_session_id: Option<String>,
    /// Cost reported by the most recent `result` event that carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}
