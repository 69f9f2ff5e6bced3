//! Event loop that folds a run's events into a [`StreamResult`]

use futures::{pin_mut, Stream, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::{StreamError, StreamOutcome};

use super::accumulator::Accumulator;
use super::config::StreamProcessorConfig;
use super::hooks::{Hook, MessageChunk, StreamEventHooks};
use super::types::{ResultPayload, StreamEvent, StreamResult};

/// Where the loop stands after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Streaming,
    /// A `complete` event was processed, or the source ran dry
    Completed,
    /// The abort signal tripped
    Aborted,
}

/// Consume `events` until the run completes, is aborted, or fails.
///
/// Each event's hooks are awaited before the next event is pulled. An `error`
/// event, or a hook returning an error, fails the whole run without a summary.
/// The source is not closed on abort; it is dropped when this returns.
pub async fn process_stream<S>(
    events: S,
    config: &StreamProcessorConfig,
    hooks: &StreamEventHooks,
) -> StreamOutcome<StreamResult>
where
    S: Stream<Item = StreamEvent>,
{
    let span = info_span!(
        "process_stream",
        session_id = %config.session_id,
        message_id = %config.message_id,
    );
    run(events, config, hooks).instrument(span).await
}

async fn run<S>(
    events: S,
    config: &StreamProcessorConfig,
    hooks: &StreamEventHooks,
) -> StreamOutcome<StreamResult>
where
    S: Stream<Item = StreamEvent>,
{
    pin_mut!(events);
    let mut acc = Accumulator::new();
    let mut state = StreamState::Streaming;

    while state == StreamState::Streaming {
        let Some(event) = events.next().await else {
            // The signal may have tripped while we were waiting on a source that then ended
            state = if config.is_aborted() {
                StreamState::Aborted
            } else {
                debug!("Event source ended without a complete event");
                StreamState::Completed
            };
            break;
        };

        if config.is_aborted() {
            state = StreamState::Aborted;
            break;
        }

        config.notify_activity(event.event_type());
        state = handle_event(event, &mut acc, config, hooks).await?;
    }

    finalize(acc, state, hooks).await
}

async fn handle_event(
    event: StreamEvent,
    acc: &mut Accumulator,
    config: &StreamProcessorConfig,
    hooks: &StreamEventHooks,
) -> StreamOutcome<StreamState> {
    debug!(event_type = event.event_type(), "Processing stream event");

    match event {
        StreamEvent::SessionInit { data } => {
            let Some(id) = data.claude_session_id.as_deref().filter(|id| !id.is_empty()) else {
                debug!("Dropping session_init without a session id");
                return Ok(StreamState::Streaming);
            };
            acc.record_session_id(id);
            fire("on_session_init", &hooks.on_session_init, || data).await?;
        }
        StreamEvent::Message { content } => {
            let Some(content) = content else {
                return Ok(StreamState::Streaming);
            };
            if !acc.append_message(&content) {
                return Ok(StreamState::Streaming);
            }
            fire("on_message_chunk", &hooks.on_message_chunk, || MessageChunk {
                content,
                accumulated: acc.content().to_string(),
            })
            .await?;
            fire("on_streaming_emit", &hooks.on_streaming_emit, || {
                acc.content().to_string()
            })
            .await?;
        }
        StreamEvent::ToolUse { data } => match data.into_invocation() {
            Some(invocation) => {
                fire("on_tool_use", &hooks.on_tool_use, || invocation).await?;
            }
            None => debug!("Dropping tool_use without an id or name"),
        },
        StreamEvent::ToolProgress { data } => {
            fire("on_tool_progress", &hooks.on_tool_progress, || data).await?;
        }
        StreamEvent::ToolResult { data } => {
            fire("on_tool_result", &hooks.on_tool_result, || data).await?;
        }
        StreamEvent::Thinking { data } => {
            if let Some(content) = data.content.filter(|c| !c.is_empty()) {
                fire("on_thinking", &hooks.on_thinking, || content).await?;
            }
        }
        StreamEvent::Result {
            data,
            total_cost_usd,
        } => {
            handle_result(data.unwrap_or_default(), total_cost_usd, acc, config, hooks).await?;
        }
        StreamEvent::Complete => {
            fire("on_complete", &hooks.on_complete, || ()).await?;
            return Ok(StreamState::Completed);
        }
        StreamEvent::Error { content } => {
            let err = StreamError::upstream(content);
            warn!(error = %err, "Agent run reported an error");
            if let Some(hook) = &hooks.on_error {
                // The upstream error is what the caller sees, whatever the hook does
                if let Err(e) = hook(err.to_string()).await {
                    warn!("on_error hook failed: {:#}", e);
                }
            }
            return Err(err);
        }
    }

    Ok(StreamState::Streaming)
}

async fn handle_result(
    payload: ResultPayload,
    total_cost_usd: Option<f64>,
    acc: &mut Accumulator,
    config: &StreamProcessorConfig,
    hooks: &StreamEventHooks,
) -> StreamOutcome<()> {
    if config.capture_result_text {
        if let Some(text) = payload.result.as_deref() {
            if acc.merge_result_text(text) {
                fire("on_streaming_emit", &hooks.on_streaming_emit, || {
                    acc.content().to_string()
                })
                .await?;
            }
        }
    }

    if let Some(cost) = payload.cost.or(total_cost_usd) {
        acc.record_cost(cost);
    }

    fire("on_result", &hooks.on_result, || payload).await
}

async fn finalize(
    acc: Accumulator,
    state: StreamState,
    hooks: &StreamEventHooks,
) -> StreamOutcome<StreamResult> {
    let was_aborted = state == StreamState::Aborted;
    let result = acc.into_result(was_aborted);

    info!(
        content_len = result.content.len(),
        was_aborted,
        cost = ?result.cost,
        "Stream finished"
    );

    if !was_aborted && !result.content.is_empty() {
        fire("on_final_content", &hooks.on_final_content, || {
            result.content.clone()
        })
        .await?;
    }

    Ok(result)
}

/// Invoke `hook` if it is set, building its argument only then.
async fn fire<T>(
    name: &'static str,
    hook: &Option<Hook<T>>,
    arg: impl FnOnce() -> T,
) -> StreamOutcome<()> {
    let Some(hook) = hook else {
        return Ok(());
    };

    hook(arg()).await.map_err(|source| {
        warn!("{} hook failed: {:#}", name, source);
        StreamError::Hook { hook: name, source }
    })
}
