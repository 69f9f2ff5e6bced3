//! Caller-supplied callbacks dispatched while a stream is processed

use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;

use super::types::{
    ResultPayload, SessionInitPayload, ToolInvocation, ToolProgressPayload, ToolResultPayload,
};

/// What every hook resolves to. An `Err` stops the run.
pub type HookResult = anyhow::Result<()>;

pub type HookFuture = BoxFuture<'static, HookResult>;

pub(crate) type Hook<T> = Box<dyn Fn(T) -> HookFuture + Send + Sync>;

/// Argument of the `on_message_chunk` hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChunk {
    /// The text carried by the `message` event
    pub content: String,
    /// Accumulated content after merging the chunk
    pub accumulated: String,
}

/// Optional async callbacks, one per event condition.
///
/// Every hook is awaited before the next event is pulled, so callers observe
/// side effects in exactly the order the events arrived.
#[derive(Default)]
pub struct StreamEventHooks {
    pub(crate) on_session_init: Option<Hook<SessionInitPayload>>,
    pub(crate) on_tool_use: Option<Hook<ToolInvocation>>,
    pub(crate) on_tool_progress: Option<Hook<ToolProgressPayload>>,
    pub(crate) on_tool_result: Option<Hook<ToolResultPayload>>,
    pub(crate) on_thinking: Option<Hook<String>>,
    pub(crate) on_result: Option<Hook<ResultPayload>>,
    pub(crate) on_complete: Option<Hook<()>>,
    pub(crate) on_error: Option<Hook<String>>,
    pub(crate) on_message_chunk: Option<Hook<MessageChunk>>,
    pub(crate) on_streaming_emit: Option<Hook<String>>,
    pub(crate) on_final_content: Option<Hook<String>>,
}

fn boxed<T, F, Fut>(hook: F) -> Option<Hook<T>>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HookResult> + Send + 'static,
{
    Some(Box::new(move |arg| hook(arg).boxed()))
}

impl StreamEventHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the `session_init` payload when it carries a session id.
    pub fn on_session_init<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(SessionInitPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_session_init = boxed(hook);
        self
    }

    /// Called for `tool_use` events that carry both an id and a name.
    pub fn on_tool_use<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(ToolInvocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_tool_use = boxed(hook);
        self
    }

    pub fn on_tool_progress<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(ToolProgressPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_tool_progress = boxed(hook);
        self
    }

    pub fn on_tool_result<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(ToolResultPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_tool_result = boxed(hook);
        self
    }

    /// Called once per non-empty thinking chunk.
    pub fn on_thinking<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_thinking = boxed(hook);
        self
    }

    /// Called for every `result` event with the raw payload it carried.
    pub fn on_result<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(ResultPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_result = boxed(hook);
        self
    }

    pub fn on_complete<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_complete = boxed(move |()| hook());
        self
    }

    /// Called with the upstream error message before the run fails.
    ///
    /// The run fails regardless of what this hook returns.
    pub fn on_error<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_error = boxed(hook);
        self
    }

    pub fn on_message_chunk<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(MessageChunk) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_message_chunk = boxed(hook);
        self
    }

    /// Called with the full accumulated content whenever it changes.
    pub fn on_streaming_emit<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_streaming_emit = boxed(hook);
        self
    }

    /// Called once with non-empty content when the run finishes without being aborted.
    pub fn on_final_content<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on_final_content = boxed(hook);
        self
    }
}

impl fmt::Debug for StreamEventHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamEventHooks")
            .field("on_session_init", &self.on_session_init.is_some())
            .field("on_tool_use", &self.on_tool_use.is_some())
            .field("on_tool_progress", &self.on_tool_progress.is_some())
            .field("on_tool_result", &self.on_tool_result.is_some())
            .field("on_thinking", &self.on_thinking.is_some())
            .field("on_result", &self.on_result.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_message_chunk", &self.on_message_chunk.is_some())
            .field("on_streaming_emit", &self.on_streaming_emit.is_some())
            .field("on_final_content", &self.on_final_content.is_some())
            .finish()
    }
}
