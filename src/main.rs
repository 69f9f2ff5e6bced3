//! Agent Stream - replay an agent run's NDJSON event log through the stream processor

use std::path::PathBuf;
use std::time::Duration;

use agent_stream::{
    event_stream, process_stream, ActivityTracker, StreamEvent, StreamEventHooks,
    StreamProcessorConfig,
};
use anyhow::{Context, Result};
use clap::Parser;
use futures::{future, Stream, StreamExt};
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "agent-stream")]
#[command(about = "Replay an agent run's event stream and print its summary")]
#[command(version)]
struct Args {
    /// NDJSON event log to read (stdin if omitted)
    file: Option<PathBuf>,

    /// Console session the run belongs to
    #[arg(long)]
    session_id: Option<String>,

    /// Message the content is written into
    #[arg(long)]
    message_id: Option<String>,

    /// Do not fold result text into the content
    #[arg(long)]
    no_capture_result_text: bool,

    /// Stop the run if no event arrives for this many seconds
    #[arg(long)]
    idle_timeout: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.file {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Could not open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping stream");
            ctrl_c.cancel();
        }
    });

    let tracker = ActivityTracker::new();
    let mut config = StreamProcessorConfig::new(
        args.session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        args.message_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
    )
    .with_capture_result_text(!args.no_capture_result_text)
    .with_abort_signal(cancel.clone());
    config.on_stream_activity = Some(tracker.callback());

    let events = guarded(
        event_stream(reader),
        cancel.clone(),
        args.idle_timeout.map(Duration::from_secs),
    );

    let result = process_stream(events, &config, &logging_hooks()).await?;

    tracing::debug!(
        events = tracker.total(),
        counts = ?tracker.counts(),
        idle = ?tracker.idle_for(),
        "Activity summary"
    );

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// End the source when `cancel` fires, and cancel it when the source goes idle.
fn guarded<S>(
    events: S,
    cancel: CancellationToken,
    idle_timeout: Option<Duration>,
) -> impl Stream<Item = StreamEvent>
where
    S: Stream<Item = StreamEvent> + Send + 'static,
{
    let stop = cancel.clone();
    let events = events.take_until(async move { stop.cancelled().await });

    match idle_timeout {
        Some(limit) => tokio_stream::StreamExt::timeout(events, limit)
            .take_while(move |item| {
                if item.is_err() {
                    tracing::warn!("No event for {:?}, stopping stream", limit);
                    cancel.cancel();
                }
                future::ready(item.is_ok())
            })
            .filter_map(|item| future::ready(item.ok()))
            .boxed(),
        None => events.boxed(),
    }
}

fn logging_hooks() -> StreamEventHooks {
    StreamEventHooks::new()
        .on_session_init(|data| async move {
            tracing::info!(claude_session_id = ?data.claude_session_id, "Session started");
            Ok(())
        })
        .on_tool_use(|tool| async move {
            tracing::info!(tool_use_id = %tool.tool_use_id, tool = %tool.tool_name, "Tool use");
            Ok(())
        })
        .on_tool_progress(|progress| async move {
            tracing::debug!(
                tool_use_id = %progress.tool_use_id,
                elapsed_seconds = progress.elapsed_seconds,
                "Tool progress"
            );
            Ok(())
        })
        .on_tool_result(|result| async move {
            match result.error {
                Some(error) => tracing::warn!(tool_use_id = %result.tool_use_id, %error, "Tool failed"),
                None => tracing::info!(tool_use_id = %result.tool_use_id, "Tool finished"),
            }
            Ok(())
        })
        .on_thinking(|thinking| async move {
            tracing::debug!("Thinking: {}", thinking);
            Ok(())
        })
        .on_message_chunk(|chunk| async move {
            tracing::debug!(len = chunk.accumulated.len(), "Message: {}", chunk.content);
            Ok(())
        })
        .on_result(|result| async move {
            tracing::info!(cost = ?result.cost, "Result received");
            Ok(())
        })
        .on_complete(|| async {
            tracing::info!("Run complete");
            Ok(())
        })
        .on_error(|message| async move {
            tracing::error!("Run failed: {}", message);
            Ok(())
        })
}
