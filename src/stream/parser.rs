//! Parser for newline-delimited JSON stream events

use futures::{future, Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_stream::wrappers::LinesStream;

use super::types::StreamEvent;

/// Parse one line of NDJSON into an event.
///
/// Blank lines, invalid JSON and unknown event types yield `None`.
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!("Failed to parse stream event: {} - line: {}", e, line);
            None
        }
    }
}

/// Lazily decode events from an async reader, one per line.
///
/// A read error ends the stream.
pub fn event_stream<R>(reader: R) -> impl Stream<Item = StreamEvent>
where
    R: AsyncBufRead,
{
    LinesStream::new(reader.lines())
        .take_while(|line| {
            if let Err(e) = line {
                tracing::warn!("Failed to read event stream: {}", e);
            }
            future::ready(line.is_ok())
        })
        .filter_map(|line| future::ready(line.ok().as_deref().and_then(parse_line)))
}
