//! Agent stream - folds an agent run's event stream into a single summary
//! while dispatching typed hooks in event order.

pub mod error;
pub mod stream;

pub use error::{StreamError, StreamOutcome, UNKNOWN_ERROR};
pub use stream::*;
