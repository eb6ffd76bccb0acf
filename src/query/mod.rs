//! Query lifecycle and result handling.
//!
//! # Overview
//!
//! The query module is organized into:
//! - `execution` - lifecycle states and immutable execution snapshots
//! - `poller` - the cancellable poll loop that waits for a terminal state
//! - `results` - result pages, rows and the paginated row stream
//!
//! These pieces are transport-agnostic: they only talk to a
//! [`QueryServiceClient`](crate::transport::QueryServiceClient). The public
//! state machine tying them together is [`QueryCursor`](crate::QueryCursor).

pub mod execution;
pub mod poller;
pub mod results;

// Re-export commonly used types
pub use execution::{LifecycleState, QueryExecutionState, QueryStatistics};
pub use poller::{poll_once, poll_until_terminal, PollOutcome, PollPolicy};
pub use results::{
    ColumnDescriptor, Nullability, ResultPage, ResultSetCursor, Row, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
