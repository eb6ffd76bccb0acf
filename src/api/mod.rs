//! Public query interface.
//!
//! - `connection` - [`Connection`], the cursor factory holding the shared client
//! - `cursor` - [`QueryCursor`], the per-query state machine, and its options

pub mod connection;
pub mod cursor;

pub use connection::Connection;
pub use cursor::{CursorOptions, CursorState, QueryCursor};
