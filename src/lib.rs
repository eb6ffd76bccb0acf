//! # athena-cursor
//!
//! Cursor-based client for a remote SQL query service that separates query
//! submission from result retrieval.
//!
//! A [`QueryCursor`] submits a query, polls its execution state until it
//! finishes (with a timeout and an optional interrupt signal), then streams
//! the paginated result rows back exactly once and in order. Rows can also be
//! collected into an Apache Arrow `RecordBatch`.
//!
//! The crate does not talk to the network itself. Plug in a
//! [`QueryServiceClient`] implementation, usually through a
//! [`CredentialProvider`] that assumes the configured role.
//!
//! ## Example
//!
//! ```no_run
//! # use athena_cursor::*;
//! # use std::sync::Arc;
//! # async fn example(provider: Arc<dyn CredentialProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! let params = ConnectionParams::builder()
//!     .role_arn("arn:aws:iam::123456789012:role/analyst")
//!     .region("us-east-1")
//!     .workgroup("primary")
//!     .build()?;
//! let connection = Connection::new(params, provider);
//!
//! let mut cursor = connection.cursor().await?;
//! cursor.execute("SELECT id, name FROM users").await?;
//!
//! for row in cursor.fetch_all().await? {
//!     println!("{:?}", row);
//! }
//!
//! cursor.close();
//! connection.close();
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod api;
pub mod arrow_conversion;
pub mod connection;
pub mod error;
pub mod query;
pub mod transport;
pub mod types;

// Re-export public API
pub use api::{Connection, CursorOptions, CursorState, QueryCursor};
pub use arrow_conversion::ArrowConverter;
pub use connection::{ConnectionBuilder, ConnectionParams, CredentialProvider};
pub use error::{
    AthenaError, ConnectionError, DataError, DatabaseError, ErrorKind, OperationalError,
    ProgrammingError, TransportError,
};
pub use query::{ColumnDescriptor, LifecycleState, QueryExecutionState, Row};
pub use transport::QueryServiceClient;
pub use types::{SqlType, TypeMapper};
