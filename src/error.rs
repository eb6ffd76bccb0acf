//! Error types for athena-cursor.
//!
//! Errors are grouped by kind: caller misuse, remote-side failures, malformed
//! payloads, submission failures and connection setup. [`AthenaError`] wraps
//! all of them for callers that do not care which one they got.

use crate::query::LifecycleState;
use std::fmt;
use thiserror::Error;

/// Top-level error type encompassing all possible errors.
#[derive(Error, Debug)]
pub enum AthenaError {
    /// Caller misuse of a cursor or connection
    #[error(transparent)]
    Programming(#[from] ProgrammingError),

    /// Remote-side failure or non-successful terminal state
    #[error(transparent)]
    Operational(#[from] OperationalError),

    /// Malformed payload from the remote service
    #[error(transparent)]
    Data(#[from] DataError),

    /// Unexpected failure while submitting a query
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Connection configuration or credential errors
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Errors caused by using the API in an invalid order or with invalid input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgrammingError {
    /// Fetch called before a successful execute
    #[error("No result set: execute a query that succeeds before fetching")]
    NoResultSet,

    /// Operation on a closed cursor or result set
    #[error("Cursor is closed")]
    CursorClosed,

    /// Cursor requested from a closed connection
    #[error("Connection is closed")]
    ConnectionClosed,

    /// Empty or whitespace-only SQL text
    #[error("Query text must not be empty")]
    EmptyQuery,

    /// Internal fetch attempted without a query id
    #[error("No query id available")]
    MissingQueryId,

    /// Execute called while the interrupt token is already cancelled
    #[error("Interrupt signal already fired; set a new token before executing")]
    InterruptFired,

    /// Invalid argument passed to a cursor operation
    #[error("Invalid argument '{parameter}': {message}")]
    InvalidArgument { parameter: String, message: String },
}

/// Errors reported by, or about, the remote query engine.
#[derive(Error, Debug)]
pub enum OperationalError {
    /// A remote call failed at the transport level
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    /// The query reached FAILED or CANCELLED
    #[error("Query {query_id} {state}: {}", .reason.as_deref().unwrap_or("no reason given"))]
    QueryFailed {
        query_id: String,
        state: LifecycleState,
        reason: Option<String>,
    },

    /// The query did not reach a terminal state within the connection timeout
    #[error("Query {query_id} timed out after {timeout_secs}s and was stopped")]
    TimedOut { query_id: String, timeout_secs: u64 },

    /// Polling was interrupted by an external cancellation signal
    #[error("Query {query_id} interrupted while polling (last state: {})", .state.as_ref().map(ToString::to_string).unwrap_or_else(|| "unknown".to_string()))]
    Interrupted {
        query_id: String,
        state: Option<LifecycleState>,
    },
}

/// Errors caused by a response that does not match the expected shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// A required section of the response is absent
    #[error("Malformed response: missing {0}")]
    MissingSection(&'static str),

    /// The lifecycle state string is not one we know
    #[error("Malformed response: unknown query state '{0}'")]
    UnknownState(String),

    /// A row has a different number of values than there are columns
    #[error("Malformed response: row {row} has {actual} values, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A value could not be converted to its declared type
    #[error("Failed to convert value at row {row}, column '{column}': {message}")]
    Conversion {
        row: usize,
        column: String,
        message: String,
    },
}

/// Catch-all for unexpected failures while submitting a query.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// StartQuery could not be completed
    #[error("Failed to submit query: {source}")]
    SubmitFailed {
        #[source]
        source: TransportError,
    },
}

/// Errors related to connection configuration and credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Invalid connection parameters
    #[error("Invalid connection parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Connection string parsing error
    #[error("Failed to parse connection string: {0}")]
    ParseError(String),

    /// Role assumption failed
    #[error("Failed to assume role {role_arn}: {message}")]
    Credentials { role_arn: String, message: String },
}

/// Errors returned by a [`QueryServiceClient`](crate::transport::QueryServiceClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The service rejected the request
    #[error("Service error {code}: {message}")]
    Service { code: String, message: String },

    /// The service throttled the request
    #[error("Request throttled: {0}")]
    Throttled(String),

    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Network(String),

    /// Request or response (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of every error, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller misuse
    Programming,
    /// Remote failure or non-successful terminal state
    Operational,
    /// Malformed payload
    Data,
    /// Submission failure
    Database,
    /// Connection setup
    Connection,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Programming => write!(f, "PROGRAMMING"),
            ErrorKind::Operational => write!(f, "OPERATIONAL"),
            ErrorKind::Data => write!(f, "DATA"),
            ErrorKind::Database => write!(f, "DATABASE"),
            ErrorKind::Connection => write!(f, "CONNECTION"),
        }
    }
}

impl AthenaError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AthenaError::Programming(_) => ErrorKind::Programming,
            AthenaError::Operational(_) => ErrorKind::Operational,
            AthenaError::Data(_) => ErrorKind::Data,
            AthenaError::Database(_) => ErrorKind::Database,
            AthenaError::Connection(_) => ErrorKind::Connection,
        }
    }

    /// True when the query was stopped because it exceeded the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AthenaError::Operational(e) if e.is_timeout())
    }
}

impl OperationalError {
    /// True for the local timeout path.
    pub fn is_timeout(&self) -> bool {
        matches!(self, OperationalError::TimedOut { .. })
    }

    /// Query id this error refers to, if any.
    pub fn query_id(&self) -> Option<&str> {
        match self {
            OperationalError::Transport { .. } => None,
            OperationalError::QueryFailed { query_id, .. }
            | OperationalError::TimedOut { query_id, .. }
            | OperationalError::Interrupted { query_id, .. } => Some(query_id),
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Serialization(err.to_string())
    }
}
