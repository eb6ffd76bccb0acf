//! Transport boundary to the remote query service.
//!
//! # Architecture
//!
//! The transport layer is organized into:
//! - `protocol` - the `QueryServiceClient` trait implemented by RPC stubs
//! - `messages` - request and response bodies of the service API
//!
//! No concrete client lives here. Callers plug in their own stub, usually
//! produced by a [`CredentialProvider`](crate::connection::CredentialProvider).

pub mod messages;
pub mod protocol;

#[cfg(test)]
pub(crate) mod mock;

// Re-export commonly used types
pub use messages::{
    ColumnInfo, GetQueryExecutionResponse, GetQueryResultsRequest, GetQueryResultsResponse,
    StartQueryRequest, StartQueryResponse,
};
pub use protocol::{operation, QueryServiceClient};
