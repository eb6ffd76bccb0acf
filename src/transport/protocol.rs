//! Query service client abstraction.
//!
//! The service separates submission from result retrieval: a query is
//! started, its execution is polled, and its results are read page by page.
//! `QueryServiceClient` exposes exactly those four calls. Implementations
//! own signing, retries and HTTP; the cursor layer never retries.

use crate::error::TransportError;
use async_trait::async_trait;

use super::messages::{
    GetQueryExecutionResponse, GetQueryResultsRequest, GetQueryResultsResponse,
    StartQueryRequest, StartQueryResponse,
};

/// Remote procedure calls of the query service.
///
/// Receivers are `&self` so that one authenticated client can be shared by
/// every cursor of a connection.
#[async_trait]
pub trait QueryServiceClient: Send + Sync {
    /// Submit a query for execution.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the request could not be completed.
    async fn start_query(
        &self,
        request: &StartQueryRequest,
    ) -> Result<StartQueryResponse, TransportError>;

    /// Fetch the current execution snapshot of a query.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the request could not be completed.
    async fn get_query_execution(
        &self,
        query_id: &str,
    ) -> Result<GetQueryExecutionResponse, TransportError>;

    /// Fetch one page of results of a succeeded query.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the request could not be completed.
    async fn get_query_results(
        &self,
        request: &GetQueryResultsRequest,
    ) -> Result<GetQueryResultsResponse, TransportError>;

    /// Ask the service to stop a running query.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the request could not be completed.
    async fn stop_query(&self, query_id: &str) -> Result<(), TransportError>;
}

/// Service operation names, used in errors and logs.
pub mod operation {
    pub const START_QUERY: &str = "StartQueryExecution";
    pub const GET_QUERY_EXECUTION: &str = "GetQueryExecution";
    pub const GET_QUERY_RESULTS: &str = "GetQueryResults";
    pub const STOP_QUERY: &str = "StopQueryExecution";
}
