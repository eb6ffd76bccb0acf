//! Test doubles for the query service client.

use super::messages::{
    ColumnInfo, GetQueryExecutionResponse, GetQueryResultsRequest, GetQueryResultsResponse,
    QueryExecution, QueryExecutionStatus, ResultSet, ResultSetMetadata, Row, StartQueryRequest,
    StartQueryResponse,
};
use super::QueryServiceClient;
use crate::error::TransportError;
use async_trait::async_trait;
use mockall::mock;

mock! {
    pub Client {}

    #[async_trait]
    impl QueryServiceClient for Client {
        async fn start_query(&self, request: &StartQueryRequest) -> Result<StartQueryResponse, TransportError>;
        async fn get_query_execution(&self, query_id: &str) -> Result<GetQueryExecutionResponse, TransportError>;
        async fn get_query_results(&self, request: &GetQueryResultsRequest) -> Result<GetQueryResultsResponse, TransportError>;
        async fn stop_query(&self, query_id: &str) -> Result<(), TransportError>;
    }
}

/// Poll response in the given state.
pub fn execution(query_id: &str, state: &str, reason: Option<&str>) -> GetQueryExecutionResponse {
    GetQueryExecutionResponse {
        query_execution: Some(QueryExecution {
            query_execution_id: Some(query_id.to_string()),
            query: Some("SELECT 1".to_string()),
            status: Some(QueryExecutionStatus {
                state: Some(state.to_string()),
                state_change_reason: reason.map(str::to_string),
            }),
            ..Default::default()
        }),
    }
}

/// Results page over varchar columns.
pub fn page(columns: &[&str], rows: &[&[&str]], next_token: Option<&str>) -> GetQueryResultsResponse {
    GetQueryResultsResponse {
        result_set: Some(ResultSet {
            rows: Some(rows.iter().map(|r| Row::from_values(r.iter().copied())).collect()),
            result_set_metadata: Some(ResultSetMetadata {
                column_info: Some(
                    columns
                        .iter()
                        .map(|name| ColumnInfo::new(*name, "varchar"))
                        .collect(),
                ),
            }),
        }),
        next_token: next_token.map(str::to_string),
        update_count: None,
    }
}
