//! Wire message types for the query service API.
//!
//! These mirror the JSON bodies of the service's `StartQueryExecution`,
//! `GetQueryExecution`, `GetQueryResults` and `StopQueryExecution` calls.
//! Structural fields are optional so that decoding never fails on a missing
//! section; the `query` module validates them into domain types and reports
//! a `DataError` naming whatever is missing.

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Where a query runs: catalog and optional database (schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryExecutionContext {
    /// Data catalog name
    pub catalog: String,
    /// Database (schema) name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Result output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultConfiguration {
    /// Location the engine writes query results to
    pub output_location: String,
}

/// StartQueryExecution request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartQueryRequest {
    /// SQL text to execute
    pub query_string: String,
    /// Catalog and database
    pub query_execution_context: QueryExecutionContext,
    /// Workgroup (service default when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_group: Option<String>,
    /// Result output settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_configuration: Option<ResultConfiguration>,
    /// Idempotency token, one per submission
    pub client_request_token: String,
}

impl StartQueryRequest {
    /// Create a request for `sql` in `catalog` with a fresh request token.
    pub fn new(sql: impl Into<String>, catalog: impl Into<String>) -> Self {
        Self {
            query_string: sql.into(),
            query_execution_context: QueryExecutionContext {
                catalog: catalog.into(),
                database: None,
            },
            work_group: None,
            result_configuration: None,
            client_request_token: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Set the database (schema).
    pub fn with_database(mut self, database: Option<String>) -> Self {
        self.query_execution_context.database = database;
        self
    }

    /// Set the workgroup.
    pub fn with_work_group(mut self, work_group: Option<String>) -> Self {
        self.work_group = work_group;
        self
    }

    /// Set the output location.
    pub fn with_output_location(mut self, output_location: Option<String>) -> Self {
        self.result_configuration =
            output_location.map(|output_location| ResultConfiguration { output_location });
        self
    }
}

/// StartQueryExecution response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartQueryResponse {
    /// Id of the new query execution
    pub query_execution_id: String,
}

/// GetQueryExecution response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetQueryExecutionResponse {
    /// Execution snapshot
    pub query_execution: Option<QueryExecution>,
}

/// One query execution as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryExecution {
    /// Query execution id
    pub query_execution_id: Option<String>,
    /// Submitted SQL text
    pub query: Option<String>,
    /// DDL, DML or UTILITY
    pub statement_type: Option<String>,
    /// Lifecycle status
    pub status: Option<QueryExecutionStatus>,
    /// Runtime statistics
    pub statistics: Option<QueryExecutionStatistics>,
    /// Workgroup the query ran in
    pub work_group: Option<String>,
}

/// Lifecycle status of a query execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryExecutionStatus {
    /// QUEUED, RUNNING, SUCCEEDED, FAILED or CANCELLED
    pub state: Option<String>,
    /// Reason for the last state change
    pub state_change_reason: Option<String>,
}

/// Runtime statistics of a query execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryExecutionStatistics {
    pub engine_execution_time_in_millis: Option<i64>,
    pub data_scanned_in_bytes: Option<i64>,
    pub total_execution_time_in_millis: Option<i64>,
    pub query_queue_time_in_millis: Option<i64>,
}

/// GetQueryResults request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetQueryResultsRequest {
    /// Query execution id
    pub query_execution_id: String,
    /// Page size
    pub max_results: u32,
    /// Continuation token from the previous page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl GetQueryResultsRequest {
    /// Create a request for one page.
    pub fn new(query_execution_id: impl Into<String>, max_results: u32) -> Self {
        Self {
            query_execution_id: query_execution_id.into(),
            max_results,
            next_token: None,
        }
    }

    /// Continue from a previous page.
    pub fn with_next_token(mut self, next_token: Option<String>) -> Self {
        self.next_token = next_token;
        self
    }
}

/// GetQueryResults response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetQueryResultsResponse {
    /// Rows and metadata
    pub result_set: Option<ResultSet>,
    /// Continuation token, absent on the last page
    pub next_token: Option<String>,
    /// Affected rows for DML statements
    pub update_count: Option<i64>,
}

/// Rows plus metadata of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultSet {
    pub rows: Option<Vec<Row>>,
    pub result_set_metadata: Option<ResultSetMetadata>,
}

/// Column metadata container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultSetMetadata {
    pub column_info: Option<Vec<ColumnInfo>>,
}

/// Metadata of one output column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Declared SQL type, e.g. `varchar` or `decimal`
    #[serde(rename = "Type", default)]
    pub type_name: String,
    #[serde(default)]
    pub precision: i32,
    #[serde(default)]
    pub scale: i32,
    /// NOT_NULL, NULLABLE or UNKNOWN
    pub nullable: Option<String>,
    pub label: Option<String>,
    pub case_sensitive: Option<bool>,
}

impl ColumnInfo {
    /// Column with just a name and type.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            precision: 0,
            scale: 0,
            nullable: None,
            label: None,
            case_sensitive: None,
        }
    }
}

/// One raw row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Row {
    #[serde(default)]
    pub data: Vec<Datum>,
}

impl Row {
    /// Build a row of non-null values.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data: values
                .into_iter()
                .map(|v| Datum {
                    var_char_value: Some(v.into()),
                })
                .collect(),
        }
    }
}

/// One cell; a missing `VarCharValue` is SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Datum {
    pub var_char_value: Option<String>,
}

/// Decode a response body.
pub fn from_json<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, TransportError> {
    Ok(serde_json::from_str(body)?)
}
