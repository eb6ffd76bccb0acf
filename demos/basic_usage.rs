//! Basic usage example for athena-cursor.
//!
//! A real deployment supplies a `CredentialProvider` that assumes the role and
//! returns a signed service client. This example plugs in a local provider
//! whose client answers every query with the same small result, so it runs
//! without network access.

use async_trait::async_trait;
use athena_cursor::transport::messages::{
    from_json, GetQueryExecutionResponse, GetQueryResultsRequest, GetQueryResultsResponse,
    StartQueryRequest, StartQueryResponse,
};
use athena_cursor::{
    Connection, ConnectionError, CredentialProvider, QueryServiceClient, TransportError,
};
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const CONNECTION_STRING: &str =
    "athena://us-east-1?role=arn:aws:iam::123456789012:role/analyst&workgroup=primary&poll_interval=0.2";

const RESULTS: &str = r#"{
    "ResultSet": {
        "Rows": [
            {"Data": [{"VarCharValue": "id"}, {"VarCharValue": "name"}]},
            {"Data": [{"VarCharValue": "1"}, {"VarCharValue": "Alice"}]},
            {"Data": [{"VarCharValue": "2"}, {"VarCharValue": "Bob"}]},
            {"Data": [{"VarCharValue": "3"}, {}]}
        ],
        "ResultSetMetadata": {
            "ColumnInfo": [
                {"Name": "id", "Type": "integer", "Nullable": "NOT_NULL"},
                {"Name": "name", "Type": "varchar"}
            ]
        }
    }
}"#;

/// Client that reports RUNNING once per query, then SUCCEEDED.
#[derive(Default)]
struct LocalClient {
    polls: AtomicUsize,
}

#[async_trait]
impl QueryServiceClient for LocalClient {
    async fn start_query(
        &self,
        _request: &StartQueryRequest,
    ) -> Result<StartQueryResponse, TransportError> {
        self.polls.store(0, Ordering::SeqCst);
        Ok(StartQueryResponse {
            query_execution_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    async fn get_query_execution(
        &self,
        query_id: &str,
    ) -> Result<GetQueryExecutionResponse, TransportError> {
        let state = match self.polls.fetch_add(1, Ordering::SeqCst) {
            0 => "RUNNING",
            _ => "SUCCEEDED",
        };
        from_json(&format!(
            r#"{{"QueryExecution": {{"QueryExecutionId": "{}", "Status": {{"State": "{}"}}}}}}"#,
            query_id, state
        ))
    }

    async fn get_query_results(
        &self,
        _request: &GetQueryResultsRequest,
    ) -> Result<GetQueryResultsResponse, TransportError> {
        from_json(RESULTS)
    }

    async fn stop_query(&self, _query_id: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

struct LocalProvider;

#[async_trait]
impl CredentialProvider for LocalProvider {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_label: &str,
        region: &str,
    ) -> Result<Arc<dyn QueryServiceClient>, ConnectionError> {
        println!("Assuming {} as {} in {}", role_arn, session_label, region);
        Ok(Arc::new(LocalClient::default()))
    }
}

/// Reads rows one at a time, then in batches.
async fn example_cursor(connection: &Connection) -> Result<usize, Box<dyn Error>> {
    let mut cursor = connection.cursor().await?;
    cursor.execute("SELECT id, name FROM users ORDER BY id").await?;

    if let Some(row) = cursor.fetch_one().await? {
        println!("First row: {:?}", row);
    }

    cursor.set_array_size(2)?;
    let rest = cursor.fetch_batch().await?;
    for row in &rest {
        println!("id={:?} name={:?}", row.get_by_name("id"), row.get_by_name("name"));
    }

    let seen = cursor.row_number().unwrap_or(0) as usize;
    cursor.close();
    Ok(seen)
}

/// Collects a whole result into an Arrow batch.
async fn example_arrow(connection: &Connection) -> Result<usize, Box<dyn Error>> {
    let batch = connection.query_arrow("SELECT id, name FROM users").await?;
    println!("Arrow schema: {:?}", batch.schema());
    Ok(batch.num_rows())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let connection = Connection::from_connection_string(CONNECTION_STRING, Arc::new(LocalProvider))?;
    println!("Connection: {}", connection.params());

    let rows = example_cursor(&connection).await?;
    println!("Cursor: {} row(s)", rows);

    let rows = example_arrow(&connection).await?;
    println!("Arrow: {} row(s)", rows);

    connection.close();
    println!("Done");

    Ok(())
}
