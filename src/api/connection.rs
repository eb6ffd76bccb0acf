//! Connection: configuration plus a lazily created, shared service client.
//!
//! The client is created on first use by assuming the configured role and
//! then reused by every cursor of the connection.

use super::cursor::{CursorOptions, QueryCursor};
use crate::connection::{
    session_label, ConnectionParams, CredentialProvider, StaticCredentialProvider,
};
use crate::error::{AthenaError, ConnectionError, ProgrammingError};
use crate::query::Row;
use crate::transport::QueryServiceClient;
use arrow::record_batch::RecordBatch;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Connection to the query service.
///
/// # Example
///
/// ```no_run
/// use athena_cursor::{Connection, ConnectionParams, CredentialProvider};
/// use std::sync::Arc;
///
/// # async fn example(provider: Arc<dyn CredentialProvider>) -> Result<(), Box<dyn std::error::Error>> {
/// let connection = Connection::from_connection_string(
///     "athena://us-east-1?role=arn:aws:iam::123456789012:role/analyst&workgroup=primary",
///     provider,
/// )?;
///
/// let rows = connection.query("SELECT 1").await?;
/// println!("{:?}", rows);
///
/// connection.close();
/// # Ok(())
/// # }
/// ```
pub struct Connection {
    params: Arc<ConnectionParams>,
    provider: Arc<dyn CredentialProvider>,
    client: OnceCell<Arc<dyn QueryServiceClient>>,
    closed: AtomicBool,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("params", &self.params)
            .field("client_initialized", &self.client.initialized())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Connection {
    /// Create a connection whose client is obtained from `provider` on first use.
    pub fn new(params: ConnectionParams, provider: Arc<dyn CredentialProvider>) -> Self {
        Self {
            params: Arc::new(params),
            provider,
            client: OnceCell::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a connection around an already authenticated client.
    pub fn with_client(params: ConnectionParams, client: Arc<dyn QueryServiceClient>) -> Self {
        Self {
            params: Arc::new(params),
            provider: Arc::new(StaticCredentialProvider::new(Arc::clone(&client))),
            client: OnceCell::new_with(Some(client)),
            closed: AtomicBool::new(false),
        }
    }

    /// Parse `connection_string` and create a connection.
    pub fn from_connection_string(
        connection_string: &str,
        provider: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ConnectionError> {
        let params = ConnectionParams::from_str(connection_string)?;
        Ok(Self::new(params, provider))
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// The shared service client, created on first call.
    ///
    /// Concurrent first calls assume the role only once. A failed attempt
    /// leaves the connection uninitialized so a later call can retry.
    ///
    /// # Errors
    ///
    /// `ConnectionError::Credentials` (or whatever the provider returns)
    /// when the role cannot be assumed.
    pub async fn client(&self) -> Result<Arc<dyn QueryServiceClient>, ConnectionError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                let label = session_label(&self.params.session_name);
                let client = self
                    .provider
                    .assume_role(&self.params.role_arn, &label, &self.params.region)
                    .await?;
                info!(
                    role_arn = %self.params.role_arn,
                    region = %self.params.region,
                    session = %label,
                    "Assumed role for query service"
                );
                Ok::<_, ConnectionError>(client)
            })
            .await?;

        Ok(Arc::clone(client))
    }

    /// New cursor with options derived from the connection parameters.
    pub async fn cursor(&self) -> Result<QueryCursor, AthenaError> {
        let options = CursorOptions::default().with_poll_interval(self.params.poll_interval);
        self.cursor_with(options).await
    }

    /// New cursor with explicit options.
    pub async fn cursor_with(&self, options: CursorOptions) -> Result<QueryCursor, AthenaError> {
        self.ensure_open()?;
        options.validate()?;

        let client = self.client().await?;
        debug!(poll_interval_ms = options.poll_interval.as_millis() as u64, "Created cursor");
        Ok(QueryCursor::new(client, Arc::clone(&self.params), options))
    }

    /// Execute `sql` on a fresh cursor and return it, ready to fetch.
    pub async fn execute(&self, sql: &str) -> Result<QueryCursor, AthenaError> {
        let mut cursor = self.cursor().await?;
        cursor.execute(sql).await?;
        Ok(cursor)
    }

    /// Execute `sql` and collect every row.
    pub async fn query(&self, sql: &str) -> Result<Vec<Row>, AthenaError> {
        let mut cursor = self.execute(sql).await?;
        let rows = cursor.fetch_all().await;
        cursor.close();
        rows
    }

    /// Execute `sql` and collect every row into one Arrow batch.
    pub async fn query_arrow(&self, sql: &str) -> Result<RecordBatch, AthenaError> {
        let mut cursor = self.execute(sql).await?;
        let batch = cursor.fetch_arrow().await;
        cursor.close();
        batch
    }

    /// Execute a DML statement and return the affected row count, if reported.
    pub async fn execute_update(&self, sql: &str) -> Result<Option<i64>, AthenaError> {
        let mut cursor = self.execute(sql).await?;
        let count = cursor.row_count();
        cursor.close();
        Ok(count)
    }

    /// Mark the connection closed. Cursors already created keep working.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(role_arn = %self.params.role_arn, "Connection closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), ProgrammingError> {
        if self.is_closed() {
            Err(ProgrammingError::ConnectionClosed)
        } else {
            Ok(())
        }
    }
}
