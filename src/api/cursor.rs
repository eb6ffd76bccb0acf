//! Query cursor: one query's lifecycle from submission to result consumption.
//!
//! `execute` submits the SQL, polls until the query reaches a terminal state
//! and, on success, opens a paginated result stream that the `fetch_*`
//! methods drain.
//!
//! ```text
//! Idle -> Submitted -> Polling -> Succeeded | Failed | Cancelled | TimedOut | Interrupted
//! ```

use crate::arrow_conversion::ArrowConverter;
use crate::connection::ConnectionParams;
use crate::error::{AthenaError, DataError, DatabaseError, OperationalError, ProgrammingError};
use crate::query::{
    poll_until_terminal, ColumnDescriptor, LifecycleState, PollOutcome, PollPolicy,
    QueryExecutionState, ResultSetCursor, Row, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::transport::{operation, QueryServiceClient, StartQueryRequest};
use arrow::record_batch::RecordBatch;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where a cursor is in its query lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorState {
    /// Nothing submitted yet
    Idle,
    /// StartQuery accepted, polling not started
    Submitted,
    /// Waiting for a terminal state
    Polling,
    Succeeded,
    Failed,
    Cancelled,
    /// Stopped locally after exceeding the timeout
    TimedOut,
    /// Polling ended by the interrupt token
    Interrupted,
}

impl CursorState {
    /// True once `execute` has returned for good.
    pub fn is_finished(&self) -> bool {
        !matches!(
            self,
            CursorState::Idle | CursorState::Submitted | CursorState::Polling
        )
    }
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CursorState::Idle => "IDLE",
            CursorState::Submitted => "SUBMITTED",
            CursorState::Polling => "POLLING",
            CursorState::Succeeded => "SUCCEEDED",
            CursorState::Failed => "FAILED",
            CursorState::Cancelled => "CANCELLED",
            CursorState::TimedOut => "TIMED_OUT",
            CursorState::Interrupted => "INTERRUPTED",
        };
        f.write_str(name)
    }
}

/// Per-cursor settings.
#[derive(Debug, Clone)]
pub struct CursorOptions {
    /// Wait between two polls
    pub poll_interval: Duration,
    /// Stop the remote query when the interrupt token fires
    pub cancel_on_interrupt: bool,
    /// Rows requested per result page
    pub page_size: u32,
    /// Row count returned by [`QueryCursor::fetch_batch`]
    pub array_size: usize,
    /// External cancellation signal for the poll loop
    pub interrupt: Option<CancellationToken>,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            cancel_on_interrupt: true,
            page_size: DEFAULT_PAGE_SIZE,
            array_size: 1,
            interrupt: None,
        }
    }
}

impl CursorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_cancel_on_interrupt(mut self, cancel: bool) -> Self {
        self.cancel_on_interrupt = cancel;
        self
    }

    /// Set the page size, clamped to the service's 1..=1000.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_array_size(mut self, array_size: usize) -> Self {
        self.array_size = array_size;
        self
    }

    pub fn with_interrupt(mut self, token: CancellationToken) -> Self {
        self.interrupt = Some(token);
        self
    }

    /// Check the options before a cursor uses them.
    pub fn validate(&self) -> Result<(), ProgrammingError> {
        if self.poll_interval.is_zero() {
            return Err(invalid_argument(
                "poll_interval",
                "Poll interval must be greater than 0",
            ));
        }
        if self.array_size == 0 {
            return Err(invalid_argument("array_size", "Array size must be at least 1"));
        }
        Ok(())
    }
}

fn invalid_argument(parameter: &str, message: &str) -> ProgrammingError {
    ProgrammingError::InvalidArgument {
        parameter: parameter.to_string(),
        message: message.to_string(),
    }
}

/// Cursor driving a single query at a time.
///
/// Created by [`Connection::cursor`](crate::Connection::cursor). A cursor may
/// run any number of queries sequentially; each `execute` discards the
/// previous query's results.
///
/// # Example
///
/// ```no_run
/// # use athena_cursor::Connection;
/// # async fn example(connection: &Connection) -> Result<(), athena_cursor::AthenaError> {
/// let mut cursor = connection.cursor().await?;
/// cursor.execute("SELECT id, name FROM users").await?;
///
/// while let Some(row) = cursor.fetch_one().await? {
///     println!("{:?}", row.get_by_name("name"));
/// }
///
/// cursor.close();
/// # Ok(())
/// # }
/// ```
pub struct QueryCursor {
    client: Arc<dyn QueryServiceClient>,
    params: Arc<ConnectionParams>,
    options: CursorOptions,
    state: CursorState,
    query_id: Option<String>,
    execution: Option<QueryExecutionState>,
    result_set: Option<ResultSetCursor>,
    closed: bool,
}

impl fmt::Debug for QueryCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCursor")
            .field("state", &self.state)
            .field("query_id", &self.query_id)
            .field("result_set", &self.result_set)
            .field("closed", &self.closed)
            .finish()
    }
}

impl QueryCursor {
    pub(crate) fn new(
        client: Arc<dyn QueryServiceClient>,
        params: Arc<ConnectionParams>,
        options: CursorOptions,
    ) -> Self {
        Self {
            client,
            params,
            options,
            state: CursorState::Idle,
            query_id: None,
            execution: None,
            result_set: None,
            closed: false,
        }
    }

    /// Submit `sql` and wait until it reaches a terminal state.
    ///
    /// On success the first result page is fetched and rows become
    /// available through the `fetch_*` methods.
    ///
    /// # Errors
    ///
    /// - `ProgrammingError::CursorClosed` / `EmptyQuery` before anything is sent
    /// - `ProgrammingError::InterruptFired` when the interrupt token has already
    ///   fired; nothing is submitted
    /// - `DatabaseError::SubmitFailed` when StartQuery fails
    /// - `OperationalError::QueryFailed` for FAILED and CANCELLED
    /// - `OperationalError::TimedOut` when the connection timeout expires
    /// - `OperationalError::Interrupted` when the interrupt token fires
    /// - `OperationalError::Transport` / `DataError` when a poll or the first
    ///   page fetch fails
    pub async fn execute(&mut self, sql: &str) -> Result<(), AthenaError> {
        self.ensure_open()?;
        if sql.trim().is_empty() {
            return Err(ProgrammingError::EmptyQuery.into());
        }
        if self
            .options
            .interrupt
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(ProgrammingError::InterruptFired.into());
        }

        self.reset();

        let request = StartQueryRequest::new(sql, self.params.catalog.as_str())
            .with_database(self.params.schema.clone())
            .with_work_group(self.params.workgroup.clone())
            .with_output_location(self.params.output_location.clone());

        let response = self
            .client
            .start_query(&request)
            .await
            .map_err(|source| DatabaseError::SubmitFailed { source })?;

        let query_id = response.query_execution_id;
        if query_id.is_empty() {
            return Err(DataError::MissingSection("QueryExecutionId").into());
        }

        info!(
            query_id = %query_id,
            catalog = %self.params.catalog,
            workgroup = ?self.params.workgroup,
            "Query submitted"
        );
        self.query_id = Some(query_id.clone());
        self.state = CursorState::Submitted;

        let policy = PollPolicy {
            interval: self.options.poll_interval,
            timeout: self.params.timeout,
            cancel_on_interrupt: self.options.cancel_on_interrupt,
            interrupt: self.options.interrupt.clone(),
        };

        self.state = CursorState::Polling;
        let outcome = poll_until_terminal(self.client.as_ref(), &query_id, &policy).await?;

        match outcome {
            PollOutcome::Terminal(snapshot) => self.finish(query_id, snapshot).await,
            PollOutcome::TimedOut { last } => {
                self.state = CursorState::TimedOut;
                self.execution = last;
                Err(OperationalError::TimedOut {
                    query_id,
                    timeout_secs: self.params.timeout.as_secs(),
                }
                .into())
            }
            PollOutcome::Interrupted { state } => {
                self.state = CursorState::Interrupted;
                let lifecycle = state.as_ref().map(QueryExecutionState::state);
                self.execution = state;
                Err(OperationalError::Interrupted {
                    query_id,
                    state: lifecycle,
                }
                .into())
            }
        }
    }

    async fn finish(
        &mut self,
        query_id: String,
        snapshot: QueryExecutionState,
    ) -> Result<(), AthenaError> {
        let state = snapshot.state();
        let reason = snapshot.state_change_reason().map(str::to_string);
        self.execution = Some(snapshot);

        match state {
            LifecycleState::Succeeded => {
                self.state = CursorState::Succeeded;
                let result_set = ResultSetCursor::open(
                    Arc::clone(&self.client),
                    query_id,
                    self.options.page_size,
                )
                .await?;
                self.result_set = Some(result_set);
                Ok(())
            }
            LifecycleState::Failed | LifecycleState::Cancelled => {
                self.state = if state == LifecycleState::Failed {
                    CursorState::Failed
                } else {
                    CursorState::Cancelled
                };
                info!(query_id = %query_id, state = %state, reason = ?reason, "Query did not succeed");
                Err(OperationalError::QueryFailed {
                    query_id,
                    state,
                    reason,
                }
                .into())
            }
            // The poller only returns terminal snapshots.
            LifecycleState::Queued | LifecycleState::Running => {
                Err(DataError::UnknownState(state.to_string()).into())
            }
        }
    }

    /// Next row, or `None` when the result is exhausted.
    pub async fn fetch_one(&mut self) -> Result<Option<Row>, AthenaError> {
        self.result_set_mut()?.next_row().await
    }

    /// Up to `size` rows; fewer only at the end of the result.
    pub async fn fetch_many(&mut self, size: usize) -> Result<Vec<Row>, AthenaError> {
        self.result_set_mut()?.fetch_many(size).await
    }

    /// `array_size` rows, see [`CursorOptions::array_size`].
    pub async fn fetch_batch(&mut self) -> Result<Vec<Row>, AthenaError> {
        let size = self.options.array_size;
        self.fetch_many(size).await
    }

    /// All remaining rows.
    pub async fn fetch_all(&mut self) -> Result<Vec<Row>, AthenaError> {
        self.result_set_mut()?.fetch_all().await
    }

    /// All remaining rows as one Arrow batch typed after the declared columns.
    ///
    /// Rows are only consumed once the batch is built; after a conversion
    /// error they can still be fetched as text.
    pub async fn fetch_arrow(&mut self) -> Result<RecordBatch, AthenaError> {
        let result_set = self.result_set_mut()?;
        let converter = ArrowConverter::new(result_set.description());
        let rows = result_set.fetch_all().await?;

        match converter.convert(&rows) {
            Ok(batch) => Ok(batch),
            Err(e) => {
                result_set.unread(rows);
                Err(e.into())
            }
        }
    }

    /// Ask the service to stop the current query.
    ///
    /// This is the only way besides timeout and interrupt to stop a remote
    /// query; [`close`](Self::close) never does.
    pub async fn cancel(&mut self) -> Result<(), AthenaError> {
        let query_id = self
            .query_id
            .as_deref()
            .ok_or(ProgrammingError::MissingQueryId)?;

        self.client
            .stop_query(query_id)
            .await
            .map_err(|source| OperationalError::Transport {
                operation: operation::STOP_QUERY,
                source,
            })?;

        info!(query_id = %query_id, "Query cancelled by caller");
        Ok(())
    }

    /// Release the result stream. Idempotent; never stops the remote query.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Some(result_set) = self.result_set.as_mut() {
            result_set.close();
        }
        self.result_set = None;
        self.closed = true;
        debug!(query_id = ?self.query_id, state = %self.state, "Cursor closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Id of the most recently submitted query.
    pub fn query_id(&self) -> Option<&str> {
        self.query_id.as_deref()
    }

    /// Last observed execution snapshot.
    pub fn execution(&self) -> Option<&QueryExecutionState> {
        self.execution.as_ref()
    }

    pub fn cursor_state(&self) -> CursorState {
        self.state
    }

    /// Result columns, once a query has succeeded.
    pub fn description(&self) -> Option<&[ColumnDescriptor]> {
        self.result_set.as_ref().map(ResultSetCursor::description)
    }

    /// Rows surfaced by the current result so far.
    pub fn row_number(&self) -> Option<u64> {
        self.result_set.as_ref().map(ResultSetCursor::rows_returned)
    }

    /// Affected rows reported for DML statements.
    pub fn row_count(&self) -> Option<i64> {
        self.result_set.as_ref().and_then(ResultSetCursor::update_count)
    }

    pub fn array_size(&self) -> usize {
        self.options.array_size
    }

    pub fn set_array_size(&mut self, array_size: usize) -> Result<(), ProgrammingError> {
        if array_size == 0 {
            return Err(invalid_argument("array_size", "Array size must be at least 1"));
        }
        self.options.array_size = array_size;
        Ok(())
    }

    pub fn options(&self) -> &CursorOptions {
        &self.options
    }

    /// Replace the interrupt token, e.g. with a fresh one after an interrupt.
    pub fn set_interrupt(&mut self, token: Option<CancellationToken>) {
        self.options.interrupt = token;
    }

    fn reset(&mut self) {
        if let Some(mut result_set) = self.result_set.take() {
            result_set.close();
        }
        self.query_id = None;
        self.execution = None;
        self.state = CursorState::Idle;
    }

    fn ensure_open(&self) -> Result<(), ProgrammingError> {
        if self.closed {
            Err(ProgrammingError::CursorClosed)
        } else {
            Ok(())
        }
    }

    fn result_set_mut(&mut self) -> Result<&mut ResultSetCursor, ProgrammingError> {
        self.ensure_open()?;
        self.result_set.as_mut().ok_or(ProgrammingError::NoResultSet)
    }
}
