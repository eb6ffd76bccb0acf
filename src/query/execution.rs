//! Query execution snapshots.
//!
//! A [`QueryExecutionState`] is built from one `GetQueryExecution` response
//! and never mutated afterwards; every poll produces a new one.

use crate::error::DataError;
use crate::transport::messages::{GetQueryExecutionResponse, QueryExecutionStatistics};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Lifecycle state of a remote query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Accepted, waiting for capacity
    Queued,
    /// Executing
    Running,
    /// Finished, results available
    Succeeded,
    /// Finished with an error
    Failed,
    /// Stopped before completion
    Cancelled,
}

impl LifecycleState {
    /// Check if no further transition can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Succeeded | LifecycleState::Failed | LifecycleState::Cancelled
        )
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Queued => "QUEUED",
            LifecycleState::Running => "RUNNING",
            LifecycleState::Succeeded => "SUCCEEDED",
            LifecycleState::Failed => "FAILED",
            LifecycleState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "QUEUED" => Ok(LifecycleState::Queued),
            "RUNNING" => Ok(LifecycleState::Running),
            "SUCCEEDED" => Ok(LifecycleState::Succeeded),
            "FAILED" => Ok(LifecycleState::Failed),
            "CANCELLED" => Ok(LifecycleState::Cancelled),
            _ => Err(DataError::UnknownState(s.to_string())),
        }
    }
}

/// Runtime statistics reported alongside an execution snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStatistics {
    /// Time spent executing in the engine
    pub engine_execution_time: Option<Duration>,
    /// Bytes read by the query
    pub data_scanned_bytes: Option<u64>,
    /// Wall time from submission to completion
    pub total_execution_time: Option<Duration>,
    /// Time spent queued
    pub queue_time: Option<Duration>,
}

impl From<&QueryExecutionStatistics> for QueryStatistics {
    fn from(stats: &QueryExecutionStatistics) -> Self {
        let millis = |v: Option<i64>| {
            v.and_then(|ms| u64::try_from(ms).ok())
                .map(Duration::from_millis)
        };

        Self {
            engine_execution_time: millis(stats.engine_execution_time_in_millis),
            data_scanned_bytes: stats
                .data_scanned_in_bytes
                .and_then(|b| u64::try_from(b).ok()),
            total_execution_time: millis(stats.total_execution_time_in_millis),
            queue_time: millis(stats.query_queue_time_in_millis),
        }
    }
}

/// Immutable snapshot of one remote query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExecutionState {
    query_id: String,
    query_text: String,
    state: LifecycleState,
    state_change_reason: Option<String>,
    statement_type: Option<String>,
    statistics: QueryStatistics,
}

impl QueryExecutionState {
    /// Create a snapshot directly.
    ///
    /// The reason is kept only for FAILED and CANCELLED.
    pub fn new(
        query_id: impl Into<String>,
        query_text: impl Into<String>,
        state: LifecycleState,
        state_change_reason: Option<String>,
    ) -> Self {
        let state_change_reason = match state {
            LifecycleState::Failed | LifecycleState::Cancelled => state_change_reason,
            _ => None,
        };

        Self {
            query_id: query_id.into(),
            query_text: query_text.into(),
            state,
            state_change_reason,
            statement_type: None,
            statistics: QueryStatistics::default(),
        }
    }

    /// Validate a poll response.
    ///
    /// `requested_id` is used when the response omits the execution id.
    ///
    /// # Errors
    ///
    /// Returns `DataError` if the execution or its state is missing, or the
    /// state is not recognized.
    pub fn from_response(
        requested_id: &str,
        response: GetQueryExecutionResponse,
    ) -> Result<Self, DataError> {
        let execution = response
            .query_execution
            .ok_or(DataError::MissingSection("QueryExecution"))?;

        let status = execution
            .status
            .ok_or(DataError::MissingSection("QueryExecution.Status"))?;

        let state: LifecycleState = status
            .state
            .as_deref()
            .ok_or(DataError::MissingSection("QueryExecution.Status.State"))?
            .parse()?;

        let mut snapshot = Self::new(
            execution
                .query_execution_id
                .unwrap_or_else(|| requested_id.to_string()),
            execution.query.unwrap_or_default(),
            state,
            status.state_change_reason,
        );
        snapshot.statement_type = execution.statement_type;
        snapshot.statistics = execution
            .statistics
            .as_ref()
            .map(QueryStatistics::from)
            .unwrap_or_default();

        Ok(snapshot)
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Engine-provided reason; only present for FAILED and CANCELLED.
    pub fn state_change_reason(&self) -> Option<&str> {
        self.state_change_reason.as_deref()
    }

    /// DDL, DML or UTILITY, when reported.
    pub fn statement_type(&self) -> Option<&str> {
        self.statement_type.as_deref()
    }

    pub fn statistics(&self) -> &QueryStatistics {
        &self.statistics
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
