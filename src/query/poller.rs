//! Poll loop driving a submitted query to a terminal state.
//!
//! The loop waits on three things at once, in priority order: the external
//! interrupt token, the timeout deadline and the next poll (preceded by the
//! poll interval after the first attempt). Whichever fires first wins, so
//! neither timeout nor interrupt has to wait for a sleep to finish.

use super::execution::QueryExecutionState;
use crate::error::{AthenaError, OperationalError};
use crate::transport::{operation, QueryServiceClient};
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default wait between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default wall-clock budget for one query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3600);

/// How long and how often to poll.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Wait between two polls
    pub interval: Duration,
    /// Budget measured from the start of the loop
    pub timeout: Duration,
    /// Stop the remote query when interrupted
    pub cancel_on_interrupt: bool,
    /// External cancellation signal
    pub interrupt: Option<CancellationToken>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_QUERY_TIMEOUT,
            cancel_on_interrupt: true,
            interrupt: None,
        }
    }
}

/// How the poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The service reported SUCCEEDED, FAILED or CANCELLED
    Terminal(QueryExecutionState),
    /// The deadline passed first; the query was asked to stop
    TimedOut {
        /// Last non-terminal snapshot seen, if any
        last: Option<QueryExecutionState>,
    },
    /// The interrupt token fired
    Interrupted {
        /// Snapshot re-polled after stopping the query, if that happened
        state: Option<QueryExecutionState>,
    },
}

enum Step {
    Polled(Result<QueryExecutionState, AthenaError>),
    Deadline,
    Interrupted,
}

/// Poll `query_id` until it reaches a terminal state, the timeout expires or
/// the interrupt token fires.
///
/// On timeout exactly one `StopQuery` is issued. On interrupt with
/// `cancel_on_interrupt`, the query is stopped and polled once more. Failures
/// of those follow-up calls are logged and never replace the outcome.
///
/// # Errors
///
/// `OperationalError::Transport` if a poll fails, `DataError` if a poll
/// response is malformed. No poll is retried.
pub async fn poll_until_terminal(
    client: &dyn QueryServiceClient,
    query_id: &str,
    policy: &PollPolicy,
) -> Result<PollOutcome, AthenaError> {
    let started = Instant::now();
    let deadline = started + policy.timeout;
    let interrupt = policy.interrupt.clone().unwrap_or_else(CancellationToken::new);

    let mut last: Option<QueryExecutionState> = None;
    let mut attempts: u32 = 0;

    loop {
        let wait = if attempts == 0 {
            Duration::ZERO
        } else {
            policy.interval
        };

        let step = tokio::select! {
            biased;
            _ = interrupt.cancelled() => Step::Interrupted,
            _ = sleep_until(deadline) => Step::Deadline,
            result = async {
                sleep(wait).await;
                poll_once(client, query_id).await
            } => Step::Polled(result),
        };

        match step {
            Step::Polled(result) => {
                let snapshot = result?;
                attempts += 1;

                if last.as_ref().map(QueryExecutionState::state) != Some(snapshot.state()) {
                    debug!(
                        query_id = %query_id,
                        state = %snapshot.state(),
                        attempts,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Query state changed"
                    );
                }

                if snapshot.is_terminal() {
                    return Ok(PollOutcome::Terminal(snapshot));
                }
                last = Some(snapshot);
            }
            Step::Deadline => {
                warn!(
                    query_id = %query_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    timeout_secs = policy.timeout.as_secs(),
                    "Query exceeded timeout, stopping it"
                );
                stop_best_effort(client, query_id).await;
                return Ok(PollOutcome::TimedOut { last });
            }
            Step::Interrupted => {
                if !policy.cancel_on_interrupt {
                    info!(query_id = %query_id, "Polling interrupted, query left running");
                    return Ok(PollOutcome::Interrupted { state: None });
                }

                info!(query_id = %query_id, "Polling interrupted, stopping query");
                if !stop_best_effort(client, query_id).await {
                    return Ok(PollOutcome::Interrupted { state: None });
                }

                let state = match poll_once(client, query_id).await {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        warn!(query_id = %query_id, error = %e, "Re-poll after interrupt failed");
                        None
                    }
                };
                return Ok(PollOutcome::Interrupted { state });
            }
        }
    }
}

/// One `GetQueryExecution` round trip.
pub async fn poll_once(
    client: &dyn QueryServiceClient,
    query_id: &str,
) -> Result<QueryExecutionState, AthenaError> {
    let response = client
        .get_query_execution(query_id)
        .await
        .map_err(|source| OperationalError::Transport {
            operation: operation::GET_QUERY_EXECUTION,
            source,
        })?;

    Ok(QueryExecutionState::from_response(query_id, response)?)
}

async fn stop_best_effort(client: &dyn QueryServiceClient, query_id: &str) -> bool {
    match client.stop_query(query_id).await {
        Ok(()) => true,
        Err(e) => {
            warn!(query_id = %query_id, error = %e, "StopQuery failed");
            false
        }
    }
}
