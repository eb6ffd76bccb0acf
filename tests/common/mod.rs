//! Common test utilities for athena-cursor integration tests.
//!
//! The tests drive the public API against [`ScriptedClient`], an in-memory
//! query service whose poll states and result pages are fixed up front. It
//! records every call so tests can assert on what was sent.

#![allow(dead_code)]

use async_trait::async_trait;
use athena_cursor::connection::ConnectionBuilder;
use athena_cursor::transport::messages::{
    ColumnInfo, Datum, GetQueryExecutionResponse, GetQueryResultsRequest,
    GetQueryResultsResponse, QueryExecution, QueryExecutionStatus, ResultSet, ResultSetMetadata,
    Row, StartQueryRequest, StartQueryResponse,
};
use athena_cursor::{
    Connection, ConnectionError, ConnectionParams, CredentialProvider, QueryServiceClient,
    TransportError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ROLE: &str = "arn:aws:iam::123456789012:role/analyst";

/// Install a test subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Connection parameters with the given timeout.
pub fn params(timeout: Duration) -> ConnectionParams {
    ConnectionBuilder::new()
        .role_arn(ROLE)
        .region("us-east-1")
        .workgroup("primary")
        .timeout(timeout)
        .poll_interval(Duration::from_secs(1))
        .build()
        .expect("valid test parameters")
}

/// Connection around `client` with a one hour timeout.
pub fn connect(client: &Arc<ScriptedClient>) -> Connection {
    Connection::with_client(
        params(Duration::from_secs(3600)),
        Arc::clone(client) as Arc<dyn QueryServiceClient>,
    )
}

/// One result page in wire form.
pub fn page(
    columns: &[(&str, &str)],
    rows: &[&[Option<&str>]],
    next_token: Option<&str>,
) -> GetQueryResultsResponse {
    GetQueryResultsResponse {
        result_set: Some(ResultSet {
            rows: Some(
                rows.iter()
                    .map(|r| Row {
                        data: r
                            .iter()
                            .map(|v| Datum {
                                var_char_value: v.map(str::to_string),
                            })
                            .collect(),
                    })
                    .collect(),
            ),
            result_set_metadata: Some(ResultSetMetadata {
                column_info: Some(
                    columns
                        .iter()
                        .map(|(name, type_name)| ColumnInfo::new(*name, *type_name))
                        .collect(),
                ),
            }),
        }),
        next_token: next_token.map(str::to_string),
        update_count: None,
    }
}

/// Varchar page of non-null values.
pub fn text_page(
    columns: &[&str],
    rows: &[&[&str]],
    next_token: Option<&str>,
) -> GetQueryResultsResponse {
    let columns: Vec<(&str, &str)> = columns.iter().map(|c| (*c, "varchar")).collect();
    let rows: Vec<Vec<Option<&str>>> = rows
        .iter()
        .map(|r| r.iter().map(|v| Some(*v)).collect())
        .collect();
    let rows: Vec<&[Option<&str>]> = rows.iter().map(Vec::as_slice).collect();
    page(&columns, &rows, next_token)
}

#[derive(Default)]
struct Script {
    states: VecDeque<(String, Option<String>)>,
    pages: HashMap<Option<String>, VecDeque<GetQueryResultsResponse>>,
    submitted: Vec<StartQueryRequest>,
    page_requests: Vec<GetQueryResultsRequest>,
    fail_polls: bool,
    failing_tokens: HashMap<Option<String>, usize>,
}

/// In-memory query service following a fixed script.
///
/// Poll states are consumed in order and the last one repeats. Pages are
/// keyed by the continuation token that requests them; several pages under
/// one token are served in order, the last one repeating.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<Script>,
    starts: AtomicUsize,
    polls: AtomicUsize,
    fetches: AtomicUsize,
    stops: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll states, e.g. `["QUEUED", "RUNNING", "SUCCEEDED"]`.
    pub fn with_states(self, states: &[&str]) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.states = states.iter().map(|s| (s.to_string(), None)).collect();
        }
        self
    }

    /// Terminal state with a reason, after `before` non-terminal polls.
    pub fn with_terminal(self, before: &[&str], state: &str, reason: &str) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.states = before.iter().map(|s| (s.to_string(), None)).collect();
            script
                .states
                .push_back((state.to_string(), Some(reason.to_string())));
        }
        self
    }

    /// Serve `response` when `token` is requested.
    pub fn with_page(self, token: Option<&str>, response: GetQueryResultsResponse) -> Self {
        self.script
            .lock()
            .unwrap()
            .pages
            .entry(token.map(str::to_string))
            .or_default()
            .push_back(response);
        self
    }

    /// Throttle the next request for `token` once before serving its page.
    pub fn with_failing_page(self, token: Option<&str>) -> Self {
        *self
            .script
            .lock()
            .unwrap()
            .failing_tokens
            .entry(token.map(str::to_string))
            .or_default() += 1;
        self
    }

    /// Make every poll fail at the transport level.
    pub fn with_failing_polls(self) -> Self {
        self.script.lock().unwrap().fail_polls = true;
        self
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<StartQueryRequest> {
        self.script.lock().unwrap().submitted.clone()
    }

    pub fn page_requests(&self) -> Vec<GetQueryResultsRequest> {
        self.script.lock().unwrap().page_requests.clone()
    }
}

#[async_trait]
impl QueryServiceClient for ScriptedClient {
    async fn start_query(
        &self,
        request: &StartQueryRequest,
    ) -> Result<StartQueryResponse, TransportError> {
        let n = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
        self.script.lock().unwrap().submitted.push(request.clone());
        Ok(StartQueryResponse {
            query_execution_id: format!("query-{}", n),
        })
    }

    async fn get_query_execution(
        &self,
        query_id: &str,
    ) -> Result<GetQueryExecutionResponse, TransportError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();

        if script.fail_polls {
            return Err(TransportError::Network("connection reset".to_string()));
        }

        let (state, reason) = if script.states.len() > 1 {
            script.states.pop_front()
        } else {
            script.states.front().cloned()
        }
        .unwrap_or_else(|| ("SUCCEEDED".to_string(), None));

        Ok(GetQueryExecutionResponse {
            query_execution: Some(QueryExecution {
                query_execution_id: Some(query_id.to_string()),
                status: Some(QueryExecutionStatus {
                    state: Some(state),
                    state_change_reason: reason,
                }),
                ..Default::default()
            }),
        })
    }

    async fn get_query_results(
        &self,
        request: &GetQueryResultsRequest,
    ) -> Result<GetQueryResultsResponse, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        script.page_requests.push(request.clone());

        if let Some(remaining) = script.failing_tokens.get_mut(&request.next_token) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TransportError::Throttled("rate exceeded".to_string()));
            }
        }

        let queue = script
            .pages
            .get_mut(&request.next_token)
            .ok_or_else(|| TransportError::Service {
                code: "InvalidRequestException".to_string(),
                message: format!("unknown token {:?}", request.next_token),
            })?;

        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        response.ok_or_else(|| TransportError::Service {
            code: "InvalidRequestException".to_string(),
            message: "no page scripted".to_string(),
        })
    }

    async fn stop_query(&self, _query_id: &str) -> Result<(), TransportError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Provider counting role assumptions.
pub struct CountingProvider {
    client: Arc<ScriptedClient>,
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingProvider {
    pub fn new(client: Arc<ScriptedClient>, delay: Duration) -> Self {
        Self {
            client,
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for CountingProvider {
    async fn assume_role(
        &self,
        role_arn: &str,
        _session_label: &str,
        _region: &str,
    ) -> Result<Arc<dyn QueryServiceClient>, ConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if role_arn != ROLE {
            return Err(ConnectionError::Credentials {
                role_arn: role_arn.to_string(),
                message: "AccessDenied".to_string(),
            });
        }
        Ok(Arc::clone(&self.client) as Arc<dyn QueryServiceClient>)
    }
}
