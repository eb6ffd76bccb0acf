//! Result pages and the paginated row stream.
//!
//! The service returns results as a chain of pages linked by continuation
//! tokens. [`ResultSetCursor`] flattens that chain into an ordered,
//! exactly-once sequence of [`Row`]s, fetching the next page only when its
//! buffer runs dry.

use crate::error::{AthenaError, DataError, OperationalError, ProgrammingError};
use crate::transport::messages::{ColumnInfo, GetQueryResultsRequest, GetQueryResultsResponse};
use crate::transport::{operation, QueryServiceClient};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Largest page the service accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = MAX_PAGE_SIZE;

/// Column nullability as declared by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    NotNull,
    Nullable,
    Unknown,
}

impl Nullability {
    fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("NOT_NULL") => Nullability::NotNull,
            Some("NULLABLE") => Nullability::Nullable,
            _ => Nullability::Unknown,
        }
    }

    /// Anything not declared NOT_NULL may hold nulls.
    pub fn allows_null(&self) -> bool {
        !matches!(self, Nullability::NotNull)
    }
}

/// Metadata of one output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
    pub precision: i32,
    pub scale: i32,
    pub nullable: Nullability,
}

impl ColumnDescriptor {
    /// Create a descriptor with unknown nullability.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            precision: 0,
            scale: 0,
            nullable: Nullability::Unknown,
        }
    }
}

impl From<ColumnInfo> for ColumnDescriptor {
    fn from(info: ColumnInfo) -> Self {
        Self {
            nullable: Nullability::from_wire(info.nullable.as_deref()),
            name: info.name,
            declared_type: info.type_name,
            precision: info.precision,
            scale: info.scale,
        }
    }
}

/// One validated page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    /// Column metadata carried by the page
    pub columns: Vec<ColumnDescriptor>,
    /// Raw rows in service order
    pub rows: Vec<Vec<Option<String>>>,
    /// Token for the next page, absent on the last one
    pub next_token: Option<String>,
    /// Affected rows for DML statements
    pub update_count: Option<i64>,
}

impl TryFrom<GetQueryResultsResponse> for ResultPage {
    type Error = DataError;

    fn try_from(response: GetQueryResultsResponse) -> Result<Self, Self::Error> {
        let result_set = response
            .result_set
            .ok_or(DataError::MissingSection("ResultSet"))?;

        let columns = result_set
            .result_set_metadata
            .ok_or(DataError::MissingSection("ResultSetMetadata"))?
            .column_info
            .ok_or(DataError::MissingSection("ColumnInfo"))?
            .into_iter()
            .map(ColumnDescriptor::from)
            .collect();

        let rows = result_set
            .rows
            .ok_or(DataError::MissingSection("Rows"))?
            .into_iter()
            .map(|row| row.data.into_iter().map(|d| d.var_char_value).collect())
            .collect();

        Ok(Self {
            columns,
            rows,
            next_token: response.next_token,
            update_count: response.update_count,
        })
    }
}

/// True when `row` restates the column names position for position.
///
/// The service may echo the header as the first row of the first page.
/// A genuine data row equal to the column names would also match; this is
/// accepted because the check only ever runs on that one row.
pub fn is_header_row(columns: &[ColumnDescriptor], row: &[Option<String>]) -> bool {
    !columns.is_empty()
        && columns.len() == row.len()
        && columns
            .iter()
            .zip(row)
            .all(|(column, value)| value.as_deref() == Some(column.name.as_str()))
}

/// A result row aligned to the result set's columns.
#[derive(Clone, PartialEq, Eq)]
pub struct Row {
    columns: Arc<[ColumnDescriptor]>,
    values: Vec<Option<String>>,
}

impl Row {
    pub fn new(columns: Arc<[ColumnDescriptor]>, values: Vec<Option<String>>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Raw values; `None` is SQL NULL.
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Option<String>> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`; `None` for NULL or out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Value of the first column called `name`; `None` for NULL or no such column.
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .and_then(|index| self.get(index))
    }

    /// Column name to value.
    pub fn to_map(&self) -> HashMap<String, Option<String>> {
        self.columns
            .iter()
            .map(|c| c.name.clone())
            .zip(self.values.iter().cloned())
            .collect()
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .zip(self.values.iter()),
            )
            .finish()
    }
}

/// Single-pass, page-chaining row stream over a succeeded query.
pub struct ResultSetCursor {
    client: Arc<dyn QueryServiceClient>,
    query_id: String,
    page_size: u32,
    columns: Arc<[ColumnDescriptor]>,
    buffer: VecDeque<Vec<Option<String>>>,
    next_token: Option<String>,
    update_count: Option<i64>,
    pages_fetched: usize,
    rows_returned: u64,
    closed: bool,
}

impl fmt::Debug for ResultSetCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSetCursor")
            .field("query_id", &self.query_id)
            .field("columns", &self.columns.len())
            .field("buffered", &self.buffer.len())
            .field("has_next_page", &self.next_token.is_some())
            .field("rows_returned", &self.rows_returned)
            .field("closed", &self.closed)
            .finish()
    }
}

impl ResultSetCursor {
    /// Open the result set of `query_id` by fetching its first page.
    ///
    /// A restated header row on that first page is dropped.
    ///
    /// # Errors
    ///
    /// `ProgrammingError::MissingQueryId` for an empty id, `OperationalError`
    /// if the fetch fails, `DataError` if the page is malformed.
    pub async fn open(
        client: Arc<dyn QueryServiceClient>,
        query_id: impl Into<String>,
        page_size: u32,
    ) -> Result<Self, AthenaError> {
        let query_id = query_id.into();
        if query_id.is_empty() {
            return Err(ProgrammingError::MissingQueryId.into());
        }
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

        let mut page = fetch_page(client.as_ref(), &query_id, page_size, None).await?;

        let header_dropped = page
            .rows
            .first()
            .is_some_and(|first| is_header_row(&page.columns, first));
        if header_dropped {
            page.rows.remove(0);
        }

        debug!(
            query_id = %query_id,
            columns = page.columns.len(),
            rows = page.rows.len(),
            header_dropped,
            has_next_page = page.next_token.is_some(),
            "Opened result set"
        );

        Ok(Self {
            client,
            query_id,
            page_size,
            columns: page.columns.into(),
            buffer: page.rows.into(),
            next_token: page.next_token,
            update_count: page.update_count,
            pages_fetched: 1,
            rows_returned: 0,
            closed: false,
        })
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Column descriptors in output order.
    pub fn description(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Affected rows reported for DML statements.
    pub fn update_count(&self) -> Option<i64> {
        self.update_count
    }

    /// Rows surfaced to the caller so far.
    pub fn rows_returned(&self) -> u64 {
        self.rows_returned
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next row, or `None` once every page is drained.
    ///
    /// # Errors
    ///
    /// `ProgrammingError::CursorClosed` after [`close`](Self::close);
    /// `OperationalError`/`DataError` from a failed page fetch, in which
    /// case nothing is buffered and the same page is requested again on the
    /// next call.
    pub async fn next_row(&mut self) -> Result<Option<Row>, AthenaError> {
        self.ensure_open()?;

        loop {
            if let Some(values) = self.buffer.pop_front() {
                self.rows_returned += 1;
                return Ok(Some(Row::new(Arc::clone(&self.columns), values)));
            }

            let Some(token) = self.next_token.clone() else {
                return Ok(None);
            };

            let page = fetch_page(
                self.client.as_ref(),
                &self.query_id,
                self.page_size,
                Some(token),
            )
            .await?;

            self.pages_fetched += 1;
            debug!(
                query_id = %self.query_id,
                page = self.pages_fetched,
                rows = page.rows.len(),
                has_next_page = page.next_token.is_some(),
                "Fetched result page"
            );

            self.buffer.extend(page.rows);
            self.next_token = page.next_token;
        }
    }

    /// Alias of [`next_row`](Self::next_row).
    pub async fn fetch_one(&mut self) -> Result<Option<Row>, AthenaError> {
        self.next_row().await
    }

    /// Up to `size` rows; fewer only once the stream is exhausted.
    ///
    /// On error no row is consumed: rows gathered before the failure are
    /// returned again by the next fetch.
    pub async fn fetch_many(&mut self, size: usize) -> Result<Vec<Row>, AthenaError> {
        self.ensure_open()?;

        let mut rows = Vec::with_capacity(size.min(self.page_size as usize));
        while rows.len() < size {
            match self.next_row().await {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => break,
                Err(e) => {
                    self.unread(rows);
                    return Err(e);
                }
            }
        }
        Ok(rows)
    }

    /// Every remaining row.
    ///
    /// Holds the whole remainder in memory; use [`fetch_many`](Self::fetch_many)
    /// for large results. Fails like `fetch_many`, without consuming rows.
    pub async fn fetch_all(&mut self) -> Result<Vec<Row>, AthenaError> {
        self.ensure_open()?;

        let mut rows = Vec::with_capacity(self.buffer.len());
        loop {
            match self.next_row().await {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => return Ok(rows),
                Err(e) => {
                    self.unread(rows);
                    return Err(e);
                }
            }
        }
    }

    /// Put `rows` back in front of the buffer so the next fetch returns them
    /// again, in the same order.
    ///
    /// Rows must have been taken from this cursor, most recent last.
    pub(crate) fn unread(&mut self, rows: Vec<Row>) {
        self.rows_returned = self.rows_returned.saturating_sub(rows.len() as u64);
        for row in rows.into_iter().rev() {
            self.buffer.push_front(row.into_values());
        }
    }

    /// Release buffered rows. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.buffer.clear();
        self.next_token = None;
        debug!(query_id = %self.query_id, rows_returned = self.rows_returned, "Closed result set");
    }

    fn ensure_open(&self) -> Result<(), ProgrammingError> {
        if self.closed {
            Err(ProgrammingError::CursorClosed)
        } else {
            Ok(())
        }
    }
}

async fn fetch_page(
    client: &dyn QueryServiceClient,
    query_id: &str,
    page_size: u32,
    next_token: Option<String>,
) -> Result<ResultPage, AthenaError> {
    let request = GetQueryResultsRequest::new(query_id, page_size).with_next_token(next_token);

    let response = client
        .get_query_results(&request)
        .await
        .map_err(|source| OperationalError::Transport {
            operation: operation::GET_QUERY_RESULTS,
            source,
        })?;

    Ok(ResultPage::try_from(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::messages::{ResultSet, ResultSetMetadata};
    use crate::transport::mock::{page, MockClient};

    fn values(row: &Row) -> Vec<&str> {
        (0..row.len()).map(|i| row.get(i).unwrap_or("NULL")).collect()
    }

    fn first_page_only(client: &mut MockClient, response: GetQueryResultsResponse) {
        client
            .expect_get_query_results()
            .withf(|r| r.next_token.is_none())
            .times(1)
            .return_once(move |_| Ok(response));
    }

    #[test]
    fn test_header_row_detection() {
        let columns = vec![
            ColumnDescriptor::new("id", "integer"),
            ColumnDescriptor::new("name", "varchar"),
        ];

        assert!(is_header_row(
            &columns,
            &[Some("id".to_string()), Some("name".to_string())]
        ));
        assert!(!is_header_row(
            &columns,
            &[Some("name".to_string()), Some("id".to_string())]
        ));
        assert!(!is_header_row(&columns, &[Some("id".to_string()), None]));
        assert!(!is_header_row(&columns, &[Some("id".to_string())]));
        assert!(!is_header_row(&[], &[]));
    }

    #[test]
    fn test_result_page_missing_sections() {
        let err = ResultPage::try_from(GetQueryResultsResponse::default()).unwrap_err();
        assert_eq!(err, DataError::MissingSection("ResultSet"));

        let response = GetQueryResultsResponse {
            result_set: Some(ResultSet {
                rows: Some(vec![]),
                result_set_metadata: Some(ResultSetMetadata { column_info: None }),
            }),
            ..Default::default()
        };
        let err = ResultPage::try_from(response).unwrap_err();
        assert_eq!(err, DataError::MissingSection("ColumnInfo"));

        let mut response = page(&["a"], &[], None);
        response.result_set.as_mut().unwrap().rows = None;
        let err = ResultPage::try_from(response).unwrap_err();
        assert_eq!(err, DataError::MissingSection("Rows"));
    }

    #[test]
    fn test_row_access() {
        let columns: Arc<[ColumnDescriptor]> = vec![
            ColumnDescriptor::new("id", "integer"),
            ColumnDescriptor::new("name", "varchar"),
        ]
        .into();
        let row = Row::new(columns, vec![Some("1".to_string()), None]);

        assert_eq!(row.get(0), Some("1"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(2), None);
        assert_eq!(row.get_by_name("id"), Some("1"));
        assert_eq!(row.get_by_name("missing"), None);

        let map = row.to_map();
        assert_eq!(map.get("id"), Some(&Some("1".to_string())));
        assert_eq!(map.get("name"), Some(&None));
        assert_eq!(format!("{:?}", row), r#"{"id": Some("1"), "name": None}"#);
    }

    #[tokio::test]
    async fn test_open_drops_header_on_first_page() {
        let mut client = MockClient::new();
        first_page_only(
            &mut client,
            page(&["_col0"], &[&["_col0"], &["1"]], None),
        );

        let mut cursor = ResultSetCursor::open(Arc::new(client), "q-1", 1000)
            .await
            .unwrap();

        let rows = cursor.fetch_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_by_name("_col0"), Some("1"));
        assert_eq!(cursor.description()[0].name, "_col0");
    }

    #[tokio::test]
    async fn test_header_match_on_later_page_is_kept() {
        let mut client = MockClient::new();
        client
            .expect_get_query_results()
            .withf(|r| r.next_token.is_none())
            .times(1)
            .returning(|_| Ok(page(&["a", "b"], &[&["1", "2"]], Some("t1"))));
        client
            .expect_get_query_results()
            .withf(|r| r.next_token.as_deref() == Some("t1"))
            .times(1)
            .returning(|_| Ok(page(&["a", "b"], &[&["a", "b"], &["3", "4"]], None)));

        let mut cursor = ResultSetCursor::open(Arc::new(client), "q-1", 2)
            .await
            .unwrap();

        let rows = cursor.fetch_all().await.unwrap();
        let flat: Vec<Vec<&str>> = rows.iter().map(values).collect();
        assert_eq!(flat, vec![vec!["1", "2"], vec!["a", "b"], vec!["3", "4"]]);
        assert_eq!(cursor.pages_fetched(), 2);
    }

    #[tokio::test]
    async fn test_first_row_kept_when_it_is_not_a_header() {
        let mut client = MockClient::new();
        first_page_only(&mut client, page(&["x"], &[&["1"], &["2"]], None));

        let mut cursor = ResultSetCursor::open(Arc::new(client), "q-1", 1000)
            .await
            .unwrap();
        assert_eq!(cursor.fetch_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_intermediate_page_is_skipped() {
        let mut client = MockClient::new();
        client
            .expect_get_query_results()
            .withf(|r| r.next_token.is_none())
            .returning(|_| Ok(page(&["v"], &[&["v"], &["1"]], Some("t1"))));
        client
            .expect_get_query_results()
            .withf(|r| r.next_token.as_deref() == Some("t1"))
            .returning(|_| Ok(page(&["v"], &[], Some("t2"))));
        client
            .expect_get_query_results()
            .withf(|r| r.next_token.as_deref() == Some("t2"))
            .returning(|_| Ok(page(&["v"], &[&["2"]], None)));

        let mut cursor = ResultSetCursor::open(Arc::new(client), "q-1", 1000)
            .await
            .unwrap();

        assert_eq!(cursor.next_row().await.unwrap().unwrap().get(0), Some("1"));
        assert_eq!(cursor.next_row().await.unwrap().unwrap().get(0), Some("2"));
        assert!(cursor.next_row().await.unwrap().is_none());
        assert!(cursor.next_row().await.unwrap().is_none());
        assert_eq!(cursor.rows_returned(), 2);
    }

    #[tokio::test]
    async fn test_fetch_many_stops_at_exhaustion() {
        let mut client = MockClient::new();
        first_page_only(&mut client, page(&["n"], &[&["1"], &["2"], &["3"]], None));

        let mut cursor = ResultSetCursor::open(Arc::new(client), "q-1", 1000)
            .await
            .unwrap();

        assert_eq!(cursor.fetch_many(2).await.unwrap().len(), 2);
        assert_eq!(cursor.fetch_many(2).await.unwrap().len(), 1);
        assert!(cursor.fetch_many(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_page_keeps_token_and_buffer() {
        let mut client = MockClient::new();
        client
            .expect_get_query_results()
            .withf(|r| r.next_token.is_none())
            .times(1)
            .returning(|_| Ok(page(&["n"], &[&["1"]], Some("t1"))));

        let mut calls = 0;
        client
            .expect_get_query_results()
            .withf(|r| r.next_token.as_deref() == Some("t1"))
            .times(2)
            .returning(move |_| {
                calls += 1;
                if calls == 1 {
                    let mut broken = page(&["n"], &[&["2"]], Some("t2"));
                    broken
                        .result_set
                        .as_mut()
                        .unwrap()
                        .result_set_metadata
                        .as_mut()
                        .unwrap()
                        .column_info = None;
                    Ok(broken)
                } else {
                    Ok(page(&["n"], &[&["2"]], None))
                }
            });

        let mut cursor = ResultSetCursor::open(Arc::new(client), "q-1", 1000)
            .await
            .unwrap();

        assert_eq!(cursor.next_row().await.unwrap().unwrap().get(0), Some("1"));

        let err = cursor.next_row().await.unwrap_err();
        assert!(matches!(
            err,
            AthenaError::Data(DataError::MissingSection("ColumnInfo"))
        ));
        assert_eq!(cursor.rows_returned(), 1);

        // Same token is requested again; nothing was buffered from the bad page.
        let rows = cursor.fetch_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0), Some("2"));
    }

    fn throttled_once_then(client: &mut MockClient, response: GetQueryResultsResponse) {
        let mut calls = 0;
        client
            .expect_get_query_results()
            .withf(|r| r.next_token.as_deref() == Some("t1"))
            .times(2)
            .returning(move |_| {
                calls += 1;
                if calls == 1 {
                    Err(TransportError::Throttled("rate exceeded".to_string()))
                } else {
                    Ok(response.clone())
                }
            });
    }

    #[tokio::test]
    async fn test_fetch_all_failure_keeps_collected_rows() {
        let mut client = MockClient::new();
        first_page_only(
            &mut client,
            page(&["n"], &[&["1"], &["2"], &["3"]], Some("t1")),
        );
        throttled_once_then(&mut client, page(&["n"], &[&["4"]], None));

        let mut cursor = ResultSetCursor::open(Arc::new(client), "q-1", 1000)
            .await
            .unwrap();

        let err = cursor.fetch_all().await.unwrap_err();
        assert!(matches!(
            err,
            AthenaError::Operational(OperationalError::Transport { .. })
        ));
        assert_eq!(cursor.rows_returned(), 0);

        let rows = cursor.fetch_all().await.unwrap();
        assert_eq!(
            rows.iter().map(values).collect::<Vec<_>>(),
            vec![vec!["1"], vec!["2"], vec!["3"], vec!["4"]]
        );
        assert_eq!(cursor.rows_returned(), 4);
    }

    #[tokio::test]
    async fn test_fetch_many_failure_keeps_collected_rows() {
        let mut client = MockClient::new();
        first_page_only(&mut client, page(&["n"], &[&["1"], &["2"]], Some("t1")));
        throttled_once_then(&mut client, page(&["n"], &[&["3"], &["4"]], None));

        let mut cursor = ResultSetCursor::open(Arc::new(client), "q-1", 1000)
            .await
            .unwrap();

        assert_eq!(values(&cursor.next_row().await.unwrap().unwrap()), vec!["1"]);
        assert!(cursor.fetch_many(3).await.is_err());
        assert_eq!(cursor.rows_returned(), 1);

        let rows = cursor.fetch_many(3).await.unwrap();
        assert_eq!(
            rows.iter().map(values).collect::<Vec<_>>(),
            vec![vec!["2"], vec!["3"], vec!["4"]]
        );
        assert!(cursor.fetch_many(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_operational() {
        let mut client = MockClient::new();
        client
            .expect_get_query_results()
            .returning(|_| Err(TransportError::Network("reset".to_string())));

        let err = ResultSetCursor::open(Arc::new(client), "q-1", 1000)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AthenaError::Operational(OperationalError::Transport { operation, .. })
                if operation == "GetQueryResults"
        ));
    }

    #[tokio::test]
    async fn test_open_rejects_empty_query_id() {
        let client = MockClient::new();
        let err = ResultSetCursor::open(Arc::new(client), "", 1000)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AthenaError::Programming(ProgrammingError::MissingQueryId)
        ));
    }

    #[tokio::test]
    async fn test_page_size_is_clamped() {
        let mut client = MockClient::new();
        client
            .expect_get_query_results()
            .withf(|r| r.max_results == MAX_PAGE_SIZE)
            .times(1)
            .returning(|_| Ok(page(&["n"], &[], None)));

        ResultSetCursor::open(Arc::new(client), "q-1", 50_000)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_blocks_fetch() {
        let mut client = MockClient::new();
        first_page_only(&mut client, page(&["n"], &[&["1"]], Some("t1")));

        let mut cursor = ResultSetCursor::open(Arc::new(client), "q-1", 1000)
            .await
            .unwrap();

        cursor.close();
        cursor.close();
        assert!(cursor.is_closed());

        for result in [
            cursor.fetch_one().await.map(|_| ()),
            cursor.fetch_many(1).await.map(|_| ()),
            cursor.fetch_all().await.map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(AthenaError::Programming(ProgrammingError::CursorClosed))
            ));
        }
    }
}
