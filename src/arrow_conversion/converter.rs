//! Converter from buffered result rows to an Arrow RecordBatch.
//!
//! Rows arrive row-major as text. The converter transposes them into columns
//! and builds one typed Arrow array per column following the declared types.

use crate::error::DataError;
use crate::query::{ColumnDescriptor, Row};
use crate::types::{column_type, SchemaBuilder, SqlType};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::datatypes::Schema;
use std::sync::Arc;

use super::builders::build_array;

/// Converter for turning result rows into Arrow RecordBatches.
#[derive(Debug, Clone)]
pub struct ArrowConverter {
    schema: Arc<Schema>,
    columns: Vec<(String, SqlType, bool)>,
}

impl ArrowConverter {
    /// Create a converter for the given result columns.
    pub fn new(columns: &[ColumnDescriptor]) -> Self {
        let schema = Arc::new(SchemaBuilder::new().add_columns(columns).build());
        let columns = columns
            .iter()
            .map(|c| (c.name.clone(), column_type(c), c.nullable.allows_null()))
            .collect();

        Self { schema, columns }
    }

    /// Get the Arrow schema for this converter.
    pub fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Convert rows to a RecordBatch.
    ///
    /// # Errors
    ///
    /// `DataError::RowWidthMismatch` when a row does not match the column
    /// count; `DataError::Conversion` naming the row and column of the first
    /// value that does not parse as its declared type, or of a NULL in a
    /// NOT NULL column.
    pub fn convert(&self, rows: &[Row]) -> Result<RecordBatch, DataError> {
        let values: Vec<&[Option<String>]> = rows.iter().map(Row::values).collect();
        self.convert_values(&values)
    }

    /// Convert raw row values to a RecordBatch.
    pub fn convert_values<R>(&self, rows: &[R]) -> Result<RecordBatch, DataError>
    where
        R: AsRef<[Option<String>]>,
    {
        let expected = self.columns.len();
        for (row, values) in rows.iter().enumerate() {
            let actual = values.as_ref().len();
            if actual != expected {
                return Err(DataError::RowWidthMismatch {
                    row,
                    expected,
                    actual,
                });
            }
        }

        let arrays = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, (name, sql_type, nullable))| {
                let column: Vec<Option<&str>> = rows
                    .iter()
                    .map(|r| r.as_ref()[index].as_deref())
                    .collect();

                if !nullable {
                    if let Some(row) = column.iter().position(Option::is_none) {
                        return Err(DataError::Conversion {
                            row,
                            column: name.clone(),
                            message: "NULL in a NOT NULL column".to_string(),
                        });
                    }
                }

                build_array(sql_type, &column, name)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
        RecordBatch::try_new_with_options(Arc::clone(&self.schema), arrays, &options).map_err(
            |e| DataError::Conversion {
                row: 0,
                column: "*".to_string(),
                message: e.to_string(),
            },
        )
    }
}
