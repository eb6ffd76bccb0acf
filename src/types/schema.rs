//! Schema building from result set column metadata.

use crate::query::ColumnDescriptor;
use crate::types::{SqlType, TypeMapper};
use arrow::datatypes::{Field, Schema};
use std::collections::HashMap;

/// Builder for constructing Arrow schemas from column descriptors.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Create a new schema builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the schema.
    ///
    /// Only columns declared NOT_NULL become non-nullable fields.
    pub fn add_column(mut self, column: &ColumnDescriptor) -> Self {
        let sql_type = column_type(column);
        let field = Field::new(
            &column.name,
            TypeMapper::to_arrow(&sql_type),
            column.nullable.allows_null(),
        )
        .with_metadata(TypeMapper::create_field_metadata(&sql_type));
        self.fields.push(field);
        self
    }

    /// Add multiple columns to the schema.
    pub fn add_columns(self, columns: &[ColumnDescriptor]) -> Self {
        columns.iter().fold(self, |builder, c| builder.add_column(c))
    }

    /// Build the Arrow schema.
    pub fn build(self) -> Schema {
        Schema::new(self.fields)
    }

    /// Build the Arrow schema with schema-level metadata.
    pub fn build_with_metadata(self, metadata: HashMap<String, String>) -> Schema {
        self.build().with_metadata(metadata)
    }
}

/// Declared type of `column`.
pub fn column_type(column: &ColumnDescriptor) -> SqlType {
    SqlType::from_declared(&column.declared_type, column.precision, column.scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Nullability;
    use arrow::datatypes::DataType;

    #[test]
    fn test_schema_from_descriptors() {
        let mut id = ColumnDescriptor::new("id", "bigint");
        id.nullable = Nullability::NotNull;
        let mut price = ColumnDescriptor::new("price", "decimal");
        price.precision = 12;
        price.scale = 2;
        let name = ColumnDescriptor::new("name", "varchar");

        let schema = SchemaBuilder::new()
            .add_columns(&[id, price, name])
            .build();

        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert!(!schema.field(0).is_nullable());
        assert_eq!(schema.field(1).data_type(), &DataType::Decimal128(12, 2));
        assert!(schema.field(1).is_nullable());
        assert_eq!(schema.field(2).name(), "name");
        assert_eq!(
            schema.field(1).metadata().get("athena:type"),
            Some(&"decimal(12,2)".to_string())
        );
    }

    #[test]
    fn test_schema_level_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("query_id".to_string(), "q-1".to_string());

        let schema = SchemaBuilder::new()
            .add_column(&ColumnDescriptor::new("_col0", "integer"))
            .build_with_metadata(metadata);

        assert_eq!(schema.metadata().get("query_id"), Some(&"q-1".to_string()));
    }
}
