//! Type mapping between declared SQL types and Arrow data types.

mod mapping;
mod schema;

pub use mapping::{SqlType, TypeMapper, DECLARED_TYPE_KEY, MAX_DECIMAL_PRECISION};
pub use schema::{column_type, SchemaBuilder};
