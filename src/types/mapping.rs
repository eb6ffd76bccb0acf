//! Type mapping between declared SQL types and Apache Arrow data types.

use arrow::datatypes::{DataType, TimeUnit};
use std::collections::HashMap;
use std::fmt;

/// Widest decimal the engine produces; always fits Decimal128.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Field metadata key holding the declared type name.
pub const DECLARED_TYPE_KEY: &str = "athena:type";

/// Declared column type as reported in result metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    /// 32-bit floating point (`float`, `real`)
    Float,
    Double,
    Decimal { precision: u8, scale: i8 },
    Char,
    Varchar,
    Date,
    Timestamp,
    Json,
    Array,
    Map,
    Row,
    Varbinary,
    /// Anything not listed above, carried by name
    Other(String),
}

impl SqlType {
    /// Parse a declared type name.
    ///
    /// Decimal precision and scale come from the `decimal(p,s)` suffix when
    /// present, otherwise from the column metadata values.
    pub fn from_declared(type_name: &str, precision: i32, scale: i32) -> Self {
        let normalized = type_name.trim().to_lowercase();
        let (base, args) = match normalized.split_once('(') {
            Some((base, rest)) => (base.trim(), Some(rest.trim_end_matches(')'))),
            None => (normalized.as_str(), None),
        };

        match base {
            "boolean" => SqlType::Boolean,
            "tinyint" => SqlType::TinyInt,
            "smallint" => SqlType::SmallInt,
            "integer" | "int" => SqlType::Integer,
            "bigint" => SqlType::BigInt,
            "float" | "real" => SqlType::Float,
            "double" => SqlType::Double,
            "decimal" => {
                let (precision, scale) = args
                    .and_then(parse_decimal_args)
                    .unwrap_or((precision, scale));
                decimal(precision, scale)
            }
            "char" => SqlType::Char,
            "varchar" | "string" => SqlType::Varchar,
            "date" => SqlType::Date,
            "timestamp" => SqlType::Timestamp,
            "json" => SqlType::Json,
            "array" => SqlType::Array,
            "map" => SqlType::Map,
            "row" | "struct" => SqlType::Row,
            "varbinary" => SqlType::Varbinary,
            _ => SqlType::Other(normalized.clone()),
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Boolean => write!(f, "boolean"),
            SqlType::TinyInt => write!(f, "tinyint"),
            SqlType::SmallInt => write!(f, "smallint"),
            SqlType::Integer => write!(f, "integer"),
            SqlType::BigInt => write!(f, "bigint"),
            SqlType::Float => write!(f, "float"),
            SqlType::Double => write!(f, "double"),
            SqlType::Decimal { precision, scale } => write!(f, "decimal({},{})", precision, scale),
            SqlType::Char => write!(f, "char"),
            SqlType::Varchar => write!(f, "varchar"),
            SqlType::Date => write!(f, "date"),
            SqlType::Timestamp => write!(f, "timestamp"),
            SqlType::Json => write!(f, "json"),
            SqlType::Array => write!(f, "array"),
            SqlType::Map => write!(f, "map"),
            SqlType::Row => write!(f, "row"),
            SqlType::Varbinary => write!(f, "varbinary"),
            SqlType::Other(name) => write!(f, "{}", name),
        }
    }
}

fn parse_decimal_args(args: &str) -> Option<(i32, i32)> {
    let (p, s) = args.split_once(',').unwrap_or((args, "0"));
    Some((p.trim().parse().ok()?, s.trim().parse().ok()?))
}

fn decimal(precision: i32, scale: i32) -> SqlType {
    let precision = if precision <= 0 {
        MAX_DECIMAL_PRECISION
    } else {
        precision.min(MAX_DECIMAL_PRECISION as i32) as u8
    };
    let scale = scale.clamp(0, precision as i32) as i8;
    SqlType::Decimal { precision, scale }
}

/// Type mapper for converting declared SQL types to Arrow types.
pub struct TypeMapper;

impl TypeMapper {
    /// Arrow type used to hold values of `sql_type`.
    ///
    /// Complex and unknown types are kept as their text form.
    pub fn to_arrow(sql_type: &SqlType) -> DataType {
        match sql_type {
            SqlType::Boolean => DataType::Boolean,
            SqlType::TinyInt => DataType::Int8,
            SqlType::SmallInt => DataType::Int16,
            SqlType::Integer => DataType::Int32,
            SqlType::BigInt => DataType::Int64,
            SqlType::Float => DataType::Float32,
            SqlType::Double => DataType::Float64,
            SqlType::Decimal { precision, scale } => DataType::Decimal128(*precision, *scale),
            SqlType::Date => DataType::Date32,
            SqlType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
            SqlType::Varbinary => DataType::Binary,
            SqlType::Char
            | SqlType::Varchar
            | SqlType::Json
            | SqlType::Array
            | SqlType::Map
            | SqlType::Row
            | SqlType::Other(_) => DataType::Utf8,
        }
    }

    /// Field metadata preserving the declared type.
    pub fn create_field_metadata(sql_type: &SqlType) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        metadata.insert(DECLARED_TYPE_KEY.to_string(), sql_type.to_string());
        metadata
    }
}
