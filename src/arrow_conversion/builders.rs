//! Array builders for converting text cell values to Arrow arrays.
//!
//! Every cell arrives as text (or NULL). Each builder parses one column's
//! values according to its declared type, reporting the first value that
//! does not parse.

use crate::error::DataError;
use crate::types::SqlType;
use arrow::array::{
    ArrayRef, BinaryBuilder, BooleanBuilder, Date32Builder, Decimal128Builder, Float32Builder,
    Float64Builder, Int16Builder, Int32Builder, Int64Builder, Int8Builder, StringBuilder,
    TimestampMicrosecondBuilder,
};
use std::str::FromStr;
use std::sync::Arc;

const MICROS_PER_SECOND: i64 = 1_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Build an Arrow array from one column of text values.
///
/// `column` names the column in conversion errors; row numbers are indices
/// into `values`.
pub fn build_array(
    sql_type: &SqlType,
    values: &[Option<&str>],
    column: &str,
) -> Result<ArrayRef, DataError> {
    match sql_type {
        SqlType::Boolean => build_boolean_array(values, column),
        SqlType::TinyInt => build_primitive::<Int8Builder, i8>(values, column, "tinyint"),
        SqlType::SmallInt => build_primitive::<Int16Builder, i16>(values, column, "smallint"),
        SqlType::Integer => build_primitive::<Int32Builder, i32>(values, column, "integer"),
        SqlType::BigInt => build_primitive::<Int64Builder, i64>(values, column, "bigint"),
        SqlType::Float => build_primitive::<Float32Builder, f32>(values, column, "float"),
        SqlType::Double => build_primitive::<Float64Builder, f64>(values, column, "double"),
        SqlType::Decimal { precision, scale } => {
            build_decimal128_array(values, *precision, *scale, column)
        }
        SqlType::Date => build_date_array(values, column),
        SqlType::Timestamp => build_timestamp_array(values, column),
        SqlType::Varbinary => build_binary_array(values, column),
        SqlType::Char
        | SqlType::Varchar
        | SqlType::Json
        | SqlType::Array
        | SqlType::Map
        | SqlType::Row
        | SqlType::Other(_) => Ok(build_string_array(values)),
    }
}

fn conversion(row: usize, column: &str, message: String) -> DataError {
    DataError::Conversion {
        row,
        column: column.to_string(),
        message,
    }
}

/// Builders that accept plain values of `T`.
trait PrimitiveAppend<T> {
    fn with_capacity(capacity: usize) -> Self;
    fn append(&mut self, value: Option<T>);
    fn finish_array(&mut self) -> ArrayRef;
}

macro_rules! primitive_append {
    ($builder:ty, $native:ty) => {
        impl PrimitiveAppend<$native> for $builder {
            fn with_capacity(capacity: usize) -> Self {
                <$builder>::with_capacity(capacity)
            }

            fn append(&mut self, value: Option<$native>) {
                self.append_option(value);
            }

            fn finish_array(&mut self) -> ArrayRef {
                Arc::new(self.finish())
            }
        }
    };
}

primitive_append!(Int8Builder, i8);
primitive_append!(Int16Builder, i16);
primitive_append!(Int32Builder, i32);
primitive_append!(Int64Builder, i64);
primitive_append!(Float32Builder, f32);
primitive_append!(Float64Builder, f64);

fn build_primitive<B, T>(
    values: &[Option<&str>],
    column: &str,
    type_name: &str,
) -> Result<ArrayRef, DataError>
where
    B: PrimitiveAppend<T>,
    T: FromStr,
{
    let mut builder = B::with_capacity(values.len());

    for (row, value) in values.iter().enumerate() {
        match value {
            None => builder.append(None),
            Some(text) => {
                let parsed = text.trim().parse::<T>().map_err(|_| {
                    conversion(row, column, format!("Invalid {} value: {}", type_name, text))
                })?;
                builder.append(Some(parsed));
            }
        }
    }

    Ok(builder.finish_array())
}

fn build_boolean_array(values: &[Option<&str>], column: &str) -> Result<ArrayRef, DataError> {
    let mut builder = BooleanBuilder::with_capacity(values.len());

    for (row, value) in values.iter().enumerate() {
        match value.map(|v| v.trim().to_lowercase()) {
            None => builder.append_null(),
            Some(v) if v == "true" => builder.append_value(true),
            Some(v) if v == "false" => builder.append_value(false),
            Some(v) => {
                return Err(conversion(
                    row,
                    column,
                    format!("Expected boolean, got: {}", v),
                ))
            }
        }
    }

    Ok(Arc::new(builder.finish()))
}

fn build_string_array(values: &[Option<&str>]) -> ArrayRef {
    let bytes = values.iter().flatten().map(|v| v.len()).sum();
    let mut builder = StringBuilder::with_capacity(values.len(), bytes);
    for value in values {
        builder.append_option(*value);
    }
    Arc::new(builder.finish())
}

fn build_decimal128_array(
    values: &[Option<&str>],
    precision: u8,
    scale: i8,
    column: &str,
) -> Result<ArrayRef, DataError> {
    let mut builder = Decimal128Builder::with_capacity(values.len())
        .with_precision_and_scale(precision, scale)
        .map_err(|e| conversion(0, column, e.to_string()))?;

    for (row, value) in values.iter().enumerate() {
        match value {
            None => builder.append_null(),
            Some(text) => {
                let unscaled = parse_decimal(text, precision, scale)
                    .map_err(|message| conversion(row, column, message))?;
                builder.append_value(unscaled);
            }
        }
    }

    Ok(Arc::new(builder.finish()))
}

/// Parse `"-123.45"` into its unscaled integer at `scale`.
fn parse_decimal(text: &str, precision: u8, scale: i8) -> Result<i128, String> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (integer_part, fraction_part) = digits.split_once('.').unwrap_or((digits, ""));
    let scale = scale.max(0) as usize;

    let valid = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (integer_part.is_empty() && fraction_part.is_empty())
        || !valid(integer_part)
        || !valid(fraction_part)
    {
        return Err(format!("Invalid decimal value: {}", text));
    }
    if fraction_part.len() > scale {
        return Err(format!(
            "Decimal value {} has more than {} fractional digits",
            text, scale
        ));
    }

    let integer_part = integer_part.trim_start_matches('0');
    if integer_part.len() + scale > precision as usize {
        return Err(format!(
            "Decimal value {} exceeds precision {}",
            text, precision
        ));
    }

    let mut combined = String::with_capacity(integer_part.len() + scale);
    combined.push_str(integer_part);
    combined.push_str(fraction_part);
    combined.extend(std::iter::repeat('0').take(scale - fraction_part.len()));

    let magnitude: i128 = if combined.is_empty() {
        0
    } else {
        combined
            .parse()
            .map_err(|_| format!("Invalid decimal value: {}", text))?
    };

    Ok(if negative { -magnitude } else { magnitude })
}

fn build_date_array(values: &[Option<&str>], column: &str) -> Result<ArrayRef, DataError> {
    let mut builder = Date32Builder::with_capacity(values.len());

    for (row, value) in values.iter().enumerate() {
        match value {
            None => builder.append_null(),
            Some(text) => {
                let days = parse_date(text.trim())
                    .ok_or_else(|| conversion(row, column, format!("Invalid date: {}", text)))?;
                let days = i32::try_from(days)
                    .map_err(|_| conversion(row, column, format!("Date out of range: {}", text)))?;
                builder.append_value(days);
            }
        }
    }

    Ok(Arc::new(builder.finish()))
}

fn build_timestamp_array(values: &[Option<&str>], column: &str) -> Result<ArrayRef, DataError> {
    let mut builder = TimestampMicrosecondBuilder::with_capacity(values.len());

    for (row, value) in values.iter().enumerate() {
        match value {
            None => builder.append_null(),
            Some(text) => {
                let micros = parse_timestamp(text.trim()).ok_or_else(|| {
                    conversion(row, column, format!("Invalid timestamp: {}", text))
                })?;
                builder.append_value(micros);
            }
        }
    }

    Ok(Arc::new(builder.finish()))
}

fn build_binary_array(values: &[Option<&str>], column: &str) -> Result<ArrayRef, DataError> {
    let mut builder = BinaryBuilder::with_capacity(values.len(), 0);

    for (row, value) in values.iter().enumerate() {
        match value {
            None => builder.append_null(),
            Some(text) => {
                let bytes = decode_hex(text).ok_or_else(|| {
                    conversion(row, column, format!("Invalid hex bytes: {}", text))
                })?;
                builder.append_value(bytes);
            }
        }
    }

    Ok(Arc::new(builder.finish()))
}

/// Days since 1970-01-01 for a `YYYY-MM-DD` date.
fn parse_date(text: &str) -> Option<i64> {
    let mut parts = text.splitn(3, '-');
    let year: i64 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;

    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return None;
    }
    Some(days_from_civil(year, month, day))
}

/// Microseconds since the epoch for `YYYY-MM-DD HH:MM:SS[.fraction]`.
fn parse_timestamp(text: &str) -> Option<i64> {
    let (date, time) = text.split_once([' ', 'T']).unwrap_or((text, "00:00:00"));
    let days = parse_date(date)?;

    let (clock, fraction) = time.split_once('.').unwrap_or((time, ""));
    let mut hms = clock.splitn(3, ':');
    let hours: i64 = hms.next()?.parse().ok()?;
    let minutes: i64 = hms.next()?.parse().ok()?;
    let seconds: i64 = hms.next().unwrap_or("0").parse().ok()?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    if !fraction.bytes().all(|b| b.is_ascii_digit()) || fraction.len() > 9 {
        return None;
    }
    let micros_text: String = fraction.chars().chain(std::iter::repeat('0')).take(6).collect();
    let micros: i64 = micros_text.parse().ok()?;

    let seconds_of_day = hours * 3600 + minutes * 60 + seconds;
    (days * SECONDS_PER_DAY + seconds_of_day)
        .checked_mul(MICROS_PER_SECOND)?
        .checked_add(micros)
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Proleptic Gregorian date to days since the Unix epoch.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let month = month as i64;
    let day_of_year = (153 * (if month > 2 { month - 3 } else { month + 9 }) + 2) / 5 + day as i64 - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

/// Decode hex digits, ignoring whitespace between byte pairs.
fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return None;
    }

    digits
        .chunks(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}
