//! Arrow data format conversion utilities.
//!
//! This module turns text-valued result rows into Apache Arrow columnar
//! batches typed after the declared column types.

mod builders;
mod converter;

pub use builders::build_array;
pub use converter::ArrowConverter;
