//! Connection configuration and credentials.
//!
//! This module provides connection parameter parsing and the credential
//! provider seam that turns a role into an authenticated client.
//!
//! # Example
//!
//! ```no_run
//! # use athena_cursor::connection::{ConnectionBuilder, ConnectionParams};
//! # use std::str::FromStr;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Using ConnectionBuilder
//! let params = ConnectionBuilder::new()
//!     .role_arn("arn:aws:iam::123456789012:role/analyst")
//!     .region("us-east-1")
//!     .workgroup("primary")
//!     .timeout(std::time::Duration::from_secs(600))
//!     .build()?;
//!
//! // Or parse from connection string
//! let params = ConnectionParams::from_str(
//!     "athena://us-east-1?role=arn:aws:iam::123456789012:role/analyst&timeout=600"
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod params;

pub use auth::{sanitize_session_name, session_label, CredentialProvider, StaticCredentialProvider};
pub use params::{ConnectionBuilder, ConnectionParams, DEFAULT_CATALOG, DEFAULT_SESSION_NAME};
