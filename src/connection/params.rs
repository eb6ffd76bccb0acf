//! Connection parameter parsing and validation.
//!
//! This module handles parsing connection strings and building connection
//! parameters with validation.

use crate::error::ConnectionError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Catalog used when none is configured.
pub const DEFAULT_CATALOG: &str = "AwsDataCatalog";

/// Session name used when none is configured.
pub const DEFAULT_SESSION_NAME: &str = "athena-cursor";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const SCHEME: &str = "athena://";

/// Connection-scoped configuration. Immutable once built.
///
/// No credentials are held here; they are obtained by assuming `role_arn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Role assumed to obtain service credentials
    pub role_arn: String,

    /// Service region
    pub region: String,

    /// Workgroup queries run in (service default when absent)
    pub workgroup: Option<String>,

    /// Data catalog
    pub catalog: String,

    /// Default database
    pub schema: Option<String>,

    /// Where the engine writes query results
    pub output_location: Option<String>,

    /// Wall-clock budget for one query, measured from the start of polling
    pub timeout: Duration,

    /// Wait between two polls
    pub poll_interval: Duration,

    /// Label for the assumed-role session
    pub session_name: String,
}

impl ConnectionParams {
    /// Create a new ConnectionBuilder.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }
}

impl FromStr for ConnectionParams {
    type Err = ConnectionError;

    /// Parse a connection string in the format:
    /// `athena://region[/catalog]?role=arn[&param=value...]`
    ///
    /// Recognized parameters are `role`, `workgroup`, `schema`, `output`,
    /// `timeout` and `poll_interval` (seconds), and `session_name`. Values
    /// may be percent-encoded. Any other parameter is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// # use athena_cursor::connection::ConnectionParams;
    /// # use std::str::FromStr;
    /// let params = ConnectionParams::from_str(
    ///     "athena://eu-west-1?role=arn:aws:iam::123456789012:role/analyst&workgroup=primary",
    /// )?;
    /// assert_eq!(params.region, "eu-west-1");
    /// assert_eq!(params.catalog, "AwsDataCatalog");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = s.trim();

        let url = url.strip_prefix(SCHEME).ok_or_else(|| {
            ConnectionError::ParseError(format!("Connection string must start with '{}'", SCHEME))
        })?;

        let (main_part, query_string) = match url.split_once('?') {
            Some((main, query)) => (main, Some(query)),
            None => (url, None),
        };

        let params = parse_query_params(query_string)?;

        let (region, catalog) = match main_part.split_once('/') {
            Some((region, catalog)) => {
                let catalog = catalog.trim_end_matches('/');
                (region, (!catalog.is_empty()).then_some(catalog))
            }
            None => (main_part, None),
        };

        if region.is_empty() {
            return Err(ConnectionError::ParseError(
                "Region is required after 'athena://'".to_string(),
            ));
        }

        let mut builder = ConnectionBuilder::new().region(&decode(region, "region")?);
        if let Some(catalog) = catalog {
            builder = builder.catalog(&decode(catalog, "catalog")?);
        }

        apply_query_params(builder, params)?.build()
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConnectionParams {{ role: {}, region: {}, catalog: {}, workgroup: {:?}, timeout: {}s }}",
            self.role_arn,
            self.region,
            self.catalog,
            self.workgroup,
            self.timeout.as_secs()
        )
    }
}

/// Builder for constructing ConnectionParams with validation.
#[derive(Debug, Clone, Default)]
pub struct ConnectionBuilder {
    role_arn: Option<String>,
    region: Option<String>,
    workgroup: Option<String>,
    catalog: Option<String>,
    schema: Option<String>,
    output_location: Option<String>,
    timeout: Option<Duration>,
    poll_interval: Option<Duration>,
    session_name: Option<String>,
}

impl ConnectionBuilder {
    /// Create a new ConnectionBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role to assume.
    pub fn role_arn(mut self, role_arn: &str) -> Self {
        self.role_arn = Some(role_arn.to_string());
        self
    }

    /// Set the service region.
    pub fn region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    /// Set the workgroup.
    pub fn workgroup(mut self, workgroup: &str) -> Self {
        self.workgroup = Some(workgroup.to_string());
        self
    }

    /// Set the data catalog.
    pub fn catalog(mut self, catalog: &str) -> Self {
        self.catalog = Some(catalog.to_string());
        self
    }

    /// Set the default database.
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Set the result output location.
    pub fn output_location(mut self, location: &str) -> Self {
        self.output_location = Some(location.to_string());
        self
    }

    /// Set the per-query timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the assumed-role session name.
    pub fn session_name(mut self, name: &str) -> Self {
        self.session_name = Some(name.to_string());
        self
    }

    /// Build the ConnectionParams with validation.
    pub fn build(self) -> Result<ConnectionParams, ConnectionError> {
        let role_arn = required(self.role_arn, "role_arn", "Role ARN")?;
        let region = required(self.region, "region", "Region")?;

        let catalog = self
            .catalog
            .unwrap_or_else(|| DEFAULT_CATALOG.to_string());
        if catalog.is_empty() {
            return Err(invalid("catalog", "Catalog cannot be empty"));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(invalid("timeout", "Timeout must be greater than 0"));
        }

        let poll_interval = self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL);
        if poll_interval.is_zero() {
            return Err(invalid(
                "poll_interval",
                "Poll interval must be greater than 0",
            ));
        }

        Ok(ConnectionParams {
            role_arn,
            region,
            workgroup: self.workgroup.filter(|w| !w.is_empty()),
            catalog,
            schema: self.schema.filter(|s| !s.is_empty()),
            output_location: self.output_location.filter(|o| !o.is_empty()),
            timeout,
            poll_interval,
            session_name: self
                .session_name
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()),
        })
    }
}

fn required(
    value: Option<String>,
    parameter: &str,
    label: &str,
) -> Result<String, ConnectionError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(invalid(parameter, &format!("{} cannot be empty", label))),
        None => Err(invalid(parameter, &format!("{} is required", label))),
    }
}

fn invalid(parameter: &str, message: &str) -> ConnectionError {
    ConnectionError::InvalidParameter {
        parameter: parameter.to_string(),
        message: message.to_string(),
    }
}

fn decode(value: &str, what: &str) -> Result<String, ConnectionError> {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .map_err(|e| ConnectionError::ParseError(format!("Failed to decode {}: {}", what, e)))
}

/// Parse query parameters from URL query string.
fn parse_query_params(query: Option<&str>) -> Result<HashMap<String, String>, ConnectionError> {
    let mut params = HashMap::new();

    if let Some(query) = query {
        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }

            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ConnectionError::ParseError(format!("Invalid query parameter format: {}", pair))
            })?;

            params.insert(decode(key, "key")?, decode(value, "value")?);
        }
    }

    Ok(params)
}

/// Apply query parameters to builder.
fn apply_query_params(
    mut builder: ConnectionBuilder,
    params: HashMap<String, String>,
) -> Result<ConnectionBuilder, ConnectionError> {
    for (key, value) in params {
        match key.as_str() {
            "role" | "role_arn" => builder = builder.role_arn(&value),
            "workgroup" => builder = builder.workgroup(&value),
            "schema" | "database" => builder = builder.schema(&value),
            "output" | "output_location" => builder = builder.output_location(&value),
            "timeout" => builder = builder.timeout(parse_secs(&key, &value)?),
            "poll_interval" => builder = builder.poll_interval(parse_secs(&key, &value)?),
            "session_name" => builder = builder.session_name(&value),
            _ => {
                return Err(ConnectionError::InvalidParameter {
                    parameter: key.clone(),
                    message: "Unknown connection parameter".to_string(),
                });
            }
        }
    }

    Ok(builder)
}

/// Parse a whole or fractional number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConnectionError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
        .ok_or_else(|| ConnectionError::InvalidParameter {
            parameter: key.to_string(),
            message: format!("Invalid duration in seconds: {}", value),
        })
}
