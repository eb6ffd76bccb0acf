//! Credential acquisition for the query service.
//!
//! The crate holds no credentials itself. A [`CredentialProvider`] assumes the
//! configured role and hands back an authenticated client stub.

use crate::error::ConnectionError;
use crate::transport::QueryServiceClient;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Longest session label the identity service accepts.
pub const MAX_SESSION_LABEL_LEN: usize = 64;

const MIN_SESSION_LABEL_LEN: usize = 2;

/// Produces authenticated clients by assuming a role.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Assume `role_arn` under `session_label` and return a client bound to
    /// `region`.
    ///
    /// # Errors
    ///
    /// `ConnectionError::Credentials` when the role cannot be assumed.
    async fn assume_role(
        &self,
        role_arn: &str,
        session_label: &str,
        region: &str,
    ) -> Result<Arc<dyn QueryServiceClient>, ConnectionError>;
}

/// Provider that always returns the same, already authenticated client.
///
/// Useful when the caller builds the client stub itself.
#[derive(Clone)]
pub struct StaticCredentialProvider {
    client: Arc<dyn QueryServiceClient>,
}

impl StaticCredentialProvider {
    pub fn new(client: Arc<dyn QueryServiceClient>) -> Self {
        Self { client }
    }
}

impl fmt::Debug for StaticCredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentialProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn assume_role(
        &self,
        _role_arn: &str,
        _session_label: &str,
        _region: &str,
    ) -> Result<Arc<dyn QueryServiceClient>, ConnectionError> {
        Ok(Arc::clone(&self.client))
    }
}

/// Make `name` acceptable as a session label.
///
/// Characters outside `[A-Za-z0-9+=,.@_-]` become `-`, the result is cut to
/// [`MAX_SESSION_LABEL_LEN`] and padded with `-` to the two-character minimum.
pub fn sanitize_session_name(name: &str) -> String {
    let mut label: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "+=,.@_-".contains(c) {
                c
            } else {
                '-'
            }
        })
        .take(MAX_SESSION_LABEL_LEN)
        .collect();

    while label.len() < MIN_SESSION_LABEL_LEN {
        label.push('-');
    }
    label
}

/// Unique session label derived from `name`.
///
/// A random suffix keeps concurrent sessions of the same name apart in the
/// identity service's audit trail.
pub fn session_label(name: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];
    let base = sanitize_session_name(name);
    let keep = MAX_SESSION_LABEL_LEN - suffix.len() - 1;
    let base: String = base.chars().take(keep).collect();
    format!("{}-{}", base, suffix)
}
