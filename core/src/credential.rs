//! Bearer credential seam.
//!
//! Token acquisition is an injected capability. Hosts wrap their identity
//! SDK in a `CredentialProvider`; tests use `StaticCredential`.

use std::fmt;

use async_trait::async_trait;

use crate::error::ApiError;

/// Opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Supplies a short-lived credential on demand.
///
/// Called once per operation; implementations may refresh, hit the network
/// or prompt the user. Failures should be reported as
/// `ApiError::Credential`.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get_token(&self) -> Result<Credential, ApiError>;
}

/// Provider that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticCredential(Credential);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Credential::new(token))
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn get_token(&self) -> Result<Credential, ApiError> {
        Ok(self.0.clone())
    }
}
