//! Credential Port
//!
//! Bearer credentials authorising provider calls. Acquisition and refresh
//! belong to the `CredentialProvider`; everything downstream receives the
//! token as a plain value.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Authentication error type
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Authentication request failed: {0}")]
    RequestFailed(String),

    #[error("Authentication rejected: {0}")]
    Rejected(String),
}

/// Bearer token with an optional expiry
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), expires_at: None }
    }

    /// Token valid for `ttl` from now
    pub fn expiring_in(value: impl Into<String>, ttl: Duration) -> Self {
        Self {
            value: value.into(),
            expires_at: Some(Utc::now() + ttl),
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Raw token for the Authorization header
    pub fn secret(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of bearer credentials
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, AuthError>;
}

/// A pre-issued token handed in from outside (e.g. an environment variable)
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: AccessToken,
}

impl StaticCredentials {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        if self.token.is_expired() {
            return Err(AuthError::Rejected("pre-issued token has expired".into()));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let token = AccessToken::new("super-secret-value");
        let printed = format!("{:?}", token);
        assert!(!printed.contains("super-secret-value"));
        assert!(printed.contains("redacted"));
        assert_eq!(token.secret(), "super-secret-value");
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let token = AccessToken::new("t").with_expiry(now);
        assert!(token.is_expired_at(now));
        assert!(!token.is_expired_at(now - Duration::seconds(1)));
        assert!(!AccessToken::new("t").is_expired());
    }

    #[tokio::test]
    async fn test_static_credentials() {
        let provider = StaticCredentials::new(AccessToken::expiring_in("abc", Duration::minutes(5)));
        assert_eq!(provider.access_token().await.unwrap().secret(), "abc");

        let stale = StaticCredentials::new(
            AccessToken::new("old").with_expiry(Utc::now() - Duration::minutes(1)),
        );
        assert!(matches!(stale.access_token().await, Err(AuthError::Rejected(_))));
    }
}
