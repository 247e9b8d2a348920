//! TokenAcquirer trait definition.
//!
//! People API calls never read credentials from ambient state: every
//! operation takes an [`AccessToken`] obtained by the caller from a
//! [`TokenAcquirer`]. Token refresh and expiry handling belong to the
//! acquirer, not to the API client.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::{PeopleError, PeopleResult};

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe so callers can hold a
/// `Box<dyn TokenAcquirer>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An OAuth 2.0 bearer token for one signed-in user.
///
/// The `Debug` output is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Source of access tokens for the signed-in user.
pub trait TokenAcquirer: Send + Sync {
    /// Returns a short name for diagnostics (e.g. `"google:default"`).
    fn name(&self) -> &str;

    /// Returns a currently valid access token, refreshing it if needed.
    fn access_token(&self) -> BoxFuture<'_, PeopleResult<AccessToken>>;

    /// Returns true if a token is available or can be refreshed.
    fn is_authenticated(&self) -> bool;
}

/// A token acquirer that always hands out the same token.
///
/// Useful when a token is obtained out of band, for example from
/// `gcloud auth print-access-token`.
#[derive(Debug, Clone)]
pub struct StaticTokenAcquirer {
    token: Option<AccessToken>,
}

impl StaticTokenAcquirer {
    /// Creates an acquirer from a raw token. An empty token counts as none.
    pub fn new(token: impl Into<String>) -> Self {
        let token: String = token.into();
        Self {
            token: (!token.is_empty()).then(|| AccessToken::new(token)),
        }
    }
}

impl TokenAcquirer for StaticTokenAcquirer {
    fn name(&self) -> &str {
        "static"
    }

    fn access_token(&self) -> BoxFuture<'_, PeopleResult<AccessToken>> {
        Box::pin(async move {
            self.token
                .clone()
                .ok_or_else(|| PeopleError::authentication("no access token provided"))
        })
    }

    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
