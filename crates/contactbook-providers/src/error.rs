//! Error types for People API and token operations.
//!
//! Failures reaching the caller fall into a small taxonomy: the remote entity
//! does not exist ([`PeopleError::NotFound`]), the API answered with any other
//! error status ([`PeopleError::RemoteApi`], body preserved for diagnostics),
//! or the request never produced a usable answer ([`PeopleError::Transport`]).
//! None of them are retried.

use std::fmt;
use thiserror::Error;

/// The category of a [`PeopleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeopleErrorKind {
    /// The remote entity does not exist (404).
    NotFound,
    /// Any other non-2xx answer from the People API.
    RemoteApi,
    /// Network failure, timeout, or an unreadable/unparsable body.
    Transport,
    /// An update or delete was requested without a resource name.
    MissingResourceName,
    /// No usable credentials, or the OAuth flow failed.
    Authentication,
    /// Missing or invalid configuration.
    Configuration,
    /// Unexpected local state.
    Internal,
}

impl PeopleErrorKind {
    /// Returns a stable machine-readable name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::RemoteApi => "remote_api_error",
            Self::Transport => "transport_error",
            Self::MissingResourceName => "missing_resource_name",
            Self::Authentication => "authentication_failed",
            Self::Configuration => "configuration_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for PeopleErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to Google.
#[derive(Debug, Error)]
pub enum PeopleError {
    /// The People API answered 404 for this resource.
    #[error("contact not found: {0}")]
    NotFound(String),

    /// The People API answered with a non-404 error status.
    #[error("People API error ({status}): {body}")]
    RemoteApi {
        /// HTTP status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The request could not be sent or its answer could not be read.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation needs a resource name and the contact has none.
    #[error("a resource name is required to {0} a contact")]
    MissingResourceName(&'static str),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PeopleError {
    /// Creates a transport error without an underlying cause.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error wrapping its cause.
    pub fn transport_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> PeopleErrorKind {
        match self {
            Self::NotFound(_) => PeopleErrorKind::NotFound,
            Self::RemoteApi { .. } => PeopleErrorKind::RemoteApi,
            Self::Transport { .. } => PeopleErrorKind::Transport,
            Self::MissingResourceName(_) => PeopleErrorKind::MissingResourceName,
            Self::Authentication(_) => PeopleErrorKind::Authentication,
            Self::Configuration(_) => PeopleErrorKind::Configuration,
            Self::Internal(_) => PeopleErrorKind::Internal,
        }
    }

    /// Returns true for a remote 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns the raw response body of a remote API error.
    pub fn remote_body(&self) -> Option<&str> {
        match self {
            Self::RemoteApi { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// A specialized Result type for People API operations.
pub type PeopleResult<T> = Result<T, PeopleError>;
