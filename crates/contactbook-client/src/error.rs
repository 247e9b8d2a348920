//! Client error types.
//!
//! People API failures are not errors at this level: actions turn them into
//! flash messages. What remains is what stops a command from running at all.

use contactbook_providers::PeopleError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that abort a command.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication required: {0}")]
    AuthRequired(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Provider(#[from] PeopleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Maps a token acquisition failure. Authentication problems tell the user
    /// to sign in; anything else is kept as is.
    pub fn from_token_error(err: PeopleError) -> Self {
        match err {
            PeopleError::Authentication(msg) => Self::AuthRequired(msg),
            other => Self::Provider(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_becomes_auth_required() {
        let err = ClientError::from_token_error(PeopleError::authentication(
            "not authenticated - run 'contactbook auth google'",
        ));
        assert!(matches!(err, ClientError::AuthRequired(_)));
        assert_eq!(
            err.to_string(),
            "authentication required: not authenticated - run 'contactbook auth google'"
        );
    }

    #[test]
    fn other_token_errors_are_kept() {
        let err = ClientError::from_token_error(PeopleError::transport("timeout"));
        assert!(matches!(err, ClientError::Provider(PeopleError::Transport { .. })));
        assert_eq!(err.to_string(), "transport error: timeout");
    }
}
