//! Error types for dirbind

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Input validation errors
    #[error("A username must be specified")]
    UsernameRequired,

    #[error("A password must be specified")]
    PasswordRequired,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::UsernameRequired => "UsernameRequired",
            Error::PasswordRequired => "PasswordRequired",
            Error::InvalidConfig(_) => "InvalidConfig",
        }
    }

    /// Errors caused by malformed caller input, raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::UsernameRequired | Error::PasswordRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_distinct() {
        assert!(Error::UsernameRequired.is_validation());
        assert!(Error::PasswordRequired.is_validation());
        assert!(!Error::InvalidConfig("refused".into()).is_validation());

        assert_ne!(Error::UsernameRequired.code(), Error::PasswordRequired.code());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::InvalidConfig("host is required".into()).to_string(),
            "Invalid configuration: host is required"
        );
        assert_eq!(Error::InvalidConfig("x".into()).code(), "InvalidConfig");
    }
}
