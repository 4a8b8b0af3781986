use std::error::Error as StdError;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Fieldless mirror of `ScrapeError` used to pick which failures to handle.
#[derive(
    EnumString, IntoStaticStr, Display, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    LoginFailed,
    PageNotLoaded,
    TooManyRetries,
    NotUserApproved,
    NotLoggedIn,
    FileNotFound,
    ProblemNotFound,
    DriverNotFound,
    ServerError,
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Login failed: expected to be logged in as {expected}, found {}", .actual.as_deref().unwrap_or("nobody"))]
    LoginFailed {
        expected: String,
        actual: Option<String>,
    },
    #[error("Page not loaded: {0}")]
    PageNotLoaded(String),
    #[error("Gave up after {attempts} attempts")]
    TooManyRetries {
        attempts: usize,
        #[source]
        last: Box<dyn StdError + Send + Sync + 'static>,
    },
    #[error("Not approved by user")]
    NotUserApproved,
    #[error("User must be logged in")]
    NotLoggedIn,
    #[error("Could not find file : {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Could not find problem with code ({0}) in selection")]
    ProblemNotFound(String),
    #[error("Could not find driver for host : {0}")]
    DriverNotFound(String),
    #[error("Received server error : {0}")]
    ServerError(StatusCode),
}

impl ScrapeError {
    pub fn page_not_loaded(message: impl Into<String>) -> Self {
        Self::PageNotLoaded(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LoginFailed { .. } => ErrorKind::LoginFailed,
            Self::PageNotLoaded(_) => ErrorKind::PageNotLoaded,
            Self::TooManyRetries { .. } => ErrorKind::TooManyRetries,
            Self::NotUserApproved => ErrorKind::NotUserApproved,
            Self::NotLoggedIn => ErrorKind::NotLoggedIn,
            Self::FileNotFound(_) => ErrorKind::FileNotFound,
            Self::ProblemNotFound(_) => ErrorKind::ProblemNotFound,
            Self::DriverNotFound(_) => ErrorKind::DriverNotFound,
            Self::ServerError(_) => ErrorKind::ServerError,
        }
    }
}

/// Looks through `anyhow` context layers for a `ScrapeError`.
pub trait ErrorExt {
    fn kind(&self) -> Option<ErrorKind>;

    fn is_kind(&self, kind: ErrorKind) -> bool {
        self.kind() == Some(kind)
    }

    fn is_any_kind(&self, kinds: &[ErrorKind]) -> bool {
        self.kind().map_or(false, |kind| kinds.contains(&kind))
    }
}

impl ErrorExt for anyhow::Error {
    fn kind(&self) -> Option<ErrorKind> {
        self.downcast_ref::<ScrapeError>().map(ScrapeError::kind)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context as _;

    use super::*;

    #[test]
    fn test_kind_survives_context() {
        let err = Err::<(), _>(ScrapeError::page_not_loaded("empty table"))
            .context("Could not list problems")
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::PageNotLoaded));
        assert!(err.is_any_kind(&[ErrorKind::LoginFailed, ErrorKind::PageNotLoaded]));
        assert!(!err.is_kind(ErrorKind::LoginFailed));
    }

    #[test]
    fn test_foreign_error_has_no_kind() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(err.kind(), None);
        assert!(!err.is_any_kind(&[ErrorKind::PageNotLoaded]));
    }

    #[test]
    fn test_login_failed_display() {
        let err = ScrapeError::LoginFailed {
            expected: "alice".into(),
            actual: None,
        };
        assert_eq!(
            err.to_string(),
            "Login failed: expected to be logged in as alice, found nobody"
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::PageNotLoaded.to_string(), "page-not-loaded");
    }
}
