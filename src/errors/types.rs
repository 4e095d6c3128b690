//! Error type definitions for the feedback widget core

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Favicon lookup errors
    #[error("Favicon error: {0}")]
    Favicon(#[from] FaviconError),

    /// Storage collaborator errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors surfaced by `resolve` / `resolve_asset`
///
/// Only malformed input is reported. Network trouble, unparsable HTML and
/// rejected content types all collapse into "no favicon".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaviconError {
    #[error("Invalid origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },
}

/// Storage collaborator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Record not found
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Query execution failures
    #[error("Query failed: {query} - {message}")]
    QueryFailed { query: String, message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl FaviconError {
    pub fn invalid_origin<O: Into<String>, R: Into<String>>(origin: O, reason: R) -> Self {
        Self::InvalidOrigin {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}

impl RepositoryError {
    pub fn not_found<R: Into<String>, I: ToString>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn query_failed<Q: Into<String>, M: Into<String>>(query: Q, message: M) -> Self {
        Self::QueryFailed {
            query: query.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FaviconError::invalid_origin("ftp://x", "unsupported scheme");
        assert_eq!(
            err.to_string(),
            "Invalid origin 'ftp://x': unsupported scheme"
        );

        let app: AppError = RepositoryError::not_found("site", 42).into();
        assert_eq!(
            app.to_string(),
            "Repository error: Not found: site with id 42"
        );
    }
}
