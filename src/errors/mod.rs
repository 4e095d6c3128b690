//! Centralized error handling for the feedback widget core
//!
//! Errors are split by the layer that produces them so callers can match on
//! the failures they actually care about.
//!
//! # Error Categories
//!
//! - **Favicon Errors**: input that cannot be normalized into an origin
//! - **Repository Errors**: storage collaborator failures
//! - **Application Errors**: configuration, HTTP client construction, internal
//!
//! Transport, parse and content-type failures during favicon discovery are
//! absent: they are downgraded to "not found" inside the resolver
//! and never reach a caller.
//!
//! # Usage
//!
//! ```rust
//! use feedback_widget::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for favicon lookups
pub type FaviconResult<T> = Result<T, FaviconError>;
