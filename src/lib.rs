//! Favicon discovery and live event fan-out for an embeddable feedback widget

pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;
pub mod utils;

pub use config::Config;
pub use errors::{AppError, AppResult};
