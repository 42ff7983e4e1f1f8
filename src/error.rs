//! Error types for scraping, extraction and storage

use std::time::Duration;

use thiserror::Error;

/// Failure of a whole scrape run
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The browser could not be resolved or launched
    #[error("browser setup failed: {0}")]
    Setup(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// No element matched the readiness selector in time
    #[error("page not ready after {}s: nothing matched `{selector}`", .waited.as_secs())]
    PageNotReady { selector: String, waited: Duration },

    /// The page could not be enumerated at all
    #[error("element enumeration failed: {0}")]
    Enumeration(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// The blocking scrape task panicked or was cancelled
    #[error("scrape task failed: {0}")]
    Task(String),
}

/// Failure to read one listing element; the element is skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no {field} element matches `{selector}`")]
    MissingField {
        field: &'static str,
        selector: String,
    },

    #[error("invalid link `{href}`: {reason}")]
    InvalidLink { href: String, reason: String },
}
