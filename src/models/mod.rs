//! Data models for scraped listings and scrape run reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product listing scraped from the target page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub title: String,
    pub description: String,
    /// Absolute product URL
    pub link: String,
    pub scraped_at: DateTime<Utc>,
}

/// Result of extracting every listing element on one page
#[derive(Debug, Default)]
pub struct Extraction {
    pub listings: Vec<Listing>,
    /// Elements that failed extraction or had no title or link
    pub skipped: usize,
}

/// What a single trigger run did to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScrapeOutcome {
    /// The store now holds exactly the freshly scraped batch
    Replaced { stored: usize, skipped: usize },
    /// Nothing was extracted, the previous snapshot is still in place
    NothingFound { reason: String },
    /// The scrape or the store write failed, the previous snapshot is still in place
    Failed { error: String },
}

/// Outcome of the most recent trigger run, kept in memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: ScrapeOutcome,
}

impl ScrapeReport {
    /// Whether the data on display came from this run
    pub fn is_fresh(&self) -> bool {
        matches!(self.outcome, ScrapeOutcome::Replaced { .. })
    }
}
