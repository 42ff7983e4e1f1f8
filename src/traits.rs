//! Traits and configuration shared by the scraper, the browser and the store

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::models::{Extraction, Listing};
use crate::scraper::Extractor;

/// Configuration for the listing page scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Display name for the website
    pub name: String,
    /// Listing page to scrape, only the first page is read
    pub target_url: String,
    /// How long to wait for the first listing element to appear
    pub ready_timeout: Duration,
    /// CSS selectors for extracting data
    pub selectors: SiteSelectors,
}

/// CSS selectors for the parts of a product listing
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Container selector for individual products, also the readiness condition
    pub item: String,
    /// Title selector within the item
    pub title: String,
    /// Description selector within the item
    pub description: String,
    /// Link selector within the item, its `href` is read
    pub link: String,
}

/// HTML of a page after the readiness wait
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL the page was loaded from, relative links resolve against it
    pub url: String,
    pub html: String,
}

/// Loads a page and waits until `ready_selector` matches
///
/// Implementations block the calling thread.
pub trait PageRenderer: Send + Sync {
    fn render(
        &self,
        url: &str,
        ready_selector: &str,
        ready_timeout: Duration,
    ) -> Result<RenderedPage, ScrapeError>;
}

/// Trait for website-specific scrapers
pub trait WebsiteScraper: Send + Sync {
    /// Get the configuration for this scraper
    fn config(&self) -> &ScraperConfig;

    /// Render the target page and extract every listing on it
    ///
    /// Blocks for the whole browser round trip.
    fn scrape(&self, renderer: &dyn PageRenderer) -> Result<Extraction, ScrapeError> {
        let config = self.config();
        let extractor = Extractor::new(&config.selectors)?;
        let page = renderer.render(
            &config.target_url,
            &config.selectors.item,
            config.ready_timeout,
        )?;

        extractor.extract(&page)
    }
}

/// What `SnapshotStore::replace_all` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Previous contents deleted, this many items inserted
    Replaced(usize),
    /// Empty batch, previous contents left in place
    Skipped,
}

/// Collection holding the latest batch of listings
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replace every stored listing with `items`; an empty batch is a no-op
    async fn replace_all(&self, items: &[Listing]) -> Result<ReplaceOutcome, ScrapeError>;

    /// Every stored listing in insertion order
    async fn all(&self) -> Result<Vec<Listing>, ScrapeError>;
}
