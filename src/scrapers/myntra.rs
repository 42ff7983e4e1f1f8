//! Myntra.com specific scraper implementation

use std::time::Duration;

use crate::traits::{ScraperConfig, SiteSelectors, WebsiteScraper};

/// First page of the t-shirt listing
pub const MYNTRA_URL: &str = "https://www.myntra.com/tshirts?rawQuery=tshirts";

/// Selectors matching Myntra's product grid markup
pub fn myntra_selectors() -> SiteSelectors {
    SiteSelectors {
        item: "li.product-base".to_string(),
        title: "a div.product-productMetaInfo h3".to_string(),
        description: "h4.product-product".to_string(),
        link: "a".to_string(),
    }
}

/// Scraper implementation for Myntra.com
#[derive(Debug, Clone)]
pub struct MyntraScraper {
    config: ScraperConfig,
}

impl MyntraScraper {
    pub fn new(target_url: impl Into<String>, ready_timeout: Duration) -> Self {
        let config = ScraperConfig {
            name: "Myntra".to_string(),
            target_url: target_url.into(),
            ready_timeout,
            selectors: myntra_selectors(),
        };

        Self { config }
    }
}

impl WebsiteScraper for MyntraScraper {
    fn config(&self) -> &ScraperConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::testing::{FakeRenderer, listing_page, product_item};

    #[test]
    fn scrape_renders_target_and_extracts() {
        let scraper = MyntraScraper::new(MYNTRA_URL, Duration::from_secs(20));
        let renderer = FakeRenderer::serving(listing_page(&[
            product_item("HRX", "Brand Logo Tee", Some("tshirts/hrx/1/buy")),
            product_item("Puma", "Graphic Tee", Some("tshirts/puma/2/buy")),
        ]));

        let extraction = scraper.scrape(&renderer).unwrap();

        assert_eq!(renderer.calls(), 1);
        assert_eq!(extraction.listings.len(), 2);
        assert_eq!(extraction.listings[1].link, "https://www.myntra.com/tshirts/puma/2/buy");
    }

    #[test]
    fn readiness_timeout_propagates() {
        let scraper = MyntraScraper::new(MYNTRA_URL, Duration::from_secs(20));
        let renderer = FakeRenderer::never_ready();

        let err = scraper.scrape(&renderer).unwrap_err();

        match err {
            ScrapeError::PageNotReady { selector, waited } => {
                assert_eq!(selector, "li.product-base");
                assert_eq!(waited, Duration::from_secs(20));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
