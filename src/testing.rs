//! Fixtures shared by unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::ScrapeError;
use crate::models::Listing;
use crate::traits::{PageRenderer, RenderedPage, ReplaceOutcome, SnapshotStore};

/// One `li.product-base` element in Myntra's markup
pub fn product_item(title: &str, description: &str, href: Option<&str>) -> String {
    let href = href.map(|h| format!(r#" href="{h}""#)).unwrap_or_default();
    format!(
        r#"<li class="product-base"><a{href}><div class="product-productMetaInfo"><h3>{title}</h3><h4 class="product-product">{description}</h4></div></a></li>"#
    )
}

pub fn listing_page(items: &[String]) -> String {
    format!(
        "<html><body><ul class=\"results-base\">{}</ul></body></html>",
        items.concat()
    )
}

pub fn listing(title: &str, description: &str, link: &str) -> Listing {
    Listing {
        title: title.to_string(),
        description: description.to_string(),
        link: link.to_string(),
        scraped_at: Utc::now(),
    }
}

/// Renderer serving canned responses without a browser
pub struct FakeRenderer {
    html: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeRenderer {
    pub fn serving(html: String) -> Self {
        Self::with_response(Some(html))
    }

    /// Every render times out waiting for the readiness selector
    pub fn never_ready() -> Self {
        Self::with_response(None)
    }

    fn with_response(html: Option<String>) -> Self {
        Self {
            html,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Block each render for `delay`, like a slow page load
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Most renders ever in flight at the same time
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageRenderer for FakeRenderer {
    fn render(
        &self,
        url: &str,
        ready_selector: &str,
        ready_timeout: Duration,
    ) -> Result<RenderedPage, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.active.fetch_sub(1, Ordering::SeqCst);

        match &self.html {
            Some(html) => Ok(RenderedPage {
                url: url.to_string(),
                html: html.clone(),
            }),
            None => Err(ScrapeError::PageNotReady {
                selector: ready_selector.to_string(),
                waited: ready_timeout,
            }),
        }
    }
}

/// Store whose every operation fails
pub struct BrokenStore;

#[async_trait]
impl SnapshotStore for BrokenStore {
    async fn replace_all(&self, _items: &[Listing]) -> Result<ReplaceOutcome, ScrapeError> {
        Err(ScrapeError::Store(sqlx::Error::PoolClosed))
    }

    async fn all(&self) -> Result<Vec<Listing>, ScrapeError> {
        Err(ScrapeError::Store(sqlx::Error::PoolClosed))
    }
}
