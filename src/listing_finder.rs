use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::error::ScrapeError;
use crate::models::{Listing, ScrapeOutcome, ScrapeReport};
use crate::traits::{PageRenderer, ReplaceOutcome, SnapshotStore, WebsiteScraper};

/// Runs scrape-then-replace cycles and remembers how the last one went
#[derive(Clone)]
pub struct ListingFinder {
    scraper: Arc<dyn WebsiteScraper>,
    renderer: Arc<dyn PageRenderer>,
    store: Arc<dyn SnapshotStore>,
    // Held for a whole cycle, overlapping triggers run one after another
    run_lock: Arc<Mutex<()>>,
    last_report: Arc<RwLock<Option<ScrapeReport>>>,
}

impl ListingFinder {
    pub fn new(
        scraper: Arc<dyn WebsiteScraper>,
        renderer: Arc<dyn PageRenderer>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            scraper,
            renderer,
            store,
            run_lock: Arc::new(Mutex::new(())),
            last_report: Arc::new(RwLock::new(None)),
        }
    }

    /// Scrape the target page and replace the stored snapshot
    ///
    /// Never fails: every error is logged and recorded in the returned report.
    /// The cycle runs on its own task, dropping the returned future does not
    /// cancel it.
    pub async fn refresh(&self) -> ScrapeReport {
        let finder = self.clone();
        let started_at = Utc::now();

        match tokio::spawn(async move { finder.run_cycle().await }).await {
            Ok(report) => report,
            Err(e) => {
                let e = ScrapeError::Task(e.to_string());
                error!("Error during scraping: {}", e);
                let report = ScrapeReport {
                    started_at,
                    finished_at: Utc::now(),
                    outcome: ScrapeOutcome::Failed {
                        error: e.to_string(),
                    },
                };
                *self.last_report.write().await = Some(report.clone());
                report
            }
        }
    }

    async fn run_cycle(&self) -> ScrapeReport {
        let _running = self.run_lock.lock().await;
        let started_at = Utc::now();

        info!("Scraping {}", self.scraper.config().name);

        let outcome = match self.scrape_and_store().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error during scraping: {}", e);
                ScrapeOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        let report = ScrapeReport {
            started_at,
            finished_at: Utc::now(),
            outcome,
        };
        *self.last_report.write().await = Some(report.clone());
        report
    }

    async fn scrape_and_store(&self) -> Result<ScrapeOutcome, ScrapeError> {
        let scraper = Arc::clone(&self.scraper);
        let renderer = Arc::clone(&self.renderer);

        // The browser blocks, keep it off the async workers
        let scraped = tokio::task::spawn_blocking(move || scraper.scrape(renderer.as_ref()))
            .await
            .map_err(|e| ScrapeError::Task(e.to_string()))?;

        let extraction = match scraped {
            Ok(extraction) => extraction,
            Err(e @ ScrapeError::PageNotReady { .. }) => {
                warn!("{}, keeping previous listings", e);
                return Ok(ScrapeOutcome::NothingFound {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        match self.store.replace_all(&extraction.listings).await? {
            ReplaceOutcome::Replaced(stored) => {
                info!("Data stored successfully ({} listings)", stored);
                Ok(ScrapeOutcome::Replaced {
                    stored,
                    skipped: extraction.skipped,
                })
            }
            ReplaceOutcome::Skipped => Ok(ScrapeOutcome::NothingFound {
                reason: format!(
                    "no listings extracted ({} elements skipped)",
                    extraction.skipped
                ),
            }),
        }
    }

    /// Current contents of the store
    pub async fn listings(&self) -> Result<Vec<Listing>, ScrapeError> {
        self.store.all().await
    }

    pub async fn last_report(&self) -> Option<ScrapeReport> {
        self.last_report.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::database::Database;
    use crate::scrapers::myntra::{MYNTRA_URL, MyntraScraper};
    use crate::testing::{BrokenStore, FakeRenderer, listing, listing_page, product_item};

    fn finder(renderer: FakeRenderer, store: Arc<dyn SnapshotStore>) -> ListingFinder {
        ListingFinder::new(
            Arc::new(MyntraScraper::new(MYNTRA_URL, Duration::from_secs(20))),
            Arc::new(renderer),
            store,
        )
    }

    #[tokio::test]
    async fn replaces_previous_snapshot_with_valid_items() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        db.replace_all(&[listing("A", "d1", "l1")]).await.unwrap();
        let renderer = FakeRenderer::serving(listing_page(&[
            product_item("B", "d2", Some("/b")),
            product_item("C", "d3", Some("/c")),
            product_item("No link", "d4", None),
        ]));
        let finder = finder(renderer, db.clone());

        let report = finder.refresh().await;

        assert_eq!(
            report.outcome,
            ScrapeOutcome::Replaced {
                stored: 2,
                skipped: 1
            }
        );
        let titles: Vec<_> = db.all().await.unwrap().into_iter().map(|l| l.title).collect();
        assert_eq!(titles, ["B", "C"]);
    }

    #[tokio::test]
    async fn readiness_timeout_leaves_store_untouched() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        db.replace_all(&[listing("A", "d1", "l1")]).await.unwrap();
        let finder = finder(FakeRenderer::never_ready(), db.clone());

        let report = finder.refresh().await;

        assert!(matches!(report.outcome, ScrapeOutcome::NothingFound { .. }));
        let stored = finder.listings().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "A");
    }

    #[tokio::test]
    async fn page_without_valid_items_leaves_store_untouched() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        db.replace_all(&[listing("A", "d1", "l1")]).await.unwrap();
        let renderer = FakeRenderer::serving(listing_page(&[product_item("", "d", Some("/x"))]));
        let finder = finder(renderer, db.clone());

        let report = finder.refresh().await;

        assert_eq!(
            report.outcome,
            ScrapeOutcome::NothingFound {
                reason: "no listings extracted (1 elements skipped)".to_string()
            }
        );
        assert_eq!(db.all().await.unwrap()[0].title, "A");
    }

    #[tokio::test]
    async fn store_failure_is_reported_not_raised() {
        let renderer = FakeRenderer::serving(listing_page(&[product_item("B", "d", Some("/b"))]));
        let finder = finder(renderer, Arc::new(BrokenStore));

        let report = finder.refresh().await;

        assert!(matches!(report.outcome, ScrapeOutcome::Failed { .. }));
        assert_eq!(finder.last_report().await, Some(report));
    }

    #[tokio::test]
    async fn overlapping_triggers_run_one_at_a_time() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let renderer = Arc::new(
            FakeRenderer::serving(listing_page(&[product_item("B", "d", Some("/b"))]))
                .with_delay(Duration::from_millis(100)),
        );
        let finder = ListingFinder::new(
            Arc::new(MyntraScraper::new(MYNTRA_URL, Duration::from_secs(20))),
            renderer.clone(),
            db.clone(),
        );

        let (first, second, third) =
            tokio::join!(finder.refresh(), finder.refresh(), finder.refresh());

        assert!(first.is_fresh() && second.is_fresh() && third.is_fresh());
        assert_eq!(renderer.calls(), 3);
        assert_eq!(renderer.max_concurrent(), 1);
        assert_eq!(db.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropped_refresh_still_completes() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        db.replace_all(&[listing("Old", "d", "l")]).await.unwrap();
        let renderer = FakeRenderer::serving(listing_page(&[product_item("New", "d", Some("/n"))]))
            .with_delay(Duration::from_millis(300));
        let finder = finder(renderer, db.clone());

        let dropped = tokio::time::timeout(Duration::from_millis(50), finder.refresh()).await;
        assert!(dropped.is_err());

        tokio::time::sleep(Duration::from_millis(800)).await;

        let titles: Vec<_> = db.all().await.unwrap().into_iter().map(|l| l.title).collect();
        assert_eq!(titles, ["New"]);
        assert!(finder.last_report().await.is_some_and(|r| r.is_fresh()));
    }

    #[tokio::test]
    async fn no_report_before_first_run() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let finder = finder(FakeRenderer::never_ready(), db);

        assert_eq!(finder.last_report().await, None);
    }
}
