//! # Headless Chrome sessions
//!
//! A [`BrowserSession`] owns one Chrome process for exactly one scrape. The
//! process is killed when the session is dropped, so every exit path of a
//! scrape (success, navigation failure, readiness timeout) releases it.
//!
//! ## Environment Configuration
//!
//! - `CHROME_PATH`: explicit browser binary; when unset the binary is
//!   looked up in the usual install locations
//! - `BROWSER_HEADLESS`: `false` shows the window
//! - `BROWSER_SANDBOX`: `false` disables the Chrome sandbox, needed when
//!   running as root inside containers

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info};

use crate::error::ScrapeError;
use crate::traits::{PageRenderer, RenderedPage};

/// Options for launching a browser session
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub sandbox: bool,
    /// Browser binary, resolved automatically when `None`
    pub chrome_path: Option<PathBuf>,
    /// Default timeout for navigation and page loads
    pub page_load_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chrome_path: None,
            page_load_timeout: Duration::from_secs(60),
        }
    }
}

/// A live Chrome process with a single tab
pub struct BrowserSession {
    // Declared before `browser` so the tab is dropped first
    tab: Arc<Tab>,
    browser: Browser,
}

impl BrowserSession {
    /// Launch Chrome and open the tab used for scraping
    pub fn open(options: &BrowserOptions) -> Result<Self, ScrapeError> {
        let launch_options = LaunchOptions {
            headless: options.headless,
            sandbox: options.sandbox,
            path: options.chrome_path.clone(),
            // Chrome is killed after this long without events
            idle_browser_timeout: options.page_load_timeout * 2,
            ..Default::default()
        };

        let browser = Browser::new(launch_options)
            .map_err(|e| ScrapeError::Setup(format!("failed to launch browser: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::Setup(format!("failed to open tab: {e}")))?;
        tab.set_default_timeout(options.page_load_timeout);

        let session = Self { tab, browser };
        match session.version() {
            Ok(version) => info!(
                "Browser session opened: {} (page load timeout: {}s)",
                version,
                options.page_load_timeout.as_secs()
            ),
            Err(e) => debug!("{}", e),
        }
        Ok(session)
    }

    /// Navigate and wait for the page load to finish
    pub fn navigate(&self, url: &str) -> Result<(), ScrapeError> {
        info!("Loading page {}", url);

        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    /// Block until `selector` matches at least one element, or `timeout` elapses
    pub fn wait_until_ready(&self, selector: &str, timeout: Duration) -> Result<(), ScrapeError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| {
                debug!("Readiness wait for `{}` failed: {}", selector, e);
                ScrapeError::PageNotReady {
                    selector: selector.to_string(),
                    waited: timeout,
                }
            })?;

        info!("Page loaded successfully");
        Ok(())
    }

    /// Serialized DOM of the current page
    pub fn content(&self) -> Result<String, ScrapeError> {
        self.tab
            .get_content()
            .map_err(|e| ScrapeError::Enumeration(format!("failed to read page content: {e}")))
    }

    /// URL of the document the tab ended on, after any redirects
    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    /// Release the session, killing the Chrome process
    pub fn close(self) {
        drop(self);
    }

    /// Version string reported by the running browser
    pub fn version(&self) -> Result<String, ScrapeError> {
        self.browser
            .get_version()
            .map(|version| version.product)
            .map_err(|e| ScrapeError::Setup(format!("failed to query browser version: {e}")))
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("Browser session released");
    }
}

/// Renders pages in a fresh Chrome session per call
pub struct ChromeRenderer {
    options: BrowserOptions,
}

impl ChromeRenderer {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

impl PageRenderer for ChromeRenderer {
    fn render(
        &self,
        url: &str,
        ready_selector: &str,
        ready_timeout: Duration,
    ) -> Result<RenderedPage, ScrapeError> {
        let session = BrowserSession::open(&self.options)?;
        session.navigate(url)?;
        session.wait_until_ready(ready_selector, ready_timeout)?;
        let html = session.content()?;
        let final_url = session.current_url();
        session.close();

        if final_url != url {
            debug!("{} redirected to {}", url, final_url);
        }
        Ok(RenderedPage {
            url: final_url,
            html,
        })
    }
}
