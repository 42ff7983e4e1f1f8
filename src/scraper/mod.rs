use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ExtractionError, ScrapeError};
use crate::models::{Extraction, Listing};
use crate::traits::{RenderedPage, SiteSelectors};

/// Extracts listings from a rendered page using parsed site selectors
pub struct Extractor {
    selectors: SiteSelectors,
    item: Selector,
    title: Selector,
    description: Selector,
    link: Selector,
}

/// Raw fields read from one listing element
struct ItemFields {
    title: String,
    description: String,
    link: String,
}

impl Extractor {
    pub fn new(selectors: &SiteSelectors) -> Result<Self, ScrapeError> {
        Ok(Self {
            item: parse_selector("item", &selectors.item)?,
            title: parse_selector("title", &selectors.title)?,
            description: parse_selector("description", &selectors.description)?,
            link: parse_selector("link", &selectors.link)?,
            selectors: selectors.clone(),
        })
    }

    /// Extract every listing element on the page, in document order
    ///
    /// A failing element is logged and skipped, it never aborts the batch.
    pub fn extract(&self, page: &RenderedPage) -> Result<Extraction, ScrapeError> {
        let base = Url::parse(&page.url)
            .map_err(|e| ScrapeError::Enumeration(format!("invalid page url {}: {e}", page.url)))?;
        let document = Html::parse_document(&page.html);
        let scraped_at = Utc::now();

        let mut extraction = Extraction::default();

        for (index, element) in document.select(&self.item).enumerate() {
            match self.extract_item(element, &base) {
                Ok(fields) if !fields.title.is_empty() && !fields.link.is_empty() => {
                    extraction.listings.push(Listing {
                        title: fields.title,
                        description: fields.description,
                        link: fields.link,
                        scraped_at,
                    });
                }
                Ok(_) => {
                    debug!(index, "Element has no title or link, excluded");
                    extraction.skipped += 1;
                }
                Err(e) => {
                    warn!(index, error = %e, "Error scraping element");
                    extraction.skipped += 1;
                }
            }
        }

        info!(
            "Extracted {} listings from {} ({} skipped)",
            extraction.listings.len(),
            page.url,
            extraction.skipped
        );
        Ok(extraction)
    }

    fn extract_item(&self, element: ElementRef<'_>, base: &Url) -> Result<ItemFields, ExtractionError> {
        let title = self.first_match(element, &self.title, "title", &self.selectors.title)?;
        let description = self.first_match(
            element,
            &self.description,
            "description",
            &self.selectors.description,
        )?;
        let anchor = self.first_match(element, &self.link, "link", &self.selectors.link)?;

        // A missing href reads as an empty link, like the DOM property does
        let link = match anchor.value().attr("href") {
            Some(href) => base
                .join(href.trim())
                .map_err(|e| ExtractionError::InvalidLink {
                    href: href.to_string(),
                    reason: e.to_string(),
                })?
                .to_string(),
            None => String::new(),
        };

        Ok(ItemFields {
            title: visible_text(title),
            description: visible_text(description),
            link,
        })
    }

    fn first_match<'a>(
        &self,
        element: ElementRef<'a>,
        selector: &Selector,
        field: &'static str,
        raw: &str,
    ) -> Result<ElementRef<'a>, ExtractionError> {
        element
            .select(selector)
            .next()
            .ok_or_else(|| ExtractionError::MissingField {
                field,
                selector: raw.to_string(),
            })
    }
}

fn parse_selector(name: &str, raw: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(raw)
        .map_err(|e| ScrapeError::Enumeration(format!("failed to parse {name} selector `{raw}`: {e:?}")))
}

/// Text content with runs of whitespace collapsed
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
