//! HTML for the landing and listing pages

use std::fmt::Write;

use crate::models::{Listing, ScrapeOutcome, ScrapeReport};

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0-alpha1/dist/css/bootstrap.min.css";
const BOOTSTRAP_JS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0-alpha1/dist/js/bootstrap.bundle.min.js";

pub fn home() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Scraper App</title>
    <link href="{BOOTSTRAP_CSS}" rel="stylesheet">
</head>
<body>
    <div class="container text-center mt-5">
        <h1>Welcome to ScraperApp</h1>
        <p>Your one-stop solution to scrape and organize product information.</p>
        <a href="/scrape" class="btn btn-primary">Start Scraping</a>
        <a href="/scraped-data" class="btn btn-secondary">View Scraped Data</a>
    </div>
</body>
</html>
"#
    )
}

/// Grid of cards, one per listing, in store order
///
/// `load_error` is set when the store could not be read.
pub fn listings(items: &[Listing], report: Option<&ScrapeReport>, load_error: Option<&str>) -> String {
    let mut cards = String::new();
    for item in items {
        let _ = write!(
            cards,
            r#"
            <div class="col-md-4">
                <div class="card">
                    <div class="card-body">
                        <h5 class="card-title">{title}</h5>
                        <p class="card-text">{description}</p>
                        <a href="{link}" target="_blank" rel="noopener" class="card-link">View Product</a>
                    </div>
                </div>
            </div>"#,
            title = escape(&item.title),
            description = escape(&item.description),
            link = escape(&item.link),
        );
    }

    let mut banners = String::new();
    if let Some(report) = report {
        banners.push_str(&status_banner(report, items.len()));
    }
    if let Some(error) = load_error {
        let _ = write!(
            banners,
            r#"<div class="alert alert-danger">Could not read stored listings: {}</div>"#,
            escape(error)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Scraped Items</title>
    <link href="{BOOTSTRAP_CSS}" rel="stylesheet">
    <style>
        body {{ background-color: #f8f9fa; font-family: Arial, sans-serif; }}
        .container {{ margin-top: 30px; }}
        .card {{ margin-bottom: 20px; border: 1px solid #dee2e6; border-radius: 8px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); }}
        .card h5 {{ color: #495057; font-size: 18px; font-weight: bold; }}
        .card p {{ font-size: 14px; color: #6c757d; margin: 5px 0 10px; }}
        .card a {{ text-decoration: none; color: #007bff; }}
        .card a:hover {{ text-decoration: underline; }}
    </style>
</head>
<body>
    <div class="container">
        <h1 class="text-center mb-4">Scraped Items</h1>
        {banners}
        <div class="row">{cards}
        </div>
    </div>
    <script src="{BOOTSTRAP_JS}"></script>
</body>
</html>
"#
    )
}

/// Tells fresh data apart from stale data left by a failed or empty scrape
fn status_banner(report: &ScrapeReport, shown: usize) -> String {
    let at = report.finished_at.format("%Y-%m-%d %H:%M:%S UTC");
    let (class, message) = match &report.outcome {
        ScrapeOutcome::Replaced { stored, skipped } => (
            "alert-success",
            format!("Scraped {stored} listings at {at} ({skipped} skipped)."),
        ),
        ScrapeOutcome::NothingFound { reason } => (
            "alert-warning",
            format!(
                "Scrape at {at} found nothing: {}. Showing {shown} previously stored listings.",
                escape(reason)
            ),
        ),
        ScrapeOutcome::Failed { error } => (
            "alert-danger",
            format!(
                "Scrape at {at} failed: {}. Showing {shown} previously stored listings.",
                escape(error)
            ),
        ),
    };

    format!(r#"<div class="alert {class}" role="status">{message}</div>"#)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
