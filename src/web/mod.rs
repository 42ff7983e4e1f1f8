//! HTTP routes: landing page, scrape trigger and listing view

mod pages;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::listing_finder::ListingFinder;
use crate::models::ScrapeReport;

const LISTINGS_PATH: &str = "/scraped-data";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub finder: ListingFinder,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/scrape", get(scrape))
        .route(LISTINGS_PATH, get(scraped_data))
        .route("/scrape/status", get(scrape_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> Html<String> {
    Html(pages::home())
}

/// Run a full scrape, then redirect to the listings whatever happened
async fn scrape(State(state): State<AppState>) -> Response {
    let report = state.finder.refresh().await;
    if report.is_fresh() {
        info!(outcome = ?report.outcome, "Scrape finished");
    } else {
        warn!(outcome = ?report.outcome, "Scrape left previous listings in place");
    }

    (StatusCode::FOUND, [(header::LOCATION, LISTINGS_PATH)]).into_response()
}

async fn scraped_data(State(state): State<AppState>) -> Html<String> {
    let report = state.finder.last_report().await;

    match state.finder.listings().await {
        Ok(items) => Html(pages::listings(&items, report.as_ref(), None)),
        Err(e) => {
            error!("Failed to load stored listings: {}", e);
            Html(pages::listings(&[], report.as_ref(), Some(&e.to_string())))
        }
    }
}

async fn scrape_status(State(state): State<AppState>) -> Json<Option<ScrapeReport>> {
    Json(state.finder.last_report().await)
}
