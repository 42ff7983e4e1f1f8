use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod browser;
mod config;
mod database;
mod error;
mod listing_finder;
mod models;
mod scraper;
mod scrapers;
#[cfg(test)]
mod testing;
mod traits;
mod web;

use browser::ChromeRenderer;
use config::Config;
use database::Database;
use listing_finder::ListingFinder;
use scrapers::myntra::MyntraScraper;
use web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,listing_snapshot=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting listing snapshot server");

    let config = Config::from_env().context("Failed to load configuration")?;

    let database = Database::connect(&config.database_url)
        .await
        .context("Failed to open snapshot store")?;

    let finder = ListingFinder::new(
        Arc::new(MyntraScraper::new(config.target_url.clone(), config.ready_timeout)),
        Arc::new(ChromeRenderer::new(config.browser.clone())),
        Arc::new(database),
    );
    let app = web::router(AppState { finder });

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Trigger a scrape at http://{}/scrape", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
