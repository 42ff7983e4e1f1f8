use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::info;

use crate::error::ScrapeError;
use crate::models::Listing;
use crate::traits::{ReplaceOutcome, SnapshotStore};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(db_url: &str) -> Result<Self> {
        // Create database file if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database file");
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePool::connect(db_url).await?;
        Self::migrate(pool).await
    }

    /// Private in-memory database, for tests
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        use sqlx::sqlite::SqlitePoolOptions;

        // Every connection to `:memory:` is its own database, keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("Database initialized successfully");
        Ok(Self { pool })
    }
}

#[async_trait]
impl SnapshotStore for Database {
    async fn replace_all(&self, items: &[Listing]) -> Result<ReplaceOutcome, ScrapeError> {
        if items.is_empty() {
            info!("No data found to store");
            return Ok(ReplaceOutcome::Skipped);
        }

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM listings")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for item in items {
            sqlx::query(
                r"
                INSERT INTO listings (title, description, link, scraped_at)
                VALUES (?, ?, ?, ?)
                ",
            )
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.link)
            .bind(item.scraped_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Replaced {} stored listings with {} new ones",
            deleted,
            items.len()
        );
        Ok(ReplaceOutcome::Replaced(items.len()))
    }

    async fn all(&self) -> Result<Vec<Listing>, ScrapeError> {
        let rows = sqlx::query(
            "SELECT title, description, link, scraped_at FROM listings ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let listings = rows
            .into_iter()
            .map(|row| {
                Ok(Listing {
                    title: row.try_get("title")?,
                    description: row.try_get("description")?,
                    link: row.try_get("link")?,
                    scraped_at: row.try_get::<DateTime<Utc>, _>("scraped_at")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(listings)
    }
}
