use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Error, SqlitePool};

use crate::settings::DatabaseSettings;

const CREATE_CATEGORIES: &str = r"
CREATE TABLE IF NOT EXISTS tbl_categories (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)";

const CREATE_ITEMS: &str = r"
CREATE TABLE IF NOT EXISTS tbl_items (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL,
    category_id  INTEGER NOT NULL,
    date_created TEXT NOT NULL
)";

/// Shared handle to the catalog database
#[derive(Clone)]
pub struct CatalogDb {
    pub pool: SqlitePool,
}

impl CatalogDb {
    /// Open the configured database and create the tables if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the database cannot be opened,
    /// or the schema cannot be created
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(&settings.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections.max(1))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        log::info!("Catalog database ready at {}", settings.url);
        Ok(db)
    }

    /// Private in-memory database, used by tests and demos
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created
    pub async fn in_memory() -> Result<Self, Error> {
        // Every pooled connection to :memory: is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), Error> {
        sqlx::query(CREATE_CATEGORIES).execute(&self.pool).await?;
        sqlx::query(CREATE_ITEMS).execute(&self.pool).await?;
        Ok(())
    }
}
