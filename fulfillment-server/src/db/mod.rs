//! Persistence gateway
//!
//! Every accessor opens its own SQLite connection, runs its statements and
//! closes the connection before returning. There is no pool and no
//! statement cache. Multi-statement writes run in one transaction that is
//! committed once at the end; returning early with an error drops the
//! transaction, which rolls it back.

pub mod food_items;
pub mod orders;
pub mod reservations;
pub mod tracking;
pub mod users;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection, SqliteConnection};

/// How long a writer waits for another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Connection factory for the relational store
#[derive(Debug, Clone)]
pub struct Database {
    options: SqliteConnectOptions,
}

impl Database {
    /// Build from a `sqlite://` URL, creating the file if missing
    pub fn from_url(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?;
        Ok(Self::from_options(options))
    }

    /// Build for a database file path
    pub fn at_path(path: impl AsRef<Path>) -> Self {
        Self::from_options(SqliteConnectOptions::new().filename(path.as_ref()))
    }

    fn from_options(options: SqliteConnectOptions) -> Self {
        Self {
            options: options
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(BUSY_TIMEOUT),
        }
    }

    /// Open a fresh connection; callers hand it back through [`release`]
    pub async fn connect(&self) -> Result<SqliteConnection, sqlx::Error> {
        self.options.connect().await
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        let mut conn = self.connect().await?;
        let result = MIGRATOR.run(&mut conn).await;
        release(conn).await;
        result
    }

    /// Round-trip a trivial statement on a new connection
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.connect().await?;
        let result = conn.ping().await;
        release(conn).await;
        result
    }
}

/// Close a connection, logging (not propagating) close failures
pub async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close database connection");
    }
}
