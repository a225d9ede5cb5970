//! Application state shared by all handlers

use std::sync::Arc;

use crate::config::Config;
use crate::core::FinalizeQueue;
use crate::db::Database;
use crate::orders::OrderWorkflow;
use crate::reservations::ReservationWorkflow;
use crate::session::{InMemorySessionStore, SessionStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    /// Connection factory (one connection per call)
    pub db: Database,
    /// Session id → in-progress order
    pub sessions: Arc<dyn SessionStore>,
    /// Background order persistence
    pub finalizer: FinalizeQueue,
    pub orders: OrderWorkflow,
    pub reservations: ReservationWorkflow,
}

impl AppState {
    /// Open the configured database and bring its schema up to date
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let db = Database::from_url(&config.database_url)?;
        db.migrate().await?;
        tracing::info!(database = %config.database_url, "Database ready");
        Ok(Self::with_database(db))
    }

    /// State over an already migrated database with an in-memory session store
    pub fn with_database(db: Database) -> Self {
        Self::with_sessions(db, Arc::new(InMemorySessionStore::new()))
    }

    pub fn with_sessions(db: Database, sessions: Arc<dyn SessionStore>) -> Self {
        let finalizer = FinalizeQueue::new();
        let orders = OrderWorkflow::new(db.clone(), sessions.clone(), finalizer.clone());
        let reservations = ReservationWorkflow::new(db.clone());
        Self {
            db,
            sessions,
            finalizer,
            orders,
            reservations,
        }
    }
}
