pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStudentStore;
pub use postgres::PgStudentStore;
pub use store::{SharedStore, StudentStore};

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Build the store the server runs against: Postgres when a connection
/// string is configured, otherwise the in-memory backend.
pub async fn open_store(config: &DatabaseConfig) -> Result<SharedStore, DatabaseError> {
    if config.url.is_none() {
        warn!("DATABASE_URL not set; using in-memory student store (data is not persisted)");
        return Ok(Arc::new(MemoryStudentStore::new()));
    }

    let pool = DatabaseManager::connect(config).await?;
    if config.run_setup {
        DatabaseManager::setup_schema(&pool).await;
        info!("Database setup completed");
    }
    Ok(Arc::new(PgStudentStore::new(pool)))
}
