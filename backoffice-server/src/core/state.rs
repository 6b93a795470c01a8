//! Server state
//!
//! [`ServerState`] holds the shared handles every handler needs. Cloning is
//! shallow; the embedded database handle is internally reference-counted.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration (immutable after startup)
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
}

impl ServerState {
    pub fn new(config: Config, db: Surreal<Db>) -> Self {
        Self { config, db }
    }

    /// Initialize the server state: working directory, then database.
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be opened; the server cannot run
    /// without it.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_service = DbService::new(&config.database_dir())
            .await
            .expect("Failed to initialize database");

        Self::new(config.clone(), db_service.db)
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
