//! Backoffice Server - multi-tenant e-commerce back office
//!
//! # Architecture overview
//!
//! Routed CRUD over an embedded document store, with one subsystem carrying
//! the real invariants: the stock synchronization & publication state
//! machine in [`stock`]. Direct stock edits, product create/edit and order
//! dispatch all converge through the same sync orchestrator.
//!
//! # Module structure
//!
//! ```text
//! backoffice-server/src/
//! ├── core/          # configuration, state, server bootstrap
//! ├── db/            # embedded SurrealDB, models, repositories
//! ├── stock/         # stock sync & publication state machine
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # error type, logging
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod stock;
pub mod utils;

// Re-export common types
pub use crate::core::{Config, Server, ServerState};
pub use stock::{StockService, SyncOrchestrator};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
