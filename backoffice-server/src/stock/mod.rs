//! Stock Synchronization & Publication
//!
//! Keeps the normalized stock ledger (`stock_entry`) consistent with the
//! denormalized stock/status fields embedded in product records, and gates
//! product visibility on derived stock state. Direct stock edits, product
//! create/edit and order dispatch all converge through [`sync::SyncOrchestrator`].

pub mod dispatch;
pub mod export;
pub mod publication;
pub mod reconcile;
pub mod service;
pub mod status;
pub mod sync;


pub use dispatch::{DispatchDeductor, DispatchReport};
pub use export::{ExportRow, StockExporter, rows_to_csv};
pub use publication::{PublicationCheck, StockSnapshot, validate_publish};
pub use reconcile::{BulkReconciler, BulkSyncReport, SyncFilter};
pub use service::{BulkStockUpdateItem, BulkUpdateReport, LowStockRow, StockService};
pub use status::{AggregateState, LowStockSeverity, aggregate_from_variants, derive_status};
pub use sync::{SyncError, SyncOrchestrator, SyncOutcome};
