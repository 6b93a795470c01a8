//! Stock Entry Model
//!
//! The normalized stock ledger: one record per (product, variant-or-none)
//! pair. `variant_id = None` is the unique slot for a simple product's stock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

pub type StockEntryId = RecordId;

/// Stock ledger record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<StockEntryId>,
    /// Record link to the owning product
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    /// Embedded variant id, None for a simple product's entry
    pub variant_id: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    pub notes: String,
    /// Actor reference of the last writer
    pub last_updated_by: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockEntryCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub variant_id: Option<String>,
    pub quantity: i64,
    pub min_stock: i64,
    pub notes: Option<String>,
    pub actor: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockEntryUpdate {
    pub quantity: Option<i64>,
    pub min_stock: Option<i64>,
    pub notes: Option<String>,
    pub actor: Option<String>,
}
