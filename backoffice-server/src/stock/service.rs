//! Stock Service
//!
//! Entry CRUD and the stock-aware product/order lifecycle hooks. Single
//! entry operations propagate their own failures; the follow-up sync into
//! the product document is best-effort: the primary write commits even if
//! the denormalized view lags, and reconciliation repairs the drift.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{
    Order, OrderStatus, Product, ProductStructure, ProductType, StockEntry, StockEntryCreate,
    StockEntryUpdate,
};
use crate::db::repository::product::PRODUCT_TABLE;
use crate::db::repository::{
    ProductRepository, RepoError, RepoResult, StockEntryRepository, record_id,
};
use crate::stock::dispatch::{DispatchDeductor, DispatchReport};
use crate::stock::reconcile::{BulkReconciler, BulkSyncReport, SyncFilter};
use crate::stock::status::{LowStockSeverity, low_stock_severity};
use crate::stock::sync::SyncOrchestrator;

/// One element of a bulk stock update
#[derive(Debug, Clone, Deserialize)]
pub struct BulkStockUpdateItem {
    pub id: String,
    pub quantity: Option<i64>,
    pub min_stock: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkItemResult {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkUpdateReport {
    pub updated: usize,
    pub results: Vec<BulkItemResult>,
}

/// Low-stock report row: the entry plus owning identity and severity
#[derive(Debug, Clone, Serialize)]
pub struct LowStockRow {
    pub id: String,
    pub product: String,
    pub product_name: String,
    pub variant_id: Option<String>,
    pub variant_name: Option<String>,
    pub quantity: i64,
    pub min_stock: i64,
    pub severity: LowStockSeverity,
}

pub struct StockService {
    db: Surreal<Db>,
    products: ProductRepository,
    entries: StockEntryRepository,
    orchestrator: SyncOrchestrator,
    dispatch: DispatchDeductor,
}

impl StockService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            entries: StockEntryRepository::new(db.clone()),
            orchestrator: SyncOrchestrator::new(db.clone()),
            dispatch: DispatchDeductor::new(db.clone()),
            db,
        }
    }

    // =========================================================================
    // Entry CRUD
    // =========================================================================

    pub async fn list_entries(&self) -> RepoResult<Vec<StockEntry>> {
        self.entries.find_all().await
    }

    pub async fn get_entry(&self, id: &str) -> RepoResult<Option<StockEntry>> {
        self.entries.find_by_id(id).await
    }

    /// Create a ledger entry for a product or one of its variants
    pub async fn create_entry(&self, data: StockEntryCreate) -> RepoResult<StockEntry> {
        let product_id = data.product.to_string();
        let product = self
            .products
            .find_by_id(&product_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", product_id)))?;

        if product.product_type == ProductType::Digital {
            return Err(RepoError::Validation(
                "digital products do not track stock".into(),
            ));
        }
        match &data.variant_id {
            Some(vid) => {
                if product.variant(vid).is_none() {
                    return Err(RepoError::NotFound(format!(
                        "Variant {} not found on product {}",
                        vid, product_id
                    )));
                }
            }
            None => {
                if product.product_structure == ProductStructure::Variant {
                    return Err(RepoError::Validation(
                        "variant products track stock per variant".into(),
                    ));
                }
            }
        }

        let entry = self.entries.create(data).await?;
        self.sync_best_effort(&entry).await;
        Ok(entry)
    }

    /// Update a ledger entry and propagate the change
    pub async fn update_entry(&self, id: &str, data: StockEntryUpdate) -> RepoResult<StockEntry> {
        let entry = self.entries.update(id, data).await?;
        self.sync_best_effort(&entry).await;
        Ok(entry)
    }

    /// Delete a ledger entry.
    ///
    /// The owning slot is forced to an empty, sold-out state: quantity 0,
    /// out_of_stock, still published. Deleting the ledger record means the
    /// slot is sold out, not withdrawn.
    pub async fn delete_entry(&self, id: &str) -> RepoResult<()> {
        let deleted = self.entries.delete(id).await?;

        let mut forced = deleted;
        forced.quantity = 0;
        self.sync_best_effort(&forced).await;
        Ok(())
    }

    /// Apply a batch of entry updates, isolating failures per item
    pub async fn bulk_update(&self, items: Vec<BulkStockUpdateItem>) -> BulkUpdateReport {
        let mut report = BulkUpdateReport {
            updated: 0,
            results: Vec::with_capacity(items.len()),
        };

        for item in items {
            let update = StockEntryUpdate {
                quantity: item.quantity,
                min_stock: item.min_stock,
                notes: item.notes,
                actor: None,
            };
            match self.update_entry(&item.id, update).await {
                Ok(_) => {
                    report.updated += 1;
                    report.results.push(BulkItemResult {
                        id: item.id,
                        success: true,
                        message: None,
                    });
                }
                Err(e) => {
                    tracing::warn!(entry = %item.id, error = %e, "Bulk stock update item failed");
                    report.results.push(BulkItemResult {
                        id: item.id,
                        success: false,
                        message: Some(e.to_string()),
                    });
                }
            }
        }

        report
    }

    /// Re-run synchronization over the ledger (optionally scoped)
    pub async fn bulk_sync(&self, filter: &SyncFilter) -> RepoResult<BulkSyncReport> {
        BulkReconciler::new(self.db.clone()).run(filter).await
    }

    // =========================================================================
    // Low stock report
    // =========================================================================

    /// Entries at or below `min_stock * multiplier`, annotated with severity,
    /// lowest quantity first
    pub async fn list_low_stock(&self, multiplier: f64) -> RepoResult<Vec<LowStockRow>> {
        if multiplier <= 0.0 {
            return Err(RepoError::Validation(
                "threshold multiplier must be positive".into(),
            ));
        }

        let entries = self.entries.find_low_stock(multiplier).await?;

        let mut products: HashMap<String, Option<Product>> = HashMap::new();
        let mut rows = Vec::with_capacity(entries.len());

        for entry in entries {
            let product_id = entry.product.to_string();
            if !products.contains_key(&product_id) {
                let loaded = self.products.find_by_id(&product_id).await?;
                products.insert(product_id.clone(), loaded);
            }
            let product = products.get(&product_id).cloned().flatten();

            let product_name = product.as_ref().map(|p| p.name.clone()).unwrap_or_default();
            let variant_name = match (&entry.variant_id, &product) {
                (Some(vid), Some(p)) => p.variant(vid).map(|v| v.name.clone()),
                _ => None,
            };

            rows.push(LowStockRow {
                id: entry.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
                product: product_id,
                product_name,
                variant_id: entry.variant_id.clone(),
                variant_name,
                quantity: entry.quantity,
                min_stock: entry.min_stock,
                severity: low_stock_severity(entry.quantity, entry.min_stock),
            });
        }

        Ok(rows)
    }

    // =========================================================================
    // Product lifecycle hooks
    // =========================================================================

    /// Mirror a product's stock configuration into the ledger and sync.
    ///
    /// Called after product create/edit. Creates missing entries for
    /// configured slots, updates existing ones, and drops entries whose slot
    /// no longer exists on the product. An unconfigured slot (no stock
    /// numbers, not published) gets no entry, which is what keeps it in
    /// draft.
    pub async fn ensure_entries_for_product(&self, product: &Product, actor: &str) -> RepoResult<()> {
        let Some(product_rid) = product.id.clone() else {
            return Err(RepoError::Validation("product has no id".into()));
        };

        if product.product_type == ProductType::Digital {
            // Digital products never hold ledger records
            self.entries.delete_by_product(&product_rid).await?;
            return Ok(());
        }

        let existing = self.entries.find_by_product(&product_rid).await?;

        match product.product_structure {
            ProductStructure::Simple => {
                // Variant-keyed entries are leftovers from a structure change
                for entry in existing.iter().filter(|e| e.variant_id.is_some()) {
                    if let Some(id) = &entry.id {
                        self.entries.delete(&id.to_string()).await?;
                    }
                }

                let slot = existing.iter().find(|e| e.variant_id.is_none());
                let configured = product.base_stock.is_some() || product.min_stock.is_some();

                let entry = match slot {
                    Some(entry) => {
                        if !configured {
                            return Ok(());
                        }
                        let id = entry.id.as_ref().map(|i| i.to_string()).unwrap_or_default();
                        Some(
                            self.entries
                                .update(
                                    &id,
                                    StockEntryUpdate {
                                        quantity: product.base_stock,
                                        min_stock: product.min_stock,
                                        notes: None,
                                        actor: Some(actor.to_string()),
                                    },
                                )
                                .await?,
                        )
                    }
                    None if configured => Some(
                        self.entries
                            .create(StockEntryCreate {
                                product: product_rid.clone(),
                                variant_id: None,
                                quantity: product.base_stock.unwrap_or(0),
                                min_stock: product.min_stock.unwrap_or(0),
                                notes: None,
                                actor: actor.to_string(),
                            })
                            .await?,
                    ),
                    None => None,
                };

                if let Some(entry) = entry {
                    self.sync_best_effort(&entry).await;
                }
            }

            ProductStructure::Variant => {
                // Drop entries whose variant is gone, and any simple-level slot
                for entry in &existing {
                    let orphaned = match &entry.variant_id {
                        None => true,
                        Some(vid) => product.variant(vid).is_none(),
                    };
                    if orphaned && let Some(id) = &entry.id {
                        self.entries.delete(&id.to_string()).await?;
                    }
                }

                for variant in &product.variants {
                    let slot = existing
                        .iter()
                        .find(|e| e.variant_id.as_deref() == Some(variant.id.as_str()));
                    let configured =
                        variant.stock != 0 || variant.min_stock != 0 || variant.published;

                    let entry = match slot {
                        Some(entry) => {
                            let id = entry.id.as_ref().map(|i| i.to_string()).unwrap_or_default();
                            Some(
                                self.entries
                                    .update(
                                        &id,
                                        StockEntryUpdate {
                                            quantity: Some(variant.stock),
                                            min_stock: Some(variant.min_stock),
                                            notes: None,
                                            actor: Some(actor.to_string()),
                                        },
                                    )
                                    .await?,
                            )
                        }
                        None if configured => Some(
                            self.entries
                                .create(StockEntryCreate {
                                    product: product_rid.clone(),
                                    variant_id: Some(variant.id.clone()),
                                    quantity: variant.stock,
                                    min_stock: variant.min_stock,
                                    notes: None,
                                    actor: actor.to_string(),
                                })
                                .await?,
                        ),
                        None => None,
                    };

                    if let Some(entry) = entry {
                        self.sync_best_effort(&entry).await;
                    }
                }
            }
        }

        Ok(())
    }

    /// Drop every ledger record owned by a product (product deletion)
    pub async fn remove_entries_for_product(&self, product_id: &str) -> RepoResult<()> {
        let rid = record_id(PRODUCT_TABLE, product_id)?;
        self.entries.delete_by_product(&rid).await
    }

    // =========================================================================
    // Order lifecycle hook
    // =========================================================================

    /// Deduct stock when an order status change is the dispatch transition
    pub async fn handle_order_status_change(
        &self,
        order: &Order,
        requested: OrderStatus,
    ) -> Option<DispatchReport> {
        self.dispatch.on_status_change(order, requested).await
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Best-effort propagation after a primary ledger write. The caller's
    /// write has already committed; a sync failure here is logged for
    /// reconciliation, never surfaced.
    async fn sync_best_effort(&self, entry: &StockEntry) {
        if let Err(e) = self.orchestrator.sync_entry(entry).await {
            let entry_id = entry.id.as_ref().map(|i| i.to_string()).unwrap_or_default();
            tracing::warn!(
                entry = %entry_id,
                product = %entry.product,
                variant = entry.variant_id.as_deref().unwrap_or("-"),
                error = %e,
                "Stock sync failed after ledger write"
            );
        }
    }
}
