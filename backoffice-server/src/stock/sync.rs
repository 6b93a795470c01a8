//! Sync Orchestrator
//!
//! Propagates a stock entry into the denormalized fields of its owning
//! product (or the matching variant inside it), then re-derives the
//! aggregate product-level status. Every stock-mutating call site goes
//! through here so the invariants converge regardless of entry point.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::db::models::{ProductStatus, ProductStructure, ProductType, StockEntry};
use crate::db::repository::{ProductRepository, RepoError, StockStateWrite};
use crate::stock::status::{aggregate_from_variants, derive_status};

/// Per-entry sync failure. Callers record these; they never abort sibling
/// entries or the primary write that triggered the sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("product {0} not found")]
    ProductNotFound(String),

    #[error("variant {variant_id} not found on product {product}")]
    VariantNotFound { product: String, variant_id: String },

    #[error("entry does not match the structure of product {product}")]
    ShapeMismatch { product: String },

    #[error("database error: {0}")]
    Database(String),
}

impl From<RepoError> for SyncError {
    fn from(err: RepoError) -> Self {
        SyncError::Database(err.to_string())
    }
}

impl SyncError {
    /// An orphaned entry: its slot on the owning product no longer exists.
    /// Reconciliation deletes these.
    pub fn is_orphan(&self) -> bool {
        matches!(
            self,
            SyncError::VariantNotFound { .. } | SyncError::ShapeMismatch { .. }
        )
    }
}

/// What a single-entry sync did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Derived state applied to the owning slot; `changed` is false when the
    /// product document already matched (nothing was written)
    Applied {
        status: ProductStatus,
        changed: bool,
    },
    /// Digital products never hold stock; syncing one is a safe no-op
    SkippedDigital,
}

pub struct SyncOrchestrator {
    products: ProductRepository,
}

impl SyncOrchestrator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// Apply one stock entry to its owning product document.
    ///
    /// Writes only the fields that actually change; a fully converged entry
    /// results in no write at all.
    pub async fn sync_entry(&self, entry: &StockEntry) -> Result<SyncOutcome, SyncError> {
        let product_id = entry.product.to_string();
        let product = self
            .products
            .find_by_id(&product_id)
            .await?
            .ok_or_else(|| SyncError::ProductNotFound(product_id.clone()))?;

        if product.product_type == ProductType::Digital {
            tracing::debug!(product = %product_id, "Sync skipped: digital products do not track stock");
            return Ok(SyncOutcome::SkippedDigital);
        }

        let mut write = StockStateWrite::default();
        let slot_status;

        match &entry.variant_id {
            Some(variant_id) => {
                let mut variants = product.variants.clone();
                let Some(variant) = variants.iter_mut().find(|v| v.id == *variant_id) else {
                    return Err(SyncError::VariantNotFound {
                        product: product_id,
                        variant_id: variant_id.clone(),
                    });
                };

                let status = derive_status(entry.quantity, entry.min_stock);
                slot_status = status;

                // Stock changes never revoke a variant's publication; only
                // the gate's archived path does that
                let variant_changed = variant.stock != entry.quantity
                    || variant.min_stock != entry.min_stock
                    || variant.status != status
                    || !variant.published;

                variant.stock = entry.quantity;
                variant.min_stock = entry.min_stock;
                variant.status = status;
                variant.published = true;

                let aggregate = aggregate_from_variants(&variants);
                if variant_changed {
                    write.variants = Some(variants);
                }
                if product.status != Some(aggregate.status) {
                    write.status = Some(aggregate.status);
                }
                if product.published != Some(aggregate.published) {
                    write.published = Some(aggregate.published);
                }
            }
            None => {
                if !product.variants.is_empty()
                    || product.product_structure == ProductStructure::Variant
                {
                    return Err(SyncError::ShapeMismatch {
                        product: product_id,
                    });
                }

                let status = derive_status(entry.quantity, entry.min_stock);
                slot_status = status;

                if product.base_stock != Some(entry.quantity) {
                    write.base_stock = Some(entry.quantity);
                }
                if product.min_stock != Some(entry.min_stock) {
                    write.min_stock = Some(entry.min_stock);
                }
                if product.status != Some(status) {
                    write.status = Some(status);
                }
                if product.published != Some(true) {
                    write.published = Some(true);
                }
            }
        }

        let changed = !write.is_empty();
        if changed {
            self.products.write_stock_state(&entry.product, write).await?;
            tracing::info!(
                product = %entry.product,
                variant = entry.variant_id.as_deref().unwrap_or("-"),
                quantity = entry.quantity,
                status = slot_status.as_str(),
                "Stock state synchronized"
            );
        }

        Ok(SyncOutcome::Applied {
            status: slot_status,
            changed,
        })
    }
}
