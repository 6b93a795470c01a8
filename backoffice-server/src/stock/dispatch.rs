//! Order-Dispatch Deductor
//!
//! Deducts ordered quantities from the stock ledger when an order
//! transitions into `dispatched`, then re-triggers the sync orchestrator so
//! the product documents converge through the same path as every other
//! stock mutation. Line items are isolated: one failure never blocks the
//! rest of the order, nor the status transition itself.

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Order, OrderLineItem, OrderStatus, ProductType, StockEntryCreate};
use crate::db::repository::{ProductRepository, RepoError, StockEntryRepository};
use crate::stock::sync::SyncOrchestrator;

const DISPATCH_ACTOR: &str = "system:dispatch";

/// Summary of a dispatch deduction pass over one order
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub order: String,
    pub deducted: usize,
    pub failed: usize,
    pub messages: Vec<String>,
}

pub struct DispatchDeductor {
    products: ProductRepository,
    entries: StockEntryRepository,
    orchestrator: SyncOrchestrator,
}

impl DispatchDeductor {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            entries: StockEntryRepository::new(db.clone()),
            orchestrator: SyncOrchestrator::new(db),
        }
    }

    /// True only for a transition into `dispatched` from a non-dispatched
    /// state. The guard makes a repeated dispatch transition a no-op, so an
    /// order is never deducted twice.
    pub fn triggers_deduction(current: OrderStatus, requested: OrderStatus) -> bool {
        requested == OrderStatus::Dispatched && current != OrderStatus::Dispatched
    }

    /// Run the deduction if (and only if) this status change is the
    /// dispatch transition.
    pub async fn on_status_change(
        &self,
        order: &Order,
        requested: OrderStatus,
    ) -> Option<DispatchReport> {
        if !Self::triggers_deduction(order.status, requested) {
            return None;
        }
        Some(self.deduct_order(order).await)
    }

    async fn deduct_order(&self, order: &Order) -> DispatchReport {
        let mut report = DispatchReport {
            order: order.reference.clone(),
            deducted: 0,
            failed: 0,
            messages: Vec::new(),
        };

        for (index, item) in order.items.iter().enumerate() {
            match self.deduct_line(order, item).await {
                Ok(()) => report.deducted += 1,
                Err(e) => {
                    tracing::warn!(
                        order = %order.reference,
                        line = index,
                        product = %item.product,
                        variant = item.variant_id.as_deref().unwrap_or("-"),
                        error = %e,
                        "Dispatch deduction failed for line item"
                    );
                    report.failed += 1;
                    report
                        .messages
                        .push(format!("line {} ({}): {}", index, item.product, e));
                }
            }
        }

        tracing::info!(
            order = %order.reference,
            deducted = report.deducted,
            failed = report.failed,
            "Order dispatch deduction completed"
        );

        report
    }

    async fn deduct_line(&self, order: &Order, item: &OrderLineItem) -> Result<(), String> {
        let product_id = item.product.to_string();
        let product = self
            .products
            .find_by_id(&product_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("product {} not found", product_id))?;

        if product.product_type == ProductType::Digital {
            tracing::debug!(product = %product_id, "Dispatch line skipped: digital product");
            return Ok(());
        }

        // Current slot numbers, used when the ledger entry has to be created
        let (current, min_stock) = match &item.variant_id {
            Some(vid) => {
                let variant = product
                    .variant(vid)
                    .ok_or_else(|| format!("variant {} not found on product {}", vid, product_id))?;
                (variant.stock, variant.min_stock)
            }
            None => (
                product.base_stock.unwrap_or(0),
                product.min_stock.unwrap_or(0),
            ),
        };

        let note = format!("Order {} dispatched (-{})", order.reference, item.quantity);

        let entry = match self
            .entries
            .find_by_pair(&item.product, item.variant_id.as_deref())
            .await
            .map_err(|e| e.to_string())?
        {
            Some(existing) => {
                let entry_id = existing
                    .id
                    .as_ref()
                    .ok_or_else(|| "stock entry has no id".to_string())?;
                // Clamped decrement, evaluated atomically inside the store
                self.entries
                    .deduct(entry_id, item.quantity, &note, DISPATCH_ACTOR)
                    .await
                    .map_err(|e| e.to_string())?
            }
            None => {
                let quantity = (current - item.quantity).max(0);
                self.entries
                    .create(StockEntryCreate {
                        product: item.product.clone(),
                        variant_id: item.variant_id.clone(),
                        quantity,
                        min_stock,
                        notes: Some(note),
                        actor: DISPATCH_ACTOR.to_string(),
                    })
                    .await
                    .map_err(|e: RepoError| e.to_string())?
            }
        };

        // Propagate the new quantity into the product document through the
        // one shared path
        self.orchestrator
            .sync_entry(&entry)
            .await
            .map_err(|e| format!("ledger updated but product sync failed: {}", e))?;

        Ok(())
    }
}
