//! Bulk Reconciler
//!
//! Re-runs the sync orchestrator over a batch of stock entries, isolating
//! failures per entry. This is both the manual "resync everything" operation
//! and the recovery path after best-effort sync failures: the batch always
//! completes and reports a summary.

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::{RepoResult, StockEntryRepository, record_id};
use crate::db::repository::product::PRODUCT_TABLE;
use crate::stock::sync::SyncOrchestrator;

/// Optional scope for a reconciliation pass
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncFilter {
    pub product: Option<String>,
    pub variant_id: Option<String>,
}

/// Summary of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkSyncReport {
    pub success_count: usize,
    pub failed_count: usize,
    pub messages: Vec<String>,
}

pub struct BulkReconciler {
    entries: StockEntryRepository,
    orchestrator: SyncOrchestrator,
}

impl BulkReconciler {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            entries: StockEntryRepository::new(db.clone()),
            orchestrator: SyncOrchestrator::new(db),
        }
    }

    /// Run the orchestrator over every entry matching the filter.
    ///
    /// Orphaned entries (their product slot no longer exists) are deleted
    /// during the pass. Failures are recorded per entry and never abort the
    /// batch.
    pub async fn run(&self, filter: &SyncFilter) -> RepoResult<BulkSyncReport> {
        let product = match &filter.product {
            Some(p) => Some(record_id(PRODUCT_TABLE, p)?),
            None => None,
        };
        let entries = self
            .entries
            .find_filtered(product.as_ref(), filter.variant_id.as_deref())
            .await?;

        let mut report = BulkSyncReport::default();

        for entry in &entries {
            let entry_id = entry
                .id
                .as_ref()
                .map(|i| i.to_string())
                .unwrap_or_default();

            match self.orchestrator.sync_entry(entry).await {
                Ok(_) => {
                    report.success_count += 1;
                }
                Err(e) if e.is_orphan() => {
                    // The owning slot is gone; drop the ledger record
                    match self.entries.delete(&entry_id).await {
                        Ok(_) => {
                            tracing::info!(
                                entry = %entry_id,
                                product = %entry.product,
                                variant = entry.variant_id.as_deref().unwrap_or("-"),
                                "Removed orphaned stock entry"
                            );
                            report.success_count += 1;
                            report
                                .messages
                                .push(format!("{}: removed orphaned entry ({})", entry_id, e));
                        }
                        Err(del_err) => {
                            report.failed_count += 1;
                            report.messages.push(format!(
                                "{}: failed to remove orphaned entry: {}",
                                entry_id, del_err
                            ));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        entry = %entry_id,
                        product = %entry.product,
                        variant = entry.variant_id.as_deref().unwrap_or("-"),
                        error = %e,
                        "Stock sync failed"
                    );
                    report.failed_count += 1;
                    report.messages.push(format!("{}: {}", entry_id, e));
                }
            }
        }

        tracing::info!(
            total = entries.len(),
            success = report.success_count,
            failed = report.failed_count,
            "Bulk stock sync completed"
        );

        Ok(report)
    }
}
