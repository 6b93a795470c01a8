//! Stock Entry Repository
//!
//! Ledger access layer. Quantity deductions go through an atomic clamped
//! decrement evaluated inside the store, never a read-then-write.

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{StockEntry, StockEntryCreate, StockEntryUpdate};
use chrono::{DateTime, Utc};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

pub const STOCK_TABLE: &str = "stock_entry";

// =============================================================================
// Stock Entry Repository
// =============================================================================

#[derive(Clone)]
pub struct StockEntryRepository {
    base: BaseRepository,
}

impl StockEntryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all entries, most recently touched first
    pub async fn find_all(&self) -> RepoResult<Vec<StockEntry>> {
        let entries: Vec<StockEntry> = self
            .base
            .db()
            .query("SELECT * FROM stock_entry ORDER BY updated_at DESC")
            .await?
            .take(0)?;
        Ok(entries)
    }

    /// Find entry by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<StockEntry>> {
        let rid = record_id(STOCK_TABLE, id)?;
        let entry: Option<StockEntry> = self
            .base
            .db()
            .select((STOCK_TABLE, rid.key().to_string()))
            .await?;
        Ok(entry)
    }

    /// Find all entries owned by a product
    pub async fn find_by_product(&self, product: &RecordId) -> RepoResult<Vec<StockEntry>> {
        let entries: Vec<StockEntry> = self
            .base
            .db()
            .query("SELECT * FROM stock_entry WHERE product = $product")
            .bind(("product", product.clone()))
            .await?
            .take(0)?;
        Ok(entries)
    }

    /// Find the unique entry for a (product, variant-or-none) pair
    pub async fn find_by_pair(
        &self,
        product: &RecordId,
        variant_id: Option<&str>,
    ) -> RepoResult<Option<StockEntry>> {
        let mut result = match variant_id {
            Some(vid) => {
                self.base
                    .db()
                    .query("SELECT * FROM stock_entry WHERE product = $product AND variant_id = $vid")
                    .bind(("product", product.clone()))
                    .bind(("vid", vid.to_string()))
                    .await?
            }
            None => {
                self.base
                    .db()
                    .query("SELECT * FROM stock_entry WHERE product = $product AND variant_id = NONE")
                    .bind(("product", product.clone()))
                    .await?
            }
        };
        let entries: Vec<StockEntry> = result.take(0)?;
        Ok(entries.into_iter().next())
    }

    /// Find entries filtered by product and/or variant (for bulk sync)
    pub async fn find_filtered(
        &self,
        product: Option<&RecordId>,
        variant_id: Option<&str>,
    ) -> RepoResult<Vec<StockEntry>> {
        let mut conditions: Vec<&str> = Vec::new();
        if product.is_some() {
            conditions.push("product = $product");
        }
        if variant_id.is_some() {
            conditions.push("variant_id = $vid");
        }

        let query_str = if conditions.is_empty() {
            "SELECT * FROM stock_entry".to_string()
        } else {
            format!("SELECT * FROM stock_entry WHERE {}", conditions.join(" AND "))
        };

        let mut query = self.base.db().query(&query_str);
        if let Some(p) = product {
            query = query.bind(("product", p.clone()));
        }
        if let Some(vid) = variant_id {
            query = query.bind(("vid", vid.to_string()));
        }

        let entries: Vec<StockEntry> = query.await?.take(0)?;
        Ok(entries)
    }

    /// Create a new entry; at most one entry may exist per pair
    pub async fn create(&self, data: StockEntryCreate) -> RepoResult<StockEntry> {
        if data.quantity < 0 || data.min_stock < 0 {
            return Err(RepoError::Validation(
                "quantity and min_stock cannot be negative".into(),
            ));
        }

        if let Some(existing) = self
            .find_by_pair(&data.product, data.variant_id.as_deref())
            .await?
        {
            return Err(RepoError::Duplicate(format!(
                "Stock entry {} already exists for {} / {}",
                existing.id.map(|i| i.to_string()).unwrap_or_default(),
                data.product,
                data.variant_id.as_deref().unwrap_or("-"),
            )));
        }

        // Internal struct keeps the product field as a native RecordId so it
        // is stored as a record link, not a string
        #[derive(serde::Serialize)]
        struct InternalEntry {
            product: RecordId,
            variant_id: Option<String>,
            quantity: i64,
            min_stock: i64,
            notes: String,
            last_updated_by: String,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        let now = Utc::now();
        let entry = InternalEntry {
            product: data.product,
            variant_id: data.variant_id,
            quantity: data.quantity,
            min_stock: data.min_stock,
            notes: data.notes.unwrap_or_default(),
            last_updated_by: data.actor,
            created_at: now,
            updated_at: now,
        };

        let created: Option<StockEntry> =
            self.base.db().create(STOCK_TABLE).content(entry).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create stock entry".to_string()))
    }

    /// Update an entry
    pub async fn update(&self, id: &str, data: StockEntryUpdate) -> RepoResult<StockEntry> {
        let rid = record_id(STOCK_TABLE, id)?;

        if data.quantity.is_some_and(|q| q < 0) || data.min_stock.is_some_and(|m| m < 0) {
            return Err(RepoError::Validation(
                "quantity and min_stock cannot be negative".into(),
            ));
        }

        let mut set_parts: Vec<&str> = Vec::new();
        if data.quantity.is_some() {
            set_parts.push("quantity = $quantity");
        }
        if data.min_stock.is_some() {
            set_parts.push("min_stock = $min_stock");
        }
        if data.notes.is_some() {
            set_parts.push("notes = $notes");
        }
        if data.actor.is_some() {
            set_parts.push("last_updated_by = $actor");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Stock entry {} not found", id)));
        }
        set_parts.push("updated_at = $updated_at");

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("thing", rid))
            .bind(("updated_at", Utc::now()));

        if let Some(v) = data.quantity {
            query = query.bind(("quantity", v));
        }
        if let Some(v) = data.min_stock {
            query = query.bind(("min_stock", v));
        }
        if let Some(v) = data.notes {
            query = query.bind(("notes", v));
        }
        if let Some(v) = data.actor {
            query = query.bind(("actor", v));
        }

        let mut result = query.await?;
        let entries: Vec<StockEntry> = result.take(0)?;
        entries
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Stock entry {} not found", id)))
    }

    /// Delete an entry, returning the deleted record
    pub async fn delete(&self, id: &str) -> RepoResult<StockEntry> {
        let rid = record_id(STOCK_TABLE, id)?;
        let deleted: Option<StockEntry> = self
            .base
            .db()
            .delete((STOCK_TABLE, rid.key().to_string()))
            .await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("Stock entry {} not found", id)))
    }

    /// Delete all entries owned by a product
    pub async fn delete_by_product(&self, product: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE stock_entry WHERE product = $product")
            .bind(("product", product.clone()))
            .await?;
        Ok(())
    }

    /// Atomically decrement an entry's quantity, clamped at zero inside the
    /// store so concurrent deductions cannot drive it negative
    pub async fn deduct(
        &self,
        id: &RecordId,
        amount: i64,
        note: &str,
        actor: &str,
    ) -> RepoResult<StockEntry> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET quantity = math::max([quantity - $amount, 0]), \
                 notes = $note, last_updated_by = $actor, updated_at = $updated_at RETURN AFTER",
            )
            .bind(("thing", id.clone()))
            .bind(("amount", amount))
            .bind(("note", note.to_string()))
            .bind(("actor", actor.to_string()))
            .bind(("updated_at", Utc::now()))
            .await?;
        let entries: Vec<StockEntry> = result.take(0)?;
        entries
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Stock entry {} not found", id)))
    }

    /// Entries at or below `min_stock * multiplier`, lowest quantity first
    pub async fn find_low_stock(&self, multiplier: f64) -> RepoResult<Vec<StockEntry>> {
        let entries: Vec<StockEntry> = self
            .base
            .db()
            .query(
                "SELECT * FROM stock_entry WHERE quantity <= min_stock * $multiplier \
                 ORDER BY quantity ASC",
            )
            .bind(("multiplier", multiplier))
            .await?
            .take(0)?;
        Ok(entries)
    }
}
