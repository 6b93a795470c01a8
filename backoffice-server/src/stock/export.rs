//! Stock export
//!
//! Flattens ledger entries with their owning product/variant identity for
//! CSV and JSON export. Formatting only; no stock logic lives here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::Product;
use crate::db::repository::{ProductRepository, RepoResult, StockEntryRepository};

/// One export row: entry fields plus owning identity
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub id: String,
    pub product: String,
    pub product_name: String,
    pub variant_id: Option<String>,
    pub variant_name: Option<String>,
    pub quantity: i64,
    pub min_stock: i64,
    pub notes: String,
    pub last_updated_by: String,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct StockExporter {
    products: ProductRepository,
    entries: StockEntryRepository,
}

impl StockExporter {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            entries: StockEntryRepository::new(db),
        }
    }

    /// Collect every ledger entry as a flat export row
    pub async fn rows(&self) -> RepoResult<Vec<ExportRow>> {
        let entries = self.entries.find_all().await?;

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

            rows.push(ExportRow {
                id: entry.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
                product: product_id,
                product_name,
                variant_id: entry.variant_id,
                variant_name,
                quantity: entry.quantity,
                min_stock: entry.min_stock,
                notes: entry.notes,
                last_updated_by: entry.last_updated_by,
                updated_at: entry.updated_at,
            });
        }

        Ok(rows)
    }
}

/// Render export rows as CSV with a header line
pub fn rows_to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::from(
        "id,product,product_name,variant_id,variant_name,quantity,min_stock,notes,last_updated_by,updated_at\n",
    );
    for row in rows {
        let fields = [
            row.id.clone(),
            row.product.clone(),
            row.product_name.clone(),
            row.variant_id.clone().unwrap_or_default(),
            row.variant_name.clone().unwrap_or_default(),
            row.quantity.to_string(),
            row.min_stock.to_string(),
            row.notes.clone(),
            row.last_updated_by.clone(),
            row.updated_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Quote a CSV field when it contains a separator, quote or newline
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(notes: &str) -> ExportRow {
        ExportRow {
            id: "stock_entry:a".to_string(),
            product: "product:p".to_string(),
            product_name: "Widget".to_string(),
            variant_id: None,
            variant_name: None,
            quantity: 4,
            min_stock: 2,
            notes: notes.to_string(),
            last_updated_by: "admin".to_string(),
            updated_at: None,
        }
    }

    #[test]
    fn test_csv_header_and_row_count() {
        let csv = rows_to_csv(&[row("ok"), row("fine")]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,product,"));
    }

    #[test]
    fn test_csv_escapes_separators_and_quotes() {
        let csv = rows_to_csv(&[row("hello, \"world\"")]);
        assert!(csv.contains("\"hello, \"\"world\"\"\""));
    }
}
