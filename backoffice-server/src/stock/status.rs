//! Status Derivation Engine
//!
//! Pure mappings from stock numbers to sale status. No side effects; the
//! orchestrator and the publication gate both go through here so every call
//! site converges on the same thresholds.

use serde::Serialize;

use crate::db::models::{ProductStatus, Variant};

/// Derive the sale status from a quantity and its reorder threshold.
///
/// `draft` and `archived` are not reachable from here; they are set only by
/// the publication gate.
pub fn derive_status(quantity: i64, min_stock: i64) -> ProductStatus {
    if quantity <= 0 {
        ProductStatus::OutOfStock
    } else if quantity <= min_stock {
        ProductStatus::LowStock
    } else {
        ProductStatus::Selling
    }
}

/// Aggregate product-level state derived from a variant list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateState {
    pub status: ProductStatus,
    pub published: bool,
}

/// Recompute a variant product's top-level status from its full variant list.
///
/// Classification:
/// - available: published and selling
/// - low-stock-available: published and low_stock
/// - no available variants at all: out_of_stock if every non-archived
///   variant is out of stock (and at least one exists), draft otherwise.
///   Archived variants were explicitly withdrawn and are excluded from the
///   all-out-of-stock check.
pub fn aggregate_from_variants(variants: &[Variant]) -> AggregateState {
    let selling = variants
        .iter()
        .filter(|v| v.published && v.status == ProductStatus::Selling)
        .count();
    let low_stock = variants
        .iter()
        .filter(|v| v.published && v.status == ProductStatus::LowStock)
        .count();

    if selling + low_stock == 0 {
        let considered: Vec<&Variant> = variants
            .iter()
            .filter(|v| v.status != ProductStatus::Archived)
            .collect();
        if !considered.is_empty()
            && considered
                .iter()
                .all(|v| v.status == ProductStatus::OutOfStock)
        {
            return AggregateState {
                status: ProductStatus::OutOfStock,
                published: true,
            };
        }
        return AggregateState {
            status: ProductStatus::Draft,
            published: false,
        };
    }

    if selling == 0 {
        AggregateState {
            status: ProductStatus::LowStock,
            published: true,
        }
    } else {
        AggregateState {
            status: ProductStatus::Selling,
            published: true,
        }
    }
}

/// Severity bands for the low-stock report
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LowStockSeverity {
    Critical,
    High,
    Medium,
}

/// Classify how urgent a low-stock entry is
pub fn low_stock_severity(quantity: i64, min_stock: i64) -> LowStockSeverity {
    if quantity <= 0 {
        LowStockSeverity::Critical
    } else if quantity as f64 <= min_stock as f64 * 0.5 {
        LowStockSeverity::High
    } else {
        LowStockSeverity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(status: ProductStatus, published: bool) -> Variant {
        Variant {
            id: "v".to_string(),
            name: "Variant".to_string(),
            price: Default::default(),
            stock: 0,
            min_stock: 0,
            status,
            published,
        }
    }

    #[test]
    fn test_derive_status_thresholds() {
        assert_eq!(derive_status(10, 5), ProductStatus::Selling);
        assert_eq!(derive_status(6, 5), ProductStatus::Selling);
        // Exact boundary: quantity == min_stock is low stock, not selling
        assert_eq!(derive_status(5, 5), ProductStatus::LowStock);
        assert_eq!(derive_status(1, 5), ProductStatus::LowStock);
        // Exact boundary: zero is out of stock, not low stock
        assert_eq!(derive_status(0, 5), ProductStatus::OutOfStock);
        assert_eq!(derive_status(-3, 5), ProductStatus::OutOfStock);
    }

    #[test]
    fn test_derive_status_zero_threshold() {
        assert_eq!(derive_status(1, 0), ProductStatus::Selling);
        assert_eq!(derive_status(0, 0), ProductStatus::OutOfStock);
    }

    #[test]
    fn test_aggregate_one_selling_variant_wins() {
        let variants = vec![
            variant(ProductStatus::Selling, true),
            variant(ProductStatus::Draft, false),
        ];
        let agg = aggregate_from_variants(&variants);
        assert_eq!(agg.status, ProductStatus::Selling);
        assert!(agg.published);
    }

    #[test]
    fn test_aggregate_unpublished_selling_does_not_count() {
        let variants = vec![variant(ProductStatus::Selling, false)];
        let agg = aggregate_from_variants(&variants);
        assert_eq!(agg.status, ProductStatus::Draft);
        assert!(!agg.published);
    }

    #[test]
    fn test_aggregate_all_low_stock() {
        let variants = vec![
            variant(ProductStatus::LowStock, true),
            variant(ProductStatus::LowStock, true),
        ];
        let agg = aggregate_from_variants(&variants);
        assert_eq!(agg.status, ProductStatus::LowStock);
        assert!(agg.published);
    }

    #[test]
    fn test_aggregate_all_out_of_stock() {
        let variants = vec![
            variant(ProductStatus::OutOfStock, true),
            variant(ProductStatus::OutOfStock, false),
        ];
        let agg = aggregate_from_variants(&variants);
        assert_eq!(agg.status, ProductStatus::OutOfStock);
        assert!(agg.published);
    }

    #[test]
    fn test_aggregate_draft_when_some_variant_unconfigured() {
        let variants = vec![
            variant(ProductStatus::OutOfStock, true),
            variant(ProductStatus::Draft, false),
        ];
        let agg = aggregate_from_variants(&variants);
        assert_eq!(agg.status, ProductStatus::Draft);
        assert!(!agg.published);
    }

    #[test]
    fn test_aggregate_archived_excluded_from_out_of_stock_check() {
        // Archived + out_of_stock, no draft: archived variants are ignored,
        // the rest are all out of stock
        let variants = vec![
            variant(ProductStatus::Archived, false),
            variant(ProductStatus::OutOfStock, true),
        ];
        let agg = aggregate_from_variants(&variants);
        assert_eq!(agg.status, ProductStatus::OutOfStock);
        assert!(agg.published);
    }

    #[test]
    fn test_aggregate_all_archived_is_draft() {
        let variants = vec![variant(ProductStatus::Archived, false)];
        let agg = aggregate_from_variants(&variants);
        assert_eq!(agg.status, ProductStatus::Draft);
        assert!(!agg.published);
    }

    #[test]
    fn test_aggregate_empty_list_is_draft() {
        let agg = aggregate_from_variants(&[]);
        assert_eq!(agg.status, ProductStatus::Draft);
        assert!(!agg.published);
    }

    #[test]
    fn test_low_stock_severity_bands() {
        assert_eq!(low_stock_severity(0, 10), LowStockSeverity::Critical);
        assert_eq!(low_stock_severity(-1, 10), LowStockSeverity::Critical);
        assert_eq!(low_stock_severity(5, 10), LowStockSeverity::High);
        assert_eq!(low_stock_severity(3, 10), LowStockSeverity::High);
        assert_eq!(low_stock_severity(6, 10), LowStockSeverity::Medium);
        assert_eq!(low_stock_severity(10, 10), LowStockSeverity::Medium);
    }
}
