//! Publication Gate
//!
//! Validates publish/unpublish requests against a product's structural
//! shape and stock configuration. A refusal is a structured, user-actionable
//! result, not an error: callers get the reason plus a stock snapshot.

use serde::Serialize;

use crate::db::models::{Product, ProductShape, ProductStatus};

/// Current stock snapshot attached to every gate result
#[derive(Debug, Clone, Serialize)]
pub struct StockSnapshot {
    pub base_stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub variant_count: usize,
    pub published_variants: usize,
}

/// Result of a publish/unpublish validation
#[derive(Debug, Clone, Serialize)]
pub struct PublicationCheck {
    pub can_publish: bool,
    pub status: ProductStatus,
    pub published: bool,
    pub message: String,
    pub snapshot: StockSnapshot,
}

impl PublicationCheck {
    fn allowed(status: ProductStatus, published: bool, message: &str, snapshot: StockSnapshot) -> Self {
        Self {
            can_publish: true,
            status,
            published,
            message: message.to_string(),
            snapshot,
        }
    }

    fn refused(message: &str, snapshot: StockSnapshot) -> Self {
        // A refused product stays in its resting state
        Self {
            can_publish: false,
            status: ProductStatus::Draft,
            published: false,
            message: message.to_string(),
            snapshot,
        }
    }
}

/// Validate a publish (`requested = true`) or unpublish request.
///
/// Publish/unpublish is reversible at will; unpublishing always succeeds and
/// parks the product as `archived`.
pub fn validate_publish(product: &Product, requested: bool) -> PublicationCheck {
    let snapshot = StockSnapshot {
        base_stock: product.base_stock,
        min_stock: product.min_stock,
        variant_count: product.variants.len(),
        published_variants: product.variants.iter().filter(|v| v.published).count(),
    };

    match product.shape() {
        // Digital products have no stock precondition in either direction
        ProductShape::Digital => PublicationCheck::allowed(
            ProductStatus::Selling,
            requested,
            if requested {
                "Digital product published"
            } else {
                "Digital product unpublished"
            },
            snapshot,
        ),

        ProductShape::Variant { variants } => {
            if !requested {
                return PublicationCheck::allowed(
                    ProductStatus::Archived,
                    false,
                    "Product unpublished and archived",
                    snapshot,
                );
            }
            if variants.is_empty() {
                return PublicationCheck::refused(
                    "Add at least one variant before publishing",
                    snapshot,
                );
            }
            let any_sellable = variants
                .iter()
                .any(|v| v.published && v.status == ProductStatus::Selling);
            if any_sellable {
                PublicationCheck::allowed(
                    ProductStatus::Selling,
                    true,
                    "Product published",
                    snapshot,
                )
            } else {
                // Publish is allowed but the product is flagged unavailable
                PublicationCheck::allowed(
                    ProductStatus::OutOfStock,
                    true,
                    "Published, but no variant is currently sellable",
                    snapshot,
                )
            }
        }

        ProductShape::Simple {
            base_stock,
            min_stock,
        } => {
            if !requested {
                return PublicationCheck::allowed(
                    ProductStatus::Archived,
                    false,
                    "Product unpublished and archived",
                    snapshot,
                );
            }
            match (base_stock, min_stock) {
                (None, None) => PublicationCheck::refused(
                    "Configure base_stock and min_stock before publishing",
                    snapshot,
                ),
                (Some(_), None) => PublicationCheck::refused(
                    "Configure min_stock before publishing",
                    snapshot,
                ),
                (None, Some(_)) => PublicationCheck::refused(
                    "Configure base_stock before publishing",
                    snapshot,
                ),
                (Some(base), Some(_)) => {
                    if base <= 0 {
                        PublicationCheck::allowed(
                            ProductStatus::OutOfStock,
                            true,
                            "Published, but stock is empty",
                            snapshot,
                        )
                    } else {
                        // low_stock is never entered from the gate; the next
                        // stock sync refines selling when base <= min_stock
                        PublicationCheck::allowed(
                            ProductStatus::Selling,
                            true,
                            "Product published",
                            snapshot,
                        )
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ProductStructure, ProductType, Variant};

    fn simple_product(base_stock: Option<i64>, min_stock: Option<i64>) -> Product {
        Product {
            id: None,
            name: "Widget".to_string(),
            product_type: ProductType::Physical,
            product_structure: ProductStructure::Simple,
            price: None,
            base_stock,
            min_stock,
            status: Some(ProductStatus::Draft),
            published: Some(false),
            variants: vec![],
            sort_order: 0,
            created_at: None,
            updated_at: None,
        }
    }

    fn variant_product(variants: Vec<Variant>) -> Product {
        Product {
            id: None,
            name: "Widget".to_string(),
            product_type: ProductType::Physical,
            product_structure: ProductStructure::Variant,
            price: None,
            base_stock: None,
            min_stock: None,
            status: None,
            published: None,
            variants,
            sort_order: 0,
            created_at: None,
            updated_at: None,
        }
    }

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
    fn test_digital_always_publishable() {
        let mut product = simple_product(None, None);
        product.product_type = ProductType::Digital;

        let check = validate_publish(&product, true);
        assert!(check.can_publish);
        assert_eq!(check.status, ProductStatus::Selling);
        assert!(check.published);

        let check = validate_publish(&product, false);
        assert!(check.can_publish);
        assert_eq!(check.status, ProductStatus::Selling);
        assert!(!check.published);
    }

    #[test]
    fn test_simple_publish_with_stock() {
        let check = validate_publish(&simple_product(Some(10), Some(5)), true);
        assert!(check.can_publish);
        assert_eq!(check.status, ProductStatus::Selling);
        assert!(check.published);
    }

    #[test]
    fn test_simple_publish_below_threshold_is_selling_at_gate() {
        // The gate never emits low_stock; derivation refines it on next sync
        let check = validate_publish(&simple_product(Some(3), Some(5)), true);
        assert!(check.can_publish);
        assert_eq!(check.status, ProductStatus::Selling);
    }

    #[test]
    fn test_simple_publish_with_empty_stock_is_allowed_out_of_stock() {
        let check = validate_publish(&simple_product(Some(0), Some(5)), true);
        assert!(check.can_publish);
        assert_eq!(check.status, ProductStatus::OutOfStock);
        assert!(check.published);
    }

    #[test]
    fn test_simple_publish_unconfigured_is_refused() {
        let check = validate_publish(&simple_product(None, None), true);
        assert!(!check.can_publish);
        assert_eq!(check.status, ProductStatus::Draft);
        assert!(!check.published);
    }

    #[test]
    fn test_simple_publish_half_configured_is_refused() {
        assert!(!validate_publish(&simple_product(Some(10), None), true).can_publish);
        assert!(!validate_publish(&simple_product(None, Some(5)), true).can_publish);
    }

    #[test]
    fn test_simple_unpublish_archives() {
        let check = validate_publish(&simple_product(Some(10), Some(5)), false);
        assert!(check.can_publish);
        assert_eq!(check.status, ProductStatus::Archived);
        assert!(!check.published);
    }

    #[test]
    fn test_variant_publish_without_variants_is_refused() {
        let check = validate_publish(&variant_product(vec![]), true);
        assert!(!check.can_publish);
        assert!(!check.published);
    }

    #[test]
    fn test_variant_publish_with_sellable_variant() {
        let check = validate_publish(
            &variant_product(vec![
                variant(ProductStatus::Selling, true),
                variant(ProductStatus::Draft, false),
            ]),
            true,
        );
        assert!(check.can_publish);
        assert_eq!(check.status, ProductStatus::Selling);
    }

    #[test]
    fn test_variant_publish_without_sellable_variant_flags_out_of_stock() {
        let check = validate_publish(
            &variant_product(vec![
                variant(ProductStatus::OutOfStock, true),
                variant(ProductStatus::Draft, false),
            ]),
            true,
        );
        assert!(check.can_publish);
        assert_eq!(check.status, ProductStatus::OutOfStock);
        assert!(check.published);
    }

    #[test]
    fn test_variant_unpublish_archives() {
        let check = validate_publish(
            &variant_product(vec![variant(ProductStatus::Selling, true)]),
            false,
        );
        assert!(check.can_publish);
        assert_eq!(check.status, ProductStatus::Archived);
        assert!(!check.published);
    }
}
