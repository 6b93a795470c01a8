//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{
    Product, ProductCreate, ProductStatus, ProductStructure, ProductType, ProductUpdate, Variant,
    VariantInput,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

pub const PRODUCT_TABLE: &str = "product";

/// Partial write of the stock-owned product fields, applied by the sync
/// orchestrator. Only fields set here are written.
#[derive(Debug, Default)]
pub struct StockStateWrite {
    pub base_stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub status: Option<ProductStatus>,
    pub published: Option<bool>,
    pub variants: Option<Vec<Variant>>,
}

impl StockStateWrite {
    pub fn is_empty(&self) -> bool {
        self.base_stock.is_none()
            && self.min_stock.is_none()
            && self.status.is_none()
            && self.published.is_none()
            && self.variants.is_none()
    }
}

// =============================================================================
// Product Repository
// =============================================================================

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all products
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY sort_order")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = record_id(PRODUCT_TABLE, id)?;
        let product: Option<Product> = self
            .base
            .db()
            .select((PRODUCT_TABLE, rid.key().to_string()))
            .await?;
        Ok(product)
    }

    /// Create a new product
    ///
    /// Stock-owned fields are normalized by shape: variant products never
    /// carry user-supplied top-level stock fields, digital products never
    /// carry stock at all. `status`/`published` are not client inputs; they
    /// start at their resting values and are owned by the gate and the
    /// orchestrator from then on.
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.product_structure == ProductStructure::Variant
            && data.product_type == ProductType::Digital
        {
            return Err(RepoError::Validation(
                "digital products cannot have variants".into(),
            ));
        }

        let is_variant = data.product_structure == ProductStructure::Variant;
        let is_digital = data.product_type == ProductType::Digital;

        let variants = if is_variant {
            let inputs = data.variants.unwrap_or_default();
            inputs.into_iter().map(|v| materialize_variant(v, None)).collect()
        } else {
            Vec::new()
        };

        // Internal struct without the id field so SurrealDB assigns one
        #[derive(serde::Serialize)]
        struct InternalProduct {
            name: String,
            product_type: ProductType,
            product_structure: ProductStructure,
            price: Option<Decimal>,
            base_stock: Option<i64>,
            min_stock: Option<i64>,
            status: Option<ProductStatus>,
            published: Option<bool>,
            variants: Vec<Variant>,
            sort_order: i32,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        let now = Utc::now();
        let product = InternalProduct {
            name: data.name,
            product_type: data.product_type,
            product_structure: data.product_structure,
            price: data.price,
            base_stock: if is_variant || is_digital { None } else { data.base_stock },
            min_stock: if is_variant || is_digital { None } else { data.min_stock },
            status: if is_variant {
                None
            } else if is_digital {
                Some(ProductStatus::Selling)
            } else {
                Some(ProductStatus::Draft)
            },
            published: if is_variant { None } else { Some(false) },
            variants,
            sort_order: data.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    ///
    /// When a variant list is supplied it replaces the existing one;
    /// id-matched variants keep their stock state for fields the input
    /// omits, new variants start as draft.
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let rid = record_id(PRODUCT_TABLE, id)?;

        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        let is_variant = existing.product_structure == ProductStructure::Variant;
        let is_digital = existing.product_type == ProductType::Digital;

        let merged_variants: Option<Vec<Variant>> = if is_variant {
            data.variants.map(|inputs| {
                inputs
                    .into_iter()
                    .map(|input| {
                        let prior = input
                            .id
                            .as_deref()
                            .and_then(|vid| existing.variant(vid));
                        materialize_variant(input, prior)
                    })
                    .collect()
            })
        } else {
            None
        };

        // Build dynamic SET clauses with proper type bindings
        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.sort_order.is_some() {
            set_parts.push("sort_order = $sort_order");
        }
        if !is_variant && !is_digital {
            if data.base_stock.is_some() {
                set_parts.push("base_stock = $base_stock");
            }
            if data.min_stock.is_some() {
                set_parts.push("min_stock = $min_stock");
            }
        }
        if merged_variants.is_some() {
            set_parts.push("variants = $variants");
        }

        if set_parts.is_empty() {
            return Ok(existing);
        }
        set_parts.push("updated_at = $updated_at");

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("thing", rid))
            .bind(("updated_at", Utc::now()));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.sort_order {
            query = query.bind(("sort_order", v));
        }
        if !is_variant && !is_digital {
            if let Some(v) = data.base_stock {
                query = query.bind(("base_stock", v));
            }
            if let Some(v) = data.min_stock {
                query = query.bind(("min_stock", v));
            }
        }
        if let Some(v) = merged_variants {
            query = query.bind(("variants", v));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = record_id(PRODUCT_TABLE, id)?;
        let result: Option<Product> = self
            .base
            .db()
            .delete((PRODUCT_TABLE, rid.key().to_string()))
            .await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }

    /// Apply a partial write of the stock-owned fields (orchestrator only)
    pub async fn write_stock_state(
        &self,
        id: &surrealdb::RecordId,
        write: StockStateWrite,
    ) -> RepoResult<()> {
        if write.is_empty() {
            return Ok(());
        }

        let mut set_parts: Vec<&str> = Vec::new();
        if write.base_stock.is_some() {
            set_parts.push("base_stock = $base_stock");
        }
        if write.min_stock.is_some() {
            set_parts.push("min_stock = $min_stock");
        }
        if write.status.is_some() {
            set_parts.push("status = $status");
        }
        if write.published.is_some() {
            set_parts.push("published = $published");
        }
        if write.variants.is_some() {
            set_parts.push("variants = $variants");
        }
        set_parts.push("updated_at = $updated_at");

        let query_str = format!("UPDATE $thing SET {}", set_parts.join(", "));
        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("thing", id.clone()))
            .bind(("updated_at", Utc::now()));

        if let Some(v) = write.base_stock {
            query = query.bind(("base_stock", v));
        }
        if let Some(v) = write.min_stock {
            query = query.bind(("min_stock", v));
        }
        if let Some(v) = write.status {
            query = query.bind(("status", v));
        }
        if let Some(v) = write.published {
            query = query.bind(("published", v));
        }
        if let Some(v) = write.variants {
            query = query.bind(("variants", v));
        }

        query.await?;
        Ok(())
    }

    /// Persist a publication gate result
    pub async fn write_publication(
        &self,
        id: &str,
        status: ProductStatus,
        published: bool,
    ) -> RepoResult<Product> {
        let rid = record_id(PRODUCT_TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $status, published = $published, updated_at = $updated_at RETURN AFTER")
            .bind(("thing", rid))
            .bind(("status", status))
            .bind(("published", published))
            .bind(("updated_at", Utc::now()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }
}

/// Build an embedded Variant from its input, carrying stock state over from
/// a prior version of the same variant where the input is silent
fn materialize_variant(input: VariantInput, prior: Option<&Variant>) -> Variant {
    let id = input
        .id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    Variant {
        id,
        name: input.name,
        price: input
            .price
            .or(prior.map(|p| p.price))
            .unwrap_or_default(),
        stock: input
            .stock
            .or(prior.map(|p| p.stock))
            .unwrap_or(0),
        min_stock: input
            .min_stock
            .or(prior.map(|p| p.min_stock))
            .unwrap_or(0),
        status: prior.map(|p| p.status).unwrap_or(ProductStatus::Draft),
        published: input
            .published
            .or(prior.map(|p| p.published))
            .unwrap_or(false),
    }
}
