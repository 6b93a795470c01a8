//! Product Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

pub type ProductId = RecordId;

/// Product type: physical goods track stock, digital goods never do
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Physical,
    Digital,
}

/// Product structure: simple products carry their own stock fields,
/// variant products delegate stock entirely to their variants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductStructure {
    Simple,
    Variant,
}

/// Sale status for products and variants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Selling,
    LowStock,
    OutOfStock,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Selling => "selling",
            Self::LowStock => "low_stock",
            Self::OutOfStock => "out_of_stock",
            Self::Archived => "archived",
        }
    }
}

/// Variant embedded within a variant-structured product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// Embedded sub-document id (uuid string)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default = "default_draft")]
    pub status: ProductStatus,
    #[serde(default)]
    pub published: bool,
}

fn default_draft() -> ProductStatus {
    ProductStatus::Draft
}

/// Product model
///
/// Top-level `status`/`published` and the stock mirrors (`base_stock`,
/// `min_stock`) are owned by the sync orchestrator for variant products;
/// only simple products carry them as primary data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub name: String,
    pub product_type: ProductType,
    pub product_structure: ProductStructure,
    pub price: Option<Decimal>,
    pub base_stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub status: Option<ProductStatus>,
    pub published: Option<bool>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Structural shape of a product, used for exhaustive dispatch in the
/// publication gate and the sync orchestrator
#[derive(Debug)]
pub enum ProductShape<'a> {
    Digital,
    Simple {
        base_stock: Option<i64>,
        min_stock: Option<i64>,
    },
    Variant {
        variants: &'a [Variant],
    },
}

impl Product {
    /// Classify this product into its structural shape.
    ///
    /// Digital wins over structure: a digital product never tracks stock,
    /// whatever its structure field says.
    pub fn shape(&self) -> ProductShape<'_> {
        if self.product_type == ProductType::Digital {
            return ProductShape::Digital;
        }
        match self.product_structure {
            ProductStructure::Simple => ProductShape::Simple {
                base_stock: self.base_stock,
                min_stock: self.min_stock,
            },
            ProductStructure::Variant => ProductShape::Variant {
                variants: &self.variants,
            },
        }
    }

    /// Find an embedded variant by id
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }
}

/// Variant payload on product create/update; `id` is kept when present so
/// edits preserve existing variant identities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantInput {
    pub id: Option<String>,
    pub name: String,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub product_type: ProductType,
    pub product_structure: ProductStructure,
    pub price: Option<Decimal>,
    pub base_stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub variants: Option<Vec<VariantInput>>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub base_stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub variants: Option<Vec<VariantInput>>,
    pub sort_order: Option<i32>,
}
