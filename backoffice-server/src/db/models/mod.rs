//! Database Models

// Serde helpers
pub mod serde_helpers;

// Catalog
pub mod product;

// Stock ledger
pub mod stock_entry;

// Orders
pub mod order;

// Re-exports
pub use order::{Order, OrderCreate, OrderId, OrderLineItem, OrderStatus};
pub use product::{
    Product, ProductCreate, ProductId, ProductShape, ProductStatus, ProductStructure, ProductType,
    ProductUpdate, Variant, VariantInput,
};
pub use stock_entry::{StockEntry, StockEntryCreate, StockEntryId, StockEntryUpdate};
