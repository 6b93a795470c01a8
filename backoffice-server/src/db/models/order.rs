//! Order Model
//!
//! Minimal back-office order shape; only the status transition into
//! `dispatched` concerns the stock subsystem.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

pub type OrderId = RecordId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Dispatched,
    Delivered,
    Cancelled,
}

/// One ordered line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub variant_id: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    /// Human-readable order number
    pub reference: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderLineItem>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub reference: Option<String>,
    pub items: Vec<OrderLineItem>,
}
