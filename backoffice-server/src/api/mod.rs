//! API route modules
//!
//! # Structure
//!
//! - [`health`] - health checks
//! - [`products`] - product admin CRUD and publish toggle
//! - [`stock`] - stock ledger CRUD, bulk operations, low-stock report, export
//! - [`orders`] - order admin and status transitions

pub mod health;

// Data models API
pub mod orders;
pub mod products;
pub mod stock;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
