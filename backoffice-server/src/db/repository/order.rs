//! Order Repository

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Order, OrderCreate, OrderLineItem, OrderStatus};
use chrono::{DateTime, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

pub const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all orders, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = record_id(ORDER_TABLE, id)?;
        let order: Option<Order> = self
            .base
            .db()
            .select((ORDER_TABLE, rid.key().to_string()))
            .await?;
        Ok(order)
    }

    /// Create a new pending order
    pub async fn create(&self, data: OrderCreate) -> RepoResult<Order> {
        if data.items.is_empty() {
            return Err(RepoError::Validation("order has no line items".into()));
        }
        if data.items.iter().any(|i| i.quantity <= 0) {
            return Err(RepoError::Validation(
                "line item quantity must be positive".into(),
            ));
        }

        #[derive(serde::Serialize)]
        struct InternalOrder {
            reference: String,
            status: OrderStatus,
            items: Vec<OrderLineItem>,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        let now = Utc::now();
        let reference = data.reference.unwrap_or_else(|| {
            let uuid = Uuid::new_v4().simple().to_string();
            format!("ORD-{}", &uuid[..8].to_uppercase())
        });

        let order = InternalOrder {
            reference,
            status: OrderStatus::Pending,
            items: data.items,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Write a new order status
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> RepoResult<Order> {
        let rid = record_id(ORDER_TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $status, updated_at = $updated_at RETURN AFTER")
            .bind(("thing", rid))
            .bind(("status", status))
            .bind(("updated_at", Utc::now()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Hard delete an order
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = record_id(ORDER_TABLE, id)?;
        let result: Option<Order> = self
            .base
            .db()
            .delete((ORDER_TABLE, rid.key().to_string()))
            .await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Order {} not found", id)));
        }
        Ok(())
    }
}
