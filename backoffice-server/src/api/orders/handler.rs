//! Order API Handlers
//!
//! The status endpoint is the dispatch call site: a transition into
//! `dispatched` runs the stock deduction before the status is persisted.
//! Deduction failures are reported per line item and never block the
//! transition.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderStatus};
use crate::db::repository::OrderRepository;
use crate::stock::dispatch::DispatchReport;
use crate::stock::service::StockService;
use crate::utils::{AppError, AppResult};

/// GET /api/orders - list all orders
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.find_all().await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - fetch one order
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;
    Ok(Json(order))
}

/// POST /api/orders - create a pending order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo.create(payload).await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub order: Order,
    /// Present only when this change was the dispatch transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchReport>,
}

/// PUT /api/orders/:id/status - change an order's status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusRequest>,
) -> AppResult<Json<StatusResponse>> {
    let repo = OrderRepository::new(state.db.clone());
    let service = StockService::new(state.db.clone());

    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

    // Deduct stock exactly once, on the transition into dispatched
    let dispatch = service
        .handle_order_status_change(&order, payload.status)
        .await;

    let order = repo.update_status(&id, payload.status).await?;

    Ok(Json(StatusResponse { order, dispatch }))
}
