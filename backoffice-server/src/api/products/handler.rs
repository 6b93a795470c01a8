//! Product API Handlers
//!
//! Product create/edit are stock-aware call sites: after the primary write
//! commits, the stock service mirrors the configuration into the ledger and
//! triggers synchronization. A sync failure never fails the request.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::ProductRepository;
use crate::stock::publication::{PublicationCheck, validate_publish};
use crate::stock::service::StockService;
use crate::utils::{AppError, AppResult};

/// GET /api/products - list all products
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_all().await?;
    Ok(Json(products))
}

/// GET /api/products/:id - fetch one product
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(product))
}

/// POST /api/products - create a product
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let service = StockService::new(state.db.clone());

    let product = repo.create(payload).await?;

    // Mirror stock configuration into the ledger and sync. Best effort: the
    // product exists either way, reconciliation repairs any miss.
    if let Err(e) = service.ensure_entries_for_product(&product, "admin").await {
        let id = product.id.as_ref().map(|i| i.to_string()).unwrap_or_default();
        tracing::warn!(product = %id, error = %e, "Stock ledger sync failed after product create");
    }

    let id = product.id.as_ref().map(|i| i.to_string()).unwrap_or_default();
    let product = repo.find_by_id(&id).await?.unwrap_or(product);
    Ok(Json(product))
}

/// PUT /api/products/:id - update a product
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let service = StockService::new(state.db.clone());

    let product = repo.update(&id, payload).await?;

    if let Err(e) = service.ensure_entries_for_product(&product, "admin").await {
        tracing::warn!(product = %id, error = %e, "Stock ledger sync failed after product update");
    }

    let product = repo.find_by_id(&id).await?.unwrap_or(product);
    Ok(Json(product))
}

/// DELETE /api/products/:id - delete a product and its ledger records
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ProductRepository::new(state.db.clone());
    let service = StockService::new(state.db.clone());

    repo.delete(&id).await?;

    if let Err(e) = service.remove_entries_for_product(&id).await {
        // Leftovers are orphans; the reconciler removes them
        tracing::warn!(product = %id, error = %e, "Failed to remove ledger records for deleted product");
    }

    Ok(Json(true))
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

/// PUT /api/products/:id/publish - validate and apply a publish toggle
///
/// A refusal is an expected outcome, returned as a structured result with
/// HTTP 200, not an error.
pub async fn publish(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PublishRequest>,
) -> AppResult<Json<PublicationCheck>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;

    let check = validate_publish(&product, payload.published);
    if check.can_publish {
        repo.write_publication(&id, check.status, check.published)
            .await?;
    } else {
        tracing::info!(
            product = %id,
            reason = %check.message,
            "Publish request refused by publication gate"
        );
    }

    Ok(Json(check))
}
