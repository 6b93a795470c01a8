//! Stock API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{StockEntry, StockEntryCreate, StockEntryUpdate};
use crate::stock::export::{StockExporter, rows_to_csv};
use crate::stock::reconcile::{BulkSyncReport, SyncFilter};
use crate::stock::service::{BulkStockUpdateItem, BulkUpdateReport, LowStockRow, StockService};
use crate::utils::{AppError, AppResult};

/// GET /api/stock - list all ledger entries
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<StockEntry>>> {
    let service = StockService::new(state.db.clone());
    let entries = service.list_entries().await?;
    Ok(Json(entries))
}

/// GET /api/stock/:id - fetch one entry
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<StockEntry>> {
    let service = StockService::new(state.db.clone());
    let entry = service
        .get_entry(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Stock entry {}", id)))?;
    Ok(Json(entry))
}

/// POST /api/stock - create an entry for a product or variant
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StockEntryCreate>,
) -> AppResult<Json<StockEntry>> {
    let service = StockService::new(state.db.clone());
    let entry = service.create_entry(payload).await?;
    Ok(Json(entry))
}

/// PUT /api/stock/:id - update an entry; synchronization runs best-effort
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockEntryUpdate>,
) -> AppResult<Json<StockEntry>> {
    let service = StockService::new(state.db.clone());
    let entry = service.update_entry(&id, payload).await?;
    Ok(Json(entry))
}

/// DELETE /api/stock/:id - delete an entry; the owning slot is forced to a
/// sold-out state
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let service = StockService::new(state.db.clone());
    service.delete_entry(&id).await?;
    Ok(Json(true))
}

/// PUT /api/stock/bulk - apply a batch of entry updates
pub async fn bulk_update(
    State(state): State<ServerState>,
    Json(items): Json<Vec<BulkStockUpdateItem>>,
) -> AppResult<Json<BulkUpdateReport>> {
    let service = StockService::new(state.db.clone());
    let report = service.bulk_update(items).await;
    Ok(Json(report))
}

/// POST /api/stock/sync - re-run synchronization over the ledger
pub async fn bulk_sync(
    State(state): State<ServerState>,
    payload: Option<Json<SyncFilter>>,
) -> AppResult<Json<BulkSyncReport>> {
    let filter = payload.map(|Json(f)| f).unwrap_or_default();
    let service = StockService::new(state.db.clone());
    let report = service.bulk_sync(&filter).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub multiplier: Option<f64>,
}

/// GET /api/stock/low - entries at or below their reorder threshold
pub async fn low_stock(
    State(state): State<ServerState>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<LowStockRow>>> {
    let service = StockService::new(state.db.clone());
    let rows = service
        .list_low_stock(query.multiplier.unwrap_or(1.0))
        .await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// GET /api/stock/export?format=csv|json - flat ledger export
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let exporter = StockExporter::new(state.db.clone());
    let rows = exporter.rows().await?;

    match query.format.as_deref().unwrap_or("json") {
        "csv" => {
            let body = rows_to_csv(&rows);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"stock_export.csv\"",
                    ),
                ],
                body,
            )
                .into_response())
        }
        "json" => Ok(Json(rows).into_response()),
        other => Err(AppError::invalid(format!(
            "Unsupported export format: {}",
            other
        ))),
    }
}
