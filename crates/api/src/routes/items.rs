//! Item catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{Item, ItemId};
use serde::{Deserialize, Serialize};
use store::ShopStore;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub price: i64,
    pub stock_quantity: u32,
    pub author: String,
    pub isbn: String,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub name: String,
    pub price: i64,
    pub stock_quantity: u32,
}

#[derive(Serialize)]
pub struct CreateItemResponse {
    pub id: ItemId,
}

/// POST /api/v1/items — add a book to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<CreateItemResponse>), ApiError> {
    let item = Item::book(req.name, req.price, req.stock_quantity, req.author, req.isbn);
    let id = state.item_service.save_item(item).await?;

    Ok((StatusCode::CREATED, Json(CreateItemResponse { id })))
}

/// GET /api/v1/items — list the catalog.
#[tracing::instrument(skip(state))]
pub async fn list<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(state.item_service.items().await?))
}

/// PUT /api/v1/items/{id} — update catalog fields, returns the new state.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Item>, ApiError> {
    let id = ItemId::from_uuid(id);
    state
        .item_service
        .update_item(id, &req.name, req.price, req.stock_quantity)
        .await?;

    Ok(Json(state.item_service.item(id).await?))
}
