//! Order endpoints.
//!
//! The list ladder serves the same data through different projections:
//! v1 ships the entity graph as-is, v2/v3/v3.1 map to a nested DTO while
//! varying the store's fetch strategy underneath, and v4 returns the flat
//! projection straight from the query side.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domain::{Address, DeliveryStatus, ItemId, MemberId, OrderId, OrderStatus};
use serde::{Deserialize, Serialize};
use store::{OrderDetail, OrderGraph, OrderSearch, ShopStore};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub member_id: MemberId,
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Search filters shared by every order listing.
#[derive(Debug, Default, Deserialize)]
pub struct OrderSearchParams {
    pub status: Option<String>,
    pub member_name: Option<String>,
}

impl OrderSearchParams {
    /// Converts the raw query parameters into a store filter.
    pub fn into_search(self) -> Result<OrderSearch, ApiError> {
        let mut search = OrderSearch::default();
        if let Some(raw) = self.status {
            let status = OrderStatus::from_str(&raw).map_err(ApiError::BadRequest)?;
            search = search.status(status);
        }
        if let Some(name) = self.member_name {
            search = search.member_name(name);
        }
        Ok(search)
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderPlacedResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

#[derive(Serialize)]
pub struct DeliveryStatusResponse {
    pub order_id: OrderId,
    pub delivery_status: DeliveryStatus,
}

/// Nested order DTO: header fields flattened, lines kept as a collection.
#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub member_name: String,
    pub ordered_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub address: Address,
    pub lines: Vec<OrderLineResponse>,
    pub total_price: i64,
}

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub item_id: ItemId,
    pub order_price: i64,
    pub quantity: u32,
}

impl From<OrderGraph> for OrderResponse {
    fn from(graph: OrderGraph) -> Self {
        let lines = graph
            .order
            .lines()
            .iter()
            .map(|line| OrderLineResponse {
                item_id: line.item_id,
                order_price: line.order_price,
                quantity: line.quantity,
            })
            .collect();

        OrderResponse {
            order_id: graph.order.id(),
            member_name: graph.member.name,
            ordered_at: graph.order.ordered_at(),
            status: graph.order.status(),
            address: graph.order.delivery().address.clone(),
            total_price: graph.order.total_price(),
            lines,
        }
    }
}

// -- Handlers --

/// POST /api/v1/orders — place an order.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderPlacedResponse>), ApiError> {
    let order_id = state
        .order_service
        .place(req.member_id, req.item_id, req.quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderPlacedResponse {
            order_id,
            status: OrderStatus::Ordered,
        }),
    ))
}

/// GET /api/v1/orders/{id} — load one order graph.
#[tracing::instrument(skip(state))]
pub async fn get<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<domain::Order>, ApiError> {
    let order = state
        .order_service
        .order(OrderId::from_uuid(id))
        .await?;
    Ok(Json(order))
}

/// POST /api/v1/orders/{id}/cancel — cancel an order, restoring stock.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderPlacedResponse>, ApiError> {
    let order_id = OrderId::from_uuid(id);
    state.order_service.cancel(order_id).await?;

    Ok(Json(OrderPlacedResponse {
        order_id,
        status: OrderStatus::Cancelled,
    }))
}

/// POST /api/v1/orders/{id}/delivery/complete — mark the delivery done.
#[tracing::instrument(skip(state))]
pub async fn complete_delivery<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryStatusResponse>, ApiError> {
    let order_id = OrderId::from_uuid(id);
    state.order_service.complete_delivery(order_id).await?;

    Ok(Json(DeliveryStatusResponse {
        order_id,
        delivery_status: DeliveryStatus::Completed,
    }))
}

/// GET /api/v1/orders — raw entity graphs.
#[tracing::instrument(skip(state))]
pub async fn list_v1<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderSearchParams>,
) -> Result<Json<Vec<OrderGraph>>, ApiError> {
    let search = params.into_search()?;
    Ok(Json(state.store.orders(&search).await?))
}

/// GET /api/v2/orders — nested DTO, one line read per order underneath.
#[tracing::instrument(skip(state))]
pub async fn list_v2<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderSearchParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let search = params.into_search()?;
    let graphs = state.store.orders(&search).await?;
    Ok(Json(graphs.into_iter().map(OrderResponse::from).collect()))
}

/// GET /api/v3/orders — same DTO, single joined read underneath.
#[tracing::instrument(skip(state))]
pub async fn list_v3<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderSearchParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let search = params.into_search()?;
    let graphs = state.store.orders_with_lines(&search).await?;
    Ok(Json(graphs.into_iter().map(OrderResponse::from).collect()))
}

/// GET /api/v3.1/orders — same DTO, paged base read plus one batched line
/// read underneath.
#[tracing::instrument(skip(state))]
pub async fn list_v3_paged<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderSearchParams>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let search = params.into_search()?;
    let graphs = state
        .store
        .orders_paged(&search, page.offset, page.limit)
        .await?;
    Ok(Json(graphs.into_iter().map(OrderResponse::from).collect()))
}

/// GET /api/v4/orders — flat projection straight from the query side.
#[tracing::instrument(skip(state))]
pub async fn list_v4<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderSearchParams>,
) -> Result<Json<Vec<OrderDetail>>, ApiError> {
    let search = params.into_search()?;
    Ok(Json(state.store.order_details(&search).await?))
}
