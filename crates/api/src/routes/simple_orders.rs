//! Order listings without the line collection, member and delivery only.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use domain::{Address, OrderId, OrderStatus};
use serde::Serialize;
use store::{OrderGraph, OrderSummary, ShopStore};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::orders::OrderSearchParams;

/// Header-only order DTO, mapped from the loaded graph.
#[derive(Serialize)]
pub struct SimpleOrderResponse {
    pub order_id: OrderId,
    pub member_name: String,
    pub ordered_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub address: Address,
}

impl From<OrderGraph> for SimpleOrderResponse {
    fn from(graph: OrderGraph) -> Self {
        SimpleOrderResponse {
            order_id: graph.order.id(),
            member_name: graph.member.name,
            ordered_at: graph.order.ordered_at(),
            status: graph.order.status(),
            address: graph.order.delivery().address.clone(),
        }
    }
}

/// GET /api/v1/simple-orders — raw entity graphs.
#[tracing::instrument(skip(state))]
pub async fn list_v1<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderSearchParams>,
) -> Result<Json<Vec<OrderGraph>>, ApiError> {
    let search = params.into_search()?;
    Ok(Json(state.store.orders(&search).await?))
}

/// GET /api/v2/simple-orders — DTO mapped in the handler from the full
/// graphs; loads lines it never ships.
#[tracing::instrument(skip(state))]
pub async fn list_v2<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderSearchParams>,
) -> Result<Json<Vec<SimpleOrderResponse>>, ApiError> {
    let search = params.into_search()?;
    let graphs = state.store.orders(&search).await?;
    Ok(Json(
        graphs.into_iter().map(SimpleOrderResponse::from).collect(),
    ))
}

/// GET /api/v4/simple-orders — the column-trimmed flat projection; the
/// store reads only what this response ships.
#[tracing::instrument(skip(state))]
pub async fn list_v4<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderSearchParams>,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let search = params.into_search()?;
    Ok(Json(state.store.order_summaries(&search).await?))
}
