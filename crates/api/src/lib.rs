//! HTTP API for the order-management backend.
//!
//! Exposes member registration, the item catalog and the order lifecycle
//! over JSON, with several response-shape variants of the order listing
//! demonstrating entity-vs-DTO projection and the store's fetch
//! strategies.

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use service::{ItemService, MemberService, OrderService};
use store::ShopStore;

/// Shared application state accessible from all handlers.
pub struct AppState<S: ShopStore> {
    pub member_service: MemberService<S>,
    pub item_service: ItemService<S>,
    pub order_service: OrderService<S>,
    /// The list endpoints read the store directly; the query side has no
    /// use-case logic to go through.
    pub store: S,
}

/// Builds the application state for a store.
pub fn create_state<S: ShopStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        member_service: MemberService::new(store.clone()),
        item_service: ItemService::new(store.clone()),
        order_service: OrderService::new(store.clone()),
        store,
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ShopStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/v1/members",
            post(routes::members::create_v1::<S>).get(routes::members::list_v1::<S>),
        )
        .route(
            "/api/v2/members",
            post(routes::members::create_v2::<S>).get(routes::members::list_v2::<S>),
        )
        .route("/api/v2/members/{id}", put(routes::members::update_v2::<S>))
        .route(
            "/api/v1/items",
            post(routes::items::create::<S>).get(routes::items::list::<S>),
        )
        .route("/api/v1/items/{id}", put(routes::items::update::<S>))
        .route(
            "/api/v1/orders",
            post(routes::orders::create::<S>).get(routes::orders::list_v1::<S>),
        )
        .route("/api/v1/orders/{id}", get(routes::orders::get::<S>))
        .route("/api/v1/orders/{id}/cancel", post(routes::orders::cancel::<S>))
        .route(
            "/api/v1/orders/{id}/delivery/complete",
            post(routes::orders::complete_delivery::<S>),
        )
        .route("/api/v2/orders", get(routes::orders::list_v2::<S>))
        .route("/api/v3/orders", get(routes::orders::list_v3::<S>))
        .route("/api/v3.1/orders", get(routes::orders::list_v3_paged::<S>))
        .route("/api/v4/orders", get(routes::orders::list_v4::<S>))
        .route(
            "/api/v1/simple-orders",
            get(routes::simple_orders::list_v1::<S>),
        )
        .route(
            "/api/v2/simple-orders",
            get(routes::simple_orders::list_v2::<S>),
        )
        .route(
            "/api/v4/simple-orders",
            get(routes::simple_orders::list_v4::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
