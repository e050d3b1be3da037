//! HTTP route handlers for the shop API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (store reachable)
//!
//! # Products
//! GET    /api/products              - Product listing
//! POST   /api/products              - Create product (201)
//! GET    /api/products/{id}         - Product detail
//! PUT    /api/products/{id}         - Partial update
//! DELETE /api/products/{id}         - Delete product (204)
//! PUT    /api/products/{id}/stock   - Remove units from stock
//!
//! # Orders
//! GET    /api/orders                - Order listing, newest first
//! POST   /api/orders                - Place order (201)
//! GET    /api/orders/{id}           - Order detail
//! PUT    /api/orders/{id}/status    - Change order status
//! ```

pub mod extract;
pub mod health;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route("/{id}/stock", put(products::decrement_stock))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create all routes for the shop API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route".to_owned())
}
