//! Order route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use shop_core::OrderId;

use super::extract::{Valid, ValidId};
use crate::error::Result;
use crate::models::{Order, PlaceOrderInput, UpdateStatusInput};
use crate::state::AppState;

/// List orders, newest first.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_orders().await?))
}

/// Show one order with its line items.
///
/// # Errors
///
/// Returns 404 if the order does not exist.
pub async fn show(State(state): State<AppState>, ValidId(id): ValidId) -> Result<Json<Order>> {
    Ok(Json(state.orders().get_order(OrderId::new(id)).await?))
}

/// Place an order.
///
/// # Errors
///
/// Returns 400 if the body fails validation, a product is missing or stock
/// is insufficient. Nothing is recorded in any of those cases.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Valid(input): Valid<PlaceOrderInput>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.orders().place_order(&input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Change an order's status.
///
/// # Errors
///
/// Returns 404 if the order does not exist and 409 if the order is already
/// in another terminal status.
#[instrument(skip_all, fields(order_id = id, status = %input.status))]
pub async fn update_status(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    Valid(input): Valid<UpdateStatusInput>,
) -> Result<Json<Order>> {
    let order = state
        .orders()
        .update_status(OrderId::new(id), input.status)
        .await?;
    Ok(Json(order))
}
