//! Product catalog route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use shop_core::ProductId;

use super::extract::{Valid, ValidId};
use crate::error::Result;
use crate::models::{CreateProductInput, DecrementStockInput, Product, UpdateProductInput};
use crate::state::AppState;

/// List every product.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().list_products().await?))
}

/// Show one product.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn show(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().get_product(ProductId::new(id)).await?))
}

/// Create a product.
///
/// # Errors
///
/// Returns 400 if the body fails validation.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Valid(input): Valid<CreateProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog().create_product(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update the fields present in the body.
///
/// # Errors
///
/// Returns 400 if a present field fails validation, 404 if the product does
/// not exist.
#[instrument(skip_all, fields(product_id = id))]
pub async fn update(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    Valid(input): Valid<UpdateProductInput>,
) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .update_product(ProductId::new(id), input)
        .await?;
    Ok(Json(product))
}

/// Delete a product.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip_all, fields(product_id = id))]
pub async fn destroy(State(state): State<AppState>, ValidId(id): ValidId) -> Result<StatusCode> {
    state.catalog().delete_product(ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove `quantity` units from a product's stock.
///
/// # Errors
///
/// Returns 400 if the product has fewer units, 404 if it does not exist.
#[instrument(skip_all, fields(product_id = id))]
pub async fn decrement_stock(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    Valid(input): Valid<DecrementStockInput>,
) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .decrement_stock(ProductId::new(id), input)
        .await?;
    Ok(Json(product))
}
