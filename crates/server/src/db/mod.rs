//! Persistence for the product catalog and orders.
//!
//! # Units of work
//!
//! Every store access happens inside a [`UnitOfWork`] obtained from
//! [`Database::begin`]. A unit of work exposes the [`CatalogStore`] and
//! [`OrderStore`] operations and ends with [`UnitOfWork::commit`] or
//! [`UnitOfWork::rollback`]. Dropping it without committing rolls back.
//!
//! # Backends
//!
//! - [`postgres::PgDatabase`] - `PostgreSQL` via sqlx; product rows read for
//!   mutation are locked with `FOR UPDATE`
//! - [`memory::MemoryDatabase`] - in-process store; units of work are
//!   serialized behind a single mutex
//!
//! # Tables
//!
//! - `products` - Catalog with `CHECK (stock >= 0)`
//! - `orders` - Orders with the `order_status` enum
//! - `order_items` - Line items with the unit price at placement time
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p shop-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shop_core::{OrderId, ProductId};

use crate::models::{CreateProductInput, NewOrder, Order, OrderUpdate, Product};

pub use memory::MemoryDatabase;
pub use postgres::PgDatabase;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a `CHECK` on stock).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Product operations scoped to a unit of work.
#[async_trait]
pub trait CatalogStore: Send {
    /// All products ordered by id.
    async fn list_products(&mut self) -> Result<Vec<Product>, RepositoryError>;

    /// Look up a product. The row stays locked until the unit of work ends.
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a new product and return it with its assigned id.
    async fn insert_product(
        &mut self,
        input: &CreateProductInput,
    ) -> Result<Product, RepositoryError>;

    /// Persist every mutable field of `product` and return the stored row.
    ///
    /// Returns `RepositoryError::NotFound` if the product no longer exists.
    async fn save_product(&mut self, product: &Product) -> Result<Product, RepositoryError>;

    /// Delete a product. Returns `false` if it did not exist.
    async fn delete_product(&mut self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Order operations scoped to a unit of work.
#[async_trait]
pub trait OrderStore: Send {
    /// Insert an order with its line items.
    async fn create_order(&mut self, order: &NewOrder) -> Result<Order, RepositoryError>;

    /// Look up an order with its line items. The row stays locked until the
    /// unit of work ends.
    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Apply `fields` to an order. Returns `false` if it did not exist.
    async fn update_order(
        &mut self,
        id: OrderId,
        fields: &OrderUpdate,
    ) -> Result<bool, RepositoryError>;

    /// All orders with their line items, newest first.
    async fn list_orders(&mut self) -> Result<Vec<Order>, RepositoryError>;
}

/// An atomic, isolated set of store operations.
#[async_trait]
pub trait UnitOfWork: CatalogStore + OrderStore {
    /// Make every change durable.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    /// Discard every change.
    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// A store that hands out units of work.
#[async_trait]
pub trait Database: Send + Sync {
    /// Start a unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// End a unit of work according to `result`: commit on `Ok`, roll back on `Err`.
///
/// A failed rollback is logged and the original error is returned.
///
/// # Errors
///
/// Returns the error in `result`, or the commit error converted into `E`.
pub async fn complete<T, E>(uow: Box<dyn UnitOfWork>, result: Result<T, E>) -> Result<T, E>
where
    E: From<RepositoryError>,
{
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
