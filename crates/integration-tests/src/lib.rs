//! Integration tests for the shop service.
//!
//! # Running Tests
//!
//! ```bash
//! export SHOP_TEST_DATABASE_URL=postgres://localhost/shop_test
//! cargo test -p shop-integration-tests -- --ignored
//! ```
//!
//! Each test connects to the database named by `SHOP_TEST_DATABASE_URL`
//! (falling back to `DATABASE_URL`) and applies pending migrations first.
//! Tests share the database, so every test works only with rows it created.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;

use shop_core::Price;
use shop_server::db::{self, Database, PgDatabase, postgres::MIGRATOR};
use shop_server::models::{CreateProductInput, Product};
use shop_server::services::{CatalogService, OrderService};

/// Services wired to a migrated test database.
pub struct TestContext {
    pub pool: PgPool,
    pub db: Arc<dyn Database>,
    pub catalog: CatalogService,
    pub orders: OrderService,
}

impl TestContext {
    /// Connect, migrate and build the services.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();
        let url = std::env::var("SHOP_TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("SHOP_TEST_DATABASE_URL must be set");

        let pool = db::create_pool(&SecretString::from(url), 10)
            .await
            .expect("Failed to connect to test database");
        MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let db: Arc<dyn Database> = Arc::new(PgDatabase::new(pool.clone()));
        Self {
            pool,
            catalog: CatalogService::new(Arc::clone(&db)),
            orders: OrderService::new(Arc::clone(&db)),
            db,
        }
    }

    /// Create a product with a unique name.
    pub async fn product(&self, price: &str, stock: i32) -> Product {
        let input = CreateProductInput {
            name: format!("Test product {}", uuid::Uuid::new_v4()),
            price: Price::parse(price).expect("valid price"),
            description: None,
            stock,
            image: None,
        };
        self.catalog
            .create_product(&input)
            .await
            .expect("Failed to create product")
    }
}
