//! In-process backend.
//!
//! A unit of work holds the store's mutex for its whole lifetime and mutates
//! a private copy of the state. Commit swaps the copy in; rollback or drop
//! throws it away. Units of work are therefore fully serialized.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use shop_core::{OrderId, ProductId};

use super::{CatalogStore, Database, OrderStore, RepositoryError, UnitOfWork};
use crate::models::{CreateProductInput, NewOrder, Order, OrderUpdate, Product};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    last_product_id: i32,
    last_order_id: i32,
}

fn next_id(last: &mut i32) -> Result<i32, RepositoryError> {
    *last = last
        .checked_add(1)
        .ok_or_else(|| RepositoryError::Conflict("id sequence exhausted".to_owned()))?;
    Ok(*last)
}

/// In-memory [`Database`] used by tests and local experiments.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed products, ordered by id.
    pub async fn products(&self) -> Vec<Product> {
        self.state.lock().await.products.values().cloned().collect()
    }

    /// Committed orders, ordered by id.
    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.orders.values().cloned().collect()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// A unit of work over a private copy of the state.
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl CatalogStore for MemoryUnitOfWork {
    async fn list_products(&mut self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.working.products.values().cloned().collect())
    }

    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn insert_product(
        &mut self,
        input: &CreateProductInput,
    ) -> Result<Product, RepositoryError> {
        if input.stock < 0 {
            return Err(RepositoryError::Conflict(
                "stock must not be negative".to_owned(),
            ));
        }

        let id = ProductId::new(next_id(&mut self.working.last_product_id)?);
        let now = Utc::now();
        let product = Product {
            id,
            name: input.name.clone(),
            price: input.price,
            description: input.description.clone(),
            stock: input.stock,
            image: input.image.clone(),
            created_at: now,
            updated_at: now,
        };
        self.working.products.insert(id, product.clone());
        Ok(product)
    }

    async fn save_product(&mut self, product: &Product) -> Result<Product, RepositoryError> {
        if product.stock < 0 {
            return Err(RepositoryError::Conflict(
                "stock must not be negative".to_owned(),
            ));
        }

        let stored = self
            .working
            .products
            .get_mut(&product.id)
            .ok_or(RepositoryError::NotFound)?;

        stored.name.clone_from(&product.name);
        stored.price = product.price;
        stored.description.clone_from(&product.description);
        stored.stock = product.stock;
        stored.image.clone_from(&product.image);
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_product(&mut self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.working.products.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderStore for MemoryUnitOfWork {
    async fn create_order(&mut self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let id = OrderId::new(next_id(&mut self.working.last_order_id)?);
        let now = Utc::now();
        let order = Order {
            id,
            customer_name: order.customer_name.clone(),
            total_amount: order.total_amount,
            status: order.status,
            items: order.items.clone(),
            created_at: now,
            updated_at: now,
        };
        self.working.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn update_order(
        &mut self,
        id: OrderId,
        fields: &OrderUpdate,
    ) -> Result<bool, RepositoryError> {
        let Some(order) = self.working.orders.get_mut(&id) else {
            return Ok(false);
        };

        if let Some(status) = fields.status {
            order.status = status;
            order.updated_at = Utc::now();
        }
        Ok(true)
    }

    async fn list_orders(&mut self) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self.working.orders.values().cloned().collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        Ok(())
    }
}
