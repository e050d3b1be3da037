//! Order placement and order lifecycle.
//!
//! Placing an order checks stock for every line, records the order as
//! `pending` and decrements stock, all inside one unit of work. Any failure
//! rolls the whole unit back, so readers never observe a partial order.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use shop_core::{OrderId, OrderStatus, ProductId};

use crate::db::{self, Database, RepositoryError, UnitOfWork};
use crate::models::{NewOrder, Order, OrderLineItem, OrderUpdate, PlaceOrderInput, Product};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A line references a product that does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A product has fewer units than the order asks for.
    #[error(
        "insufficient stock for product \"{name}\" (id {product_id}): requested {requested}, available {available}, short by {shortfall}"
    )]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        requested: i64,
        available: i32,
        shortfall: i64,
    },

    /// The order does not exist.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The status change is not allowed by the order lifecycle.
    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl OrderError {
    fn insufficient(product: &Product, requested: i64) -> Self {
        let available = product.stock;
        Self::InsufficientStock {
            product_id: product.id,
            name: product.name.clone(),
            requested,
            available,
            shortfall: requested - i64::from(available),
        }
    }
}

/// Order operations over an injected [`Database`].
#[derive(Clone)]
pub struct OrderService {
    db: Arc<dyn Database>,
}

impl OrderService {
    /// Create a service over `db`.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Place an order, reserving stock for every line.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::ProductNotFound` or `OrderError::InsufficientStock`
    /// for the first offending product (in product id order); nothing is
    /// recorded in that case. Returns `OrderError::Repository` on store failure.
    #[instrument(skip_all, fields(customer = %input.customer_name, lines = input.items.len()))]
    pub async fn place_order(&self, input: &PlaceOrderInput) -> Result<Order, OrderError> {
        let mut uow = self.db.begin().await?;
        let result = reserve_and_record(uow.as_mut(), input).await;
        let order = db::complete(uow, result).await?;

        info!(order_id = %order.id, total = %order.total_amount, "Order placed");
        Ok(order)
    }

    /// Move an order to `status`.
    ///
    /// Cancelling an order does not return its units to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order does not exist and
    /// `OrderError::InvalidTransition` if it is already in a different
    /// terminal status.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let mut uow = self.db.begin().await?;
        let result = change_status(uow.as_mut(), id, status).await;
        let order = db::complete(uow, result).await?;

        info!(order_id = %order.id, status = %order.status, "Order status updated");
        Ok(order)
    }

    /// Get one order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order does not exist.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        let mut uow = self.db.begin().await?;
        let result = uow
            .find_order(id)
            .await
            .map_err(OrderError::from)
            .and_then(|order| order.ok_or(OrderError::OrderNotFound(id)));
        db::complete(uow, result).await
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` on store failure.
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        let mut uow = self.db.begin().await?;
        let result = uow.list_orders().await.map_err(OrderError::from);
        db::complete(uow, result).await
    }
}

async fn reserve_and_record(
    uow: &mut dyn UnitOfWork,
    input: &PlaceOrderInput,
) -> Result<Order, OrderError> {
    // Merge repeated lines; iterating by id also gives a stable lock order.
    let mut wanted: BTreeMap<ProductId, i64> = BTreeMap::new();
    for item in &input.items {
        *wanted.entry(item.product_id).or_default() += i64::from(item.quantity);
    }

    let mut reserved = Vec::with_capacity(wanted.len());
    for (&product_id, &requested) in &wanted {
        let product = uow
            .find_product(product_id)
            .await?
            .ok_or(OrderError::ProductNotFound(product_id))?;

        let quantity = i32::try_from(requested)
            .ok()
            .filter(|&q| q <= product.stock)
            .ok_or_else(|| OrderError::insufficient(&product, requested))?;

        reserved.push((product, quantity));
    }

    let catalog_total: Decimal = reserved
        .iter()
        .map(|(product, quantity)| product.price.times(i64::from(*quantity)))
        .sum();
    if catalog_total != input.total_amount.amount() {
        warn!(
            submitted = %input.total_amount,
            catalog = %catalog_total,
            "Order total does not match catalog prices"
        );
    }

    let order = uow
        .create_order(&NewOrder {
            customer_name: input.customer_name.clone(),
            total_amount: input.total_amount,
            status: OrderStatus::Pending,
            items: reserved
                .iter()
                .map(|(product, quantity)| OrderLineItem {
                    product_id: product.id,
                    quantity: *quantity,
                    unit_price: product.price,
                })
                .collect(),
        })
        .await?;

    for (mut product, quantity) in reserved {
        product.stock -= quantity;
        let saved = uow.save_product(&product).await?;
        debug!(product_id = %saved.id, quantity, remaining = saved.stock, "Stock reserved");
    }

    Ok(order)
}

async fn change_status(
    uow: &mut dyn UnitOfWork,
    id: OrderId,
    status: OrderStatus,
) -> Result<Order, OrderError> {
    let current = uow
        .find_order(id)
        .await?
        .ok_or(OrderError::OrderNotFound(id))?;

    if !current.status.can_transition_to(status) {
        return Err(OrderError::InvalidTransition {
            from: current.status,
            to: status,
        });
    }

    let fields = OrderUpdate {
        status: Some(status),
    };
    if !uow.update_order(id, &fields).await? {
        return Err(OrderError::OrderNotFound(id));
    }

    uow.find_order(id)
        .await?
        .ok_or(OrderError::OrderNotFound(id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use shop_core::Price;

    use super::*;
    use crate::db::MemoryDatabase;
    use crate::models::{CreateProductInput, OrderItemInput};

    async fn seed(db: &MemoryDatabase, stocks: &[(&str, &str, i32)]) -> Vec<Product> {
        let mut uow = db.begin().await.unwrap();
        let mut products = Vec::new();
        for &(name, price, stock) in stocks {
            let product = uow
                .insert_product(&CreateProductInput {
                    name: name.to_owned(),
                    price: Price::parse(price).unwrap(),
                    description: None,
                    stock,
                    image: None,
                })
                .await
                .unwrap();
            products.push(product);
        }
        uow.commit().await.unwrap();
        products
    }

    fn order(lines: &[(i32, i32)]) -> PlaceOrderInput {
        PlaceOrderInput {
            customer_name: "Test Customer".to_owned(),
            total_amount: Price::ZERO,
            items: lines
                .iter()
                .map(|&(id, quantity)| OrderItemInput {
                    product_id: ProductId::new(id),
                    quantity,
                })
                .collect(),
        }
    }

    fn service(db: &MemoryDatabase) -> OrderService {
        OrderService::new(Arc::new(db.clone()))
    }

    async fn stock_of(db: &MemoryDatabase) -> Vec<i32> {
        db.products().await.iter().map(|p| p.stock).collect()
    }

    #[tokio::test]
    async fn test_order_for_all_stock_then_one_more_fails() {
        let db = MemoryDatabase::new();
        seed(&db, &[("Test Product", "99.99", 10)]).await;
        let orders = service(&db);

        let placed = orders.place_order(&order(&[(1, 10)])).await.unwrap();
        assert_eq!(placed.status, OrderStatus::Pending);
        assert_eq!(stock_of(&db).await, [0]);

        let err = orders.place_order(&order(&[(1, 1)])).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InsufficientStock {
                requested: 1,
                available: 0,
                shortfall: 1,
                ..
            }
        ));
        assert_eq!(db.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_decrease_matches_ordered_quantities() {
        let db = MemoryDatabase::new();
        seed(&db, &[("A", "1.00", 5), ("B", "2.00", 7), ("C", "3.00", 9)]).await;

        let placed = service(&db)
            .place_order(&order(&[(1, 2), (3, 4), (2, 1)]))
            .await
            .unwrap();

        assert_eq!(stock_of(&db).await, [3, 6, 5]);
        let ordered: i32 = placed.items.iter().map(|i| i.quantity).sum();
        assert_eq!(ordered, 7);
    }

    #[tokio::test]
    async fn test_line_items_record_unit_price() {
        let db = MemoryDatabase::new();
        seed(&db, &[("A", "4.25", 5)]).await;

        let placed = service(&db).place_order(&order(&[(1, 2)])).await.unwrap();

        assert_eq!(
            placed.items,
            [OrderLineItem {
                product_id: ProductId::new(1),
                quantity: 2,
                unit_price: Price::parse("4.25").unwrap(),
            }]
        );
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_state_unchanged() {
        let db = MemoryDatabase::new();
        seed(&db, &[("A", "1.00", 5), ("B", "1.00", 2)]).await;

        let err = service(&db)
            .place_order(&order(&[(1, 5), (2, 3)]))
            .await
            .unwrap_err();

        match err {
            OrderError::InsufficientStock {
                product_id, name, ..
            } => {
                assert_eq!(product_id, ProductId::new(2));
                assert_eq!(name, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stock_of(&db).await, [5, 2]);
        assert!(db.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_leaves_state_unchanged() {
        let db = MemoryDatabase::new();
        seed(&db, &[("A", "1.00", 5)]).await;

        let err = service(&db)
            .place_order(&order(&[(1, 1), (42, 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::ProductNotFound(id) if id == ProductId::new(42)));
        assert_eq!(err.to_string(), "product 42 not found");
        assert_eq!(stock_of(&db).await, [5]);
        assert!(db.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_lines_are_checked_together() {
        let db = MemoryDatabase::new();
        seed(&db, &[("A", "1.00", 3)]).await;

        let err = service(&db)
            .place_order(&order(&[(1, 2), (1, 2)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InsufficientStock { requested: 4, .. }));
        assert_eq!(stock_of(&db).await, [3]);
    }

    #[tokio::test]
    async fn test_concurrent_orders_never_oversell() {
        let db = MemoryDatabase::new();
        seed(&db, &[("Last units", "5.00", 10)]).await;
        let orders = service(&db);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let orders = orders.clone();
            handles.push(tokio::spawn(async move {
                orders.place_order(&order(&[(1, 3)])).await
            }));
        }

        let mut sold = 0;
        for handle in handles {
            if let Ok(placed) = handle.await.unwrap() {
                sold += placed.items[0].quantity;
            }
        }

        assert_eq!(sold, 9);
        assert_eq!(stock_of(&db).await, [1]);
        assert_eq!(db.orders().await.len(), 3);
    }

    #[tokio::test]
    async fn test_update_status_unknown_order() {
        let db = MemoryDatabase::new();

        let err = service(&db)
            .update_status(OrderId::new(7), OrderStatus::Completed)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::OrderNotFound(_)));
        assert!(db.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_status_follows_lifecycle() {
        let db = MemoryDatabase::new();
        seed(&db, &[("A", "1.00", 5)]).await;
        let orders = service(&db);
        let placed = orders.place_order(&order(&[(1, 2)])).await.unwrap();

        let cancelled = orders
            .update_status(placed.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        // Cancellation keeps the reservation
        assert_eq!(stock_of(&db).await, [3]);

        let again = orders
            .update_status(placed.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(again.status, OrderStatus::Cancelled);

        let err = orders
            .update_status(placed.id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Pending,
            }
        ));
    }

    #[tokio::test]
    async fn test_get_and_list_orders() {
        let db = MemoryDatabase::new();
        seed(&db, &[("A", "1.00", 5)]).await;
        let orders = service(&db);
        let first = orders.place_order(&order(&[(1, 1)])).await.unwrap();
        let second = orders.place_order(&order(&[(1, 1)])).await.unwrap();

        let listed: Vec<OrderId> = orders
            .list_orders()
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(listed, [second.id, first.id]);

        assert_eq!(orders.get_order(first.id).await.unwrap(), first);
        assert!(matches!(
            orders.get_order(OrderId::new(99)).await,
            Err(OrderError::OrderNotFound(_))
        ));
    }
}
