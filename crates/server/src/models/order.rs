//! Order models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shop_core::{OrderId, OrderStatus, Price, ProductId};

/// A recorded order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Name the customer ordered under.
    pub customer_name: String,
    /// Total as submitted by the client.
    pub total_amount: Price,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Ordered products, one line per product.
    pub items: Vec<OrderLineItem>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// One product within an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: ProductId,
    /// Units ordered. Always positive.
    pub quantity: i32,
    /// Product price at the time the order was placed.
    pub unit_price: Price,
}

/// A validated order request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderInput {
    pub customer_name: String,
    pub total_amount: Price,
    /// Requested lines in request order. Never empty.
    pub items: Vec<OrderItemInput>,
}

/// A requested `(product, quantity)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItemInput {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// An order row ready to be inserted by an [`OrderStore`](crate::db::OrderStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub items: Vec<OrderLineItem>,
}

/// Fields of an order that may change after placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
}

/// A validated status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStatusInput {
    pub status: OrderStatus,
}
