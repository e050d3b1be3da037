//! Domain models for the shop.

pub mod order;
pub mod product;

pub use order::{
    NewOrder, Order, OrderItemInput, OrderLineItem, OrderUpdate, PlaceOrderInput,
    UpdateStatusInput,
};
pub use product::{CreateProductInput, DecrementStockInput, Product, UpdateProductInput};
