//! Business logic services.
//!
//! # Services
//!
//! - `catalog` - Product catalog management and single-product stock changes
//! - `orders` - Order placement with stock reservation, order lifecycle
//!
//! Each service holds an `Arc<dyn Database>` and runs every operation in its
//! own unit of work.

pub mod catalog;
pub mod orders;

pub use catalog::{CatalogError, CatalogService};
pub use orders::{OrderError, OrderService};
