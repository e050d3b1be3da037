//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::Database;
use crate::services::{CatalogService, OrderService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the store and
/// the services built on it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: Arc<dyn Database>,
    catalog: CatalogService,
    orders: OrderService,
}

impl AppState {
    /// Create a new application state over `db`.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogService::new(Arc::clone(&db)),
                orders: OrderService::new(Arc::clone(&db)),
                db,
            }),
        }
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn db(&self) -> &dyn Database {
        self.inner.db.as_ref()
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }
}
