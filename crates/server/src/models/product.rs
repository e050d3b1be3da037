//! Product catalog models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shop_core::{Price, ProductId};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price.
    pub price: Price,
    /// Optional long description.
    pub description: Option<String>,
    /// Units available for ordering. Never negative.
    pub stock: i32,
    /// Optional absolute image URL.
    pub image: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductInput {
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    pub stock: i32,
    pub image: Option<String>,
}

/// Partial update of a product. `None` leaves the field unchanged.
///
/// For the optional columns the inner `Option` is the new value, so
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub description: Option<Option<String>>,
    pub stock: Option<i32>,
    pub image: Option<Option<String>>,
}

impl UpdateProductInput {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.stock.is_none()
            && self.image.is_none()
    }

    /// Apply the present fields to `product`.
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(image) = self.image {
            product.image = image;
        }
    }
}

/// Input for removing units from a single product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecrementStockInput {
    /// Units to remove. Always positive.
    pub quantity: i32,
}
