//! Product catalog management.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use shop_core::ProductId;

use crate::db::{self, Database, RepositoryError};
use crate::models::{CreateProductInput, DecrementStockInput, Product, UpdateProductInput};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The product has fewer units than requested.
    #[error(
        "insufficient stock for product \"{name}\" (id {product_id}): requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        requested: i32,
        available: i32,
    },

    /// Store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Map a store-level `NotFound` on a known id to the domain error.
fn not_found_as(id: ProductId) -> impl FnOnce(RepositoryError) -> CatalogError {
    move |e| match e {
        RepositoryError::NotFound => CatalogError::ProductNotFound(id),
        other => CatalogError::Repository(other),
    }
}

/// Catalog operations over an injected [`Database`].
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<dyn Database>,
}

impl CatalogService {
    /// Create a service over `db`.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// All products ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` on store failure.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let mut uow = self.db.begin().await?;
        let result = uow.list_products().await.map_err(CatalogError::from);
        db::complete(uow, result).await
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product does not exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let mut uow = self.db.begin().await?;
        let result = uow
            .find_product(id)
            .await
            .map_err(CatalogError::from)
            .and_then(|p| p.ok_or(CatalogError::ProductNotFound(id)));
        db::complete(uow, result).await
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` on store failure.
    #[instrument(skip_all, fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: &CreateProductInput,
    ) -> Result<Product, CatalogError> {
        let mut uow = self.db.begin().await?;
        let result = uow.insert_product(input).await.map_err(CatalogError::from);
        let product = db::complete(uow, result).await?;

        info!(product_id = %product.id, stock = product.stock, "Product created");
        Ok(product)
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product does not exist.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: UpdateProductInput,
    ) -> Result<Product, CatalogError> {
        let mut uow = self.db.begin().await?;
        let result = async {
            let mut product = uow
                .find_product(id)
                .await?
                .ok_or(CatalogError::ProductNotFound(id))?;
            if input.is_empty() {
                return Ok(product);
            }
            input.apply_to(&mut product);
            uow.save_product(&product).await.map_err(not_found_as(id))
        }
        .await;
        let product = db::complete(uow, result).await?;

        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    /// Remove a product from the catalog.
    ///
    /// Orders that reference the product keep their line items.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        let mut uow = self.db.begin().await?;
        let result = match uow.delete_product(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CatalogError::ProductNotFound(id)),
            Err(e) => Err(e.into()),
        };
        db::complete(uow, result).await?;

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Remove units from a single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product does not exist
    /// and `CatalogError::InsufficientStock` if fewer units are available;
    /// stock is unchanged in both cases.
    #[instrument(skip(self))]
    pub async fn decrement_stock(
        &self,
        id: ProductId,
        input: DecrementStockInput,
    ) -> Result<Product, CatalogError> {
        let mut uow = self.db.begin().await?;
        let result = async {
            let mut product = uow
                .find_product(id)
                .await?
                .ok_or(CatalogError::ProductNotFound(id))?;

            if product.stock < input.quantity {
                return Err(CatalogError::InsufficientStock {
                    product_id: id,
                    name: product.name,
                    requested: input.quantity,
                    available: product.stock,
                });
            }

            product.stock -= input.quantity;
            uow.save_product(&product).await.map_err(not_found_as(id))
        }
        .await;
        let product = db::complete(uow, result).await?;

        info!(product_id = %id, remaining = product.stock, "Stock decremented");
        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shop_core::Price;

    use super::*;
    use crate::db::MemoryDatabase;

    fn input(name: &str, stock: i32) -> CreateProductInput {
        CreateProductInput {
            name: name.to_owned(),
            price: Price::parse("9.99").unwrap(),
            description: Some("Test Description".to_owned()),
            stock,
            image: None,
        }
    }

    fn service() -> (MemoryDatabase, CatalogService) {
        let db = MemoryDatabase::new();
        let catalog = CatalogService::new(Arc::new(db.clone()));
        (db, catalog)
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (_db, catalog) = service();
        let created = catalog.create_product(&input("Test Product", 10)).await.unwrap();

        let fetched = catalog.get_product(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(catalog.list_products().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (_db, catalog) = service();
        assert!(matches!(
            catalog.get_product(ProductId::new(9999)).await,
            Err(CatalogError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (_db, catalog) = service();
        let created = catalog.create_product(&input("Test Product", 10)).await.unwrap();

        let updated = catalog
            .update_product(
                created.id,
                UpdateProductInput {
                    name: Some("Updated Product".to_owned()),
                    price: Some(Price::parse("199.99").unwrap()),
                    ..UpdateProductInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Updated Product");
        assert_eq!(updated.price, Price::parse("199.99").unwrap());
        assert_eq!(updated.stock, 10);
        assert_eq!(updated.description, created.description);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let (_db, catalog) = service();
        let result = catalog
            .update_product(ProductId::new(3), UpdateProductInput::default())
            .await;
        assert!(matches!(result, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, catalog) = service();
        let created = catalog.create_product(&input("Test Product", 10)).await.unwrap();

        catalog.delete_product(created.id).await.unwrap();
        assert!(db.products().await.is_empty());
        assert!(matches!(
            catalog.delete_product(created.id).await,
            Err(CatalogError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_decrement_stock() {
        let (db, catalog) = service();
        let created = catalog.create_product(&input("Test Product", 10)).await.unwrap();

        let product = catalog
            .decrement_stock(created.id, DecrementStockInput { quantity: 4 })
            .await
            .unwrap();
        assert_eq!(product.stock, 6);

        let err = catalog
            .decrement_stock(created.id, DecrementStockInput { quantity: 7 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InsufficientStock {
                requested: 7,
                available: 6,
                ..
            }
        ));
        assert_eq!(db.products().await[0].stock, 6);
    }
}
