//! Seed the product catalog from a YAML file.
//!
//! The file is a list of products using the same fields as
//! `POST /api/products`:
//!
//! ```yaml
//! - name: Desk Lamp
//!   price: 24.99
//!   stock: 12
//!   description: Adjustable arm, warm white bulb
//!   image: https://cdn.example.com/lamp.png
//! - name: Notebook
//!   price: 3.5
//!   stock: 200
//! ```
//!
//! Every entry is validated before anything is written, and all entries are
//! inserted in one transaction.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use shop_server::db::{self, Database, PgDatabase};
use shop_server::models::CreateProductInput;
use shop_server::validation::Validate;

use super::database_url;

/// Errors reading a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedFileError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported YAML value: {0}")]
    Conversion(#[from] serde_json::Error),

    #[error("expected a list of products")]
    NotAList,

    #[error("{} invalid entries", .0.len())]
    Invalid(Vec<String>),
}

/// Parse and validate every product in a seed file.
///
/// # Errors
///
/// Returns `SeedFileError::Invalid` with one line per rejected field
/// (`[index] field: message`) if any entry fails validation.
pub fn parse_products(content: &str) -> Result<Vec<CreateProductInput>, SeedFileError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    let json = serde_json::to_value(yaml)?;
    let Value::Array(entries) = json else {
        return Err(SeedFileError::NotAList);
    };

    let mut products = Vec::with_capacity(entries.len());
    let mut problems = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match CreateProductInput::validate(entry) {
            Ok(product) => products.push(product),
            Err(errors) => problems.extend(
                errors
                    .iter()
                    .map(|e| format!("[{i}] {}: {}", e.field, e.message)),
            ),
        }
    }

    if problems.is_empty() {
        Ok(products)
    } else {
        Err(SeedFileError::Invalid(problems))
    }
}

/// Seed products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML file
/// * `dry_run` - If true, only validate the file
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or if a
/// database operation fails. Nothing is inserted on error.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;

    let products = match parse_products(&content) {
        Ok(products) => products,
        Err(SeedFileError::Invalid(problems)) => {
            error!("Product validation failed:");
            for problem in &problems {
                error!("  - {problem}");
            }
            return Err(format!("{} validation errors found", problems.len()).into());
        }
        Err(e) => return Err(e.into()),
    };
    info!(products = products.len(), "Products validated");

    if dry_run {
        info!("Dry run, nothing inserted");
        return Ok(());
    }

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url, 1).await?;
    info!("Connected to database");

    let database: Arc<dyn Database> = Arc::new(PgDatabase::new(pool));
    let mut uow = database.begin().await?;
    let mut inserted = Vec::with_capacity(products.len());
    let mut failure = None;
    for product in &products {
        match uow.insert_product(product).await {
            Ok(p) => inserted.push(p),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    let result = failure.map_or(Ok(()), Err);
    db::complete(uow, result).await?;

    info!("Seeding complete!");
    for product in &inserted {
        info!(product_id = %product.id, stock = product.stock, "  {}", product.name);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products() {
        let products = parse_products(
            r"
- name: Desk Lamp
  price: 24.99
  stock: 12
  image: https://cdn.example.com/lamp.png
- name: Notebook
  price: '3.5'
  stock: 200
",
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Desk Lamp");
        assert_eq!(products[1].price.to_string(), "3.50");
        assert_eq!(products[1].description, None);
    }

    #[test]
    fn test_parse_products_reports_every_entry() {
        let err = parse_products(
            r"
- name: X
  price: 1
  stock: 1
- price: -1
  stock: 1
  name: Fine name
",
        )
        .unwrap_err();

        let SeedFileError::Invalid(problems) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(
            problems,
            [
                "[0] name: must be between 2 and 100 characters",
                "[1] price: must be a non-negative number"
            ]
        );
    }

    #[test]
    fn test_parse_products_needs_a_list() {
        assert!(matches!(
            parse_products("name: Lamp"),
            Err(SeedFileError::NotAList)
        ));
    }
}
