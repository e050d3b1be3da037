//! Product request validators.
//!
//! Create requires `name`, `price` and `stock`. Update accepts any subset of
//! the product fields and checks each present one with the create rule.

use serde_json::Value;
use url::Url;

use shop_core::ValidationErrors;

use super::{Fields, Validate, integer_at_least, optional_text, price, text};
use crate::models::{CreateProductInput, DecrementStockInput, UpdateProductInput};

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 1000;
const IMAGE_MAX_CHARS: usize = 2048;

fn name(value: &Value) -> Result<String, String> {
    let name = text(value)?;
    let chars = name.chars().count();
    if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        Ok(name)
    } else {
        Err(format!(
            "must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        ))
    }
}

fn description(value: &Value) -> Result<Option<String>, String> {
    let description = optional_text(value)?;
    if description
        .as_ref()
        .is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS)
    {
        return Err(format!("must be at most {DESCRIPTION_MAX_CHARS} characters"));
    }
    Ok(description)
}

fn stock(value: &Value) -> Result<i32, String> {
    integer_at_least(value, 0)
}

fn image(value: &Value) -> Result<Option<String>, String> {
    let image = optional_text(value)?;
    if let Some(ref url) = image {
        if url.chars().count() > IMAGE_MAX_CHARS {
            return Err(format!("must be at most {IMAGE_MAX_CHARS} characters"));
        }
        Url::parse(url).map_err(|_| "must be an absolute URL".to_owned())?;
    }
    Ok(image)
}

impl Validate for CreateProductInput {
    fn validate(body: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(body);

        let name = fields.required("name", name);
        let price = fields.required("price", price);
        let description = fields.optional("description", description).map(Option::flatten);
        let stock = fields.required("stock", stock);
        let image = fields.optional("image", image).map(Option::flatten);

        let (Some(name), Some(price), Some(description), Some(stock), Some(image)) =
            (name, price, description, stock, image)
        else {
            return Err(fields.into_errors());
        };

        fields.finish(Self {
            name,
            price,
            description,
            stock,
            image,
        })
    }
}

impl Validate for UpdateProductInput {
    fn validate(body: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(body);

        // `None` is either absent or rejected; rejections are in `fields`.
        let update = Self {
            name: fields.optional("name", name).flatten(),
            price: fields.optional("price", price).flatten(),
            description: fields.optional("description", description).flatten(),
            stock: fields.optional("stock", stock).flatten(),
            image: fields.optional("image", image).flatten(),
        };

        fields.finish(update)
    }
}

impl Validate for DecrementStockInput {
    fn validate(body: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(body);
        match fields.required("quantity", |v| integer_at_least(v, 1)) {
            Some(quantity) => fields.finish(Self { quantity }),
            None => Err(fields.into_errors()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use shop_core::Price;

    use super::*;

    #[test]
    fn test_valid_product() {
        let input = CreateProductInput::validate(&json!({
            "name": "Test Product",
            "price": 99.99,
            "description": "Test Description",
            "stock": 10
        }))
        .unwrap();

        assert_eq!(input.name, "Test Product");
        assert_eq!(input.price, Price::parse("99.99").unwrap());
        assert_eq!(input.description.as_deref(), Some("Test Description"));
        assert_eq!(input.stock, 10);
        assert_eq!(input.image, None);
    }

    #[test]
    fn test_empty_body_reports_required_fields() {
        let errors = CreateProductInput::validate(&json!({})).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["name", "price", "stock"]);
    }

    #[test]
    fn test_field_rules() {
        let errors = CreateProductInput::validate(&json!({
            "name": " A ",
            "price": -1,
            "description": "x".repeat(1001),
            "stock": -2,
            "image": "not a url"
        }))
        .unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["name", "price", "description", "stock", "image"]);
    }

    #[test]
    fn test_name_length_counts_characters() {
        assert!(name(&json!("ÿÿ")).is_ok());
        assert!(name(&json!("x".repeat(100))).is_ok());
        assert!(name(&json!("x".repeat(101))).is_err());
    }

    #[test]
    fn test_image_fits_column() {
        let url = |len: usize| format!("https://example.com/{}", "a".repeat(len - 20));
        assert_eq!(url(2048).len(), 2048);

        assert!(image(&json!(url(2048))).is_ok());
        assert_eq!(
            image(&json!(url(2049))),
            Err("must be at most 2048 characters".to_owned())
        );

        let errors = UpdateProductInput::validate(&json!({ "image": url(3000) })).unwrap_err();
        assert!(errors.contains_field("image"));
    }

    #[test]
    fn test_blank_image_is_absent() {
        let input = CreateProductInput::validate(&json!({
            "name": "Lamp",
            "price": 1,
            "stock": 0,
            "image": "   "
        }))
        .unwrap();
        assert_eq!(input.image, None);

        assert_eq!(
            image(&json!("https://example.com/lamp.png")),
            Ok(Some("https://example.com/lamp.png".to_owned()))
        );
    }

    #[test]
    fn test_partial_update() {
        let input = UpdateProductInput::validate(&json!({
            "name": "Updated Product",
            "price": 199.99
        }))
        .unwrap();

        assert_eq!(input.name.as_deref(), Some("Updated Product"));
        assert_eq!(input.price, Some(Price::parse("199.99").unwrap()));
        assert_eq!(input.stock, None);
        assert_eq!(input.description, None);
        assert_eq!(input.image, None);
    }

    #[test]
    fn test_update_clears_with_empty_string() {
        let input = UpdateProductInput::validate(&json!({ "description": "" })).unwrap();
        assert_eq!(input.description, Some(None));
    }

    #[test]
    fn test_update_checks_present_fields() {
        let errors = UpdateProductInput::validate(&json!({ "stock": "many" })).unwrap_err();
        assert!(errors.contains_field("stock"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_decrement_quantity() {
        assert_eq!(
            DecrementStockInput::validate(&json!({ "quantity": 3 })).unwrap(),
            DecrementStockInput { quantity: 3 }
        );
        assert!(DecrementStockInput::validate(&json!({ "quantity": 0 })).is_err());
        assert!(DecrementStockInput::validate(&json!({})).is_err());
    }
}
