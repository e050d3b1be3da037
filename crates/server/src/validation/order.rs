//! Order request validators.

use serde_json::Value;

use shop_core::{OrderStatus, ProductId, ValidationErrors};

use super::{Fields, Validate, integer_at_least, price, text};
use crate::models::{OrderItemInput, PlaceOrderInput, UpdateStatusInput};

const CUSTOMER_NAME_MAX_CHARS: usize = 255;

fn customer_name(value: &Value) -> Result<String, String> {
    let name = text(value)?;
    if name.is_empty() {
        return Err("must not be empty".to_owned());
    }
    if name.chars().count() > CUSTOMER_NAME_MAX_CHARS {
        return Err(format!("must be at most {CUSTOMER_NAME_MAX_CHARS} characters"));
    }
    Ok(name)
}

impl Validate for PlaceOrderInput {
    fn validate(body: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(body);

        let customer_name = fields.required("customerName", customer_name);
        let total_amount = fields.required("totalAmount", price);
        let items = fields
            .required("items", |v| {
                v.as_array().ok_or_else(|| "must be an array".to_owned())
            })
            .and_then(|items| order_lines(&mut fields, items));

        let (Some(customer_name), Some(total_amount), Some(items)) =
            (customer_name, total_amount, items)
        else {
            return Err(fields.into_errors());
        };

        fields.finish(Self {
            customer_name,
            total_amount,
            items,
        })
    }
}

fn order_lines<'a>(fields: &mut Fields<'a>, items: &'a [Value]) -> Option<Vec<OrderItemInput>> {
    if items.is_empty() {
        fields.push("items", "must contain at least one item");
        return None;
    }

    let mut lines = Vec::with_capacity(items.len());
    let mut complete = true;
    for (i, item) in items.iter().enumerate() {
        let id = fields.require(format!("items[{i}].id"), item.get("id"), |v| {
            integer_at_least(v, 1)
        });
        let quantity = fields.require(format!("items[{i}].quantity"), item.get("quantity"), |v| {
            integer_at_least(v, 1)
        });

        match (id, quantity) {
            (Some(id), Some(quantity)) => lines.push(OrderItemInput {
                product_id: ProductId::new(id),
                quantity,
            }),
            _ => complete = false,
        }
    }

    complete.then_some(lines)
}

impl Validate for UpdateStatusInput {
    fn validate(body: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(body);

        let status = fields.required("status", |v| {
            v.as_str()
                .and_then(|s| s.parse::<OrderStatus>().ok())
                .ok_or_else(|| {
                    let allowed: Vec<&str> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
                    format!("must be one of {}", allowed.join(", "))
                })
        });

        match status {
            Some(status) => fields.finish(Self { status }),
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
    fn test_valid_order() {
        let input = PlaceOrderInput::validate(&json!({
            "customerName": "  Test Customer ",
            "totalAmount": 199.98,
            "items": [{ "id": 1, "quantity": 2 }]
        }))
        .unwrap();

        assert_eq!(input.customer_name, "Test Customer");
        assert_eq!(input.total_amount, Price::parse("199.98").unwrap());
        assert_eq!(
            input.items,
            [OrderItemInput {
                product_id: ProductId::new(1),
                quantity: 2,
            }]
        );
    }

    #[test]
    fn test_empty_body_reports_every_required_field() {
        let errors = PlaceOrderInput::validate(&json!({})).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["customerName", "totalAmount", "items"]);
    }

    #[test]
    fn test_blank_customer_and_negative_total() {
        let errors = PlaceOrderInput::validate(&json!({
            "customerName": "   ",
            "totalAmount": -5,
            "items": [{ "id": 1, "quantity": 1 }]
        }))
        .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(errors.contains_field("customerName"));
        assert!(errors.contains_field("totalAmount"));
    }

    #[test]
    fn test_customer_name_fits_column() {
        let order = |name: String| {
            json!({
                "customerName": name,
                "totalAmount": 1,
                "items": [{ "id": 1, "quantity": 1 }]
            })
        };

        assert!(PlaceOrderInput::validate(&order("é".repeat(255))).is_ok());

        let errors = PlaceOrderInput::validate(&order("x".repeat(300))).unwrap_err();
        assert_eq!(
            errors.iter().map(|e| (e.field.as_str(), e.message.as_str())).collect::<Vec<_>>(),
            [("customerName", "must be at most 255 characters")]
        );
    }

    #[test]
    fn test_items_must_be_non_empty_array() {
        let errors = PlaceOrderInput::validate(&json!({
            "customerName": "A",
            "totalAmount": 0,
            "items": []
        }))
        .unwrap_err();
        assert!(errors.contains_field("items"));

        let errors = PlaceOrderInput::validate(&json!({
            "customerName": "A",
            "totalAmount": 0,
            "items": { "id": 1 }
        }))
        .unwrap_err();
        assert!(errors.contains_field("items"));
    }

    #[test]
    fn test_item_fields_are_indexed() {
        let errors = PlaceOrderInput::validate(&json!({
            "customerName": "A",
            "totalAmount": 0,
            "items": [
                { "id": 1, "quantity": 1 },
                { "id": 0, "quantity": 1 },
                { "id": 2 },
                "not an object"
            ]
        }))
        .unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "items[1].id",
                "items[2].quantity",
                "items[3].id",
                "items[3].quantity"
            ]
        );
    }

    #[test]
    fn test_status() {
        let input = UpdateStatusInput::validate(&json!({ "status": "completed" })).unwrap();
        assert_eq!(input.status, OrderStatus::Completed);

        let errors = UpdateStatusInput::validate(&json!({ "status": "invalid_status" })).unwrap_err();
        assert_eq!(
            errors.iter().next().map(|e| e.message.as_str()),
            Some("must be one of pending, completed, cancelled")
        );

        assert!(UpdateStatusInput::validate(&json!({})).is_err());
    }
}
