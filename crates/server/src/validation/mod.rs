//! Request body validation.
//!
//! Each request kind has one [`Validate`] implementation that walks the JSON
//! body in a fixed field order and either builds the typed input or returns
//! every rejected field. Validation never touches the store.
//!
//! A JSON `null` is treated the same as an absent field. Numbers may be sent
//! as JSON numbers or as numeric strings.

pub mod order;
pub mod product;

use serde_json::{Map, Value};

use shop_core::{Price, PriceError, ValidationErrors};

const REQUIRED: &str = "is required";
const MUST_BE_STRING: &str = "must be a string";
const MUST_BE_NUMBER: &str = "must be a number";
const MUST_BE_INTEGER: &str = "must be an integer";

/// Build a typed input from an untyped JSON body.
pub trait Validate: Sized {
    /// Validate `body`.
    ///
    /// # Errors
    ///
    /// Returns every rejected field, in field order.
    fn validate(body: &Value) -> Result<Self, ValidationErrors>;
}

/// Validate a path identifier: an integer of at least 1.
///
/// # Errors
///
/// Returns a single error on field `id`.
pub fn path_id(raw: &str) -> Result<i32, ValidationErrors> {
    match raw.parse::<i32>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(shop_core::FieldError::new("id", "must be an integer of at least 1").into()),
    }
}

/// Field accessor over one JSON object that accumulates errors.
pub(crate) struct Fields<'a> {
    object: Option<&'a Map<String, Value>>,
    errors: ValidationErrors,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(body: &'a Value) -> Self {
        let mut errors = ValidationErrors::new();
        let object = body.as_object();
        if object.is_none() {
            errors.push("body", "must be a JSON object");
        }
        Self { object, errors }
    }

    /// The value of `key`, with `null` read as absent.
    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.object
            .and_then(|o| o.get(key))
            .filter(|v| !v.is_null())
    }

    /// Parse a field that must be present.
    pub(crate) fn required<T>(
        &mut self,
        key: &str,
        parse: impl FnOnce(&'a Value) -> Result<T, String>,
    ) -> Option<T> {
        // A non-object body has already been reported once.
        if self.object.is_none() {
            return None;
        }
        let value = self.get(key);
        self.require(key, value, parse)
    }

    /// Parse a field that may be absent. `Some(None)` means absent.
    pub(crate) fn optional<T>(
        &mut self,
        key: &str,
        parse: impl FnOnce(&'a Value) -> Result<T, String>,
    ) -> Option<Option<T>> {
        match self.get(key) {
            None => Some(None),
            Some(value) => self.check(key, parse(value)).map(Some),
        }
    }

    /// Parse a value found at `field`, reporting it as required if absent.
    pub(crate) fn require<T>(
        &mut self,
        field: impl Into<String>,
        value: Option<&'a Value>,
        parse: impl FnOnce(&'a Value) -> Result<T, String>,
    ) -> Option<T> {
        match value.filter(|v| !v.is_null()) {
            None => {
                self.errors.push(field, REQUIRED);
                None
            }
            Some(value) => self.check(field, parse(value)),
        }
    }

    /// Record the error in `result`, if any.
    pub(crate) fn check<T>(
        &mut self,
        field: impl Into<String>,
        result: Result<T, String>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.errors.push(field, message);
                None
            }
        }
    }

    pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(field, message);
    }

    pub(crate) fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    pub(crate) fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        self.errors.into_result(value)
    }
}

/// A string, trimmed.
pub(crate) fn text(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(|s| s.trim().to_owned())
        .ok_or_else(|| MUST_BE_STRING.to_owned())
}

/// A trimmed string, with an empty one read as absent.
pub(crate) fn optional_text(value: &Value) -> Result<Option<String>, String> {
    text(value).map(|s| if s.is_empty() { None } else { Some(s) })
}

/// A non-negative amount with at most two decimal places kept.
pub(crate) fn price(value: &Value) -> Result<Price, String> {
    let parsed = match value {
        Value::Number(n) => Price::parse(&n.to_string()),
        Value::String(s) => Price::parse(s),
        _ => return Err(MUST_BE_NUMBER.to_owned()),
    };

    parsed.map_err(|e| match e {
        PriceError::Negative => "must be a non-negative number".to_owned(),
        PriceError::TooLarge { max } => format!("must be less than {max}"),
        PriceError::Invalid(_) => MUST_BE_NUMBER.to_owned(),
    })
}

#[allow(clippy::cast_possible_truncation)] // whole and bounded before the cast
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// An integer in `min..=i32::MAX`.
pub(crate) fn integer_at_least(value: &Value, min: i32) -> Result<i32, String> {
    let n = integer(value).ok_or_else(|| MUST_BE_INTEGER.to_owned())?;
    if n < i64::from(min) {
        return Err(format!("must be an integer of at least {min}"));
    }
    i32::try_from(n).map_err(|_| format!("must be at most {}", i32::MAX))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_path_id() {
        assert_eq!(path_id("12"), Ok(12));
        assert!(path_id("0").is_err());
        assert!(path_id("-3").is_err());
        assert!(path_id("abc").is_err());
        assert!(path_id("99999999999").is_err());
    }

    #[test]
    fn test_non_object_body_reports_once() {
        let mut fields = Fields::new(&Value::Null);
        assert_eq!(fields.required("name", text), None);
        let errors = fields.into_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_field("body"));
    }

    #[test]
    fn test_null_is_absent() {
        let body = json!({ "name": null });
        let mut fields = Fields::new(&body);
        assert_eq!(fields.optional("name", text), Some(None));
        assert_eq!(fields.required("name", text), None);
        assert!(fields.into_errors().contains_field("name"));
    }

    #[test]
    fn test_price_accepts_numbers_and_numeric_strings() {
        assert_eq!(price(&json!(99.99)), Price::parse("99.99").map_err(|e| e.to_string()));
        assert_eq!(price(&json!("5")), Price::parse("5").map_err(|e| e.to_string()));
        assert_eq!(price(&json!(-1)), Err("must be a non-negative number".to_owned()));
        assert_eq!(price(&json!("cheap")), Err(MUST_BE_NUMBER.to_owned()));
        assert_eq!(price(&json!(true)), Err(MUST_BE_NUMBER.to_owned()));
    }

    #[test]
    fn test_integer_at_least() {
        assert_eq!(integer_at_least(&json!(3), 1), Ok(3));
        assert_eq!(integer_at_least(&json!(3.0), 1), Ok(3));
        assert_eq!(integer_at_least(&json!("7"), 0), Ok(7));
        assert!(integer_at_least(&json!(0), 1).is_err());
        assert!(integer_at_least(&json!(1.5), 1).is_err());
        assert!(integer_at_least(&json!(4_000_000_000_i64), 1).is_err());
    }
}
