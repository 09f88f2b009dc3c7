//! Structured-field extraction for product pages
//!
//! Declarative selectors over a parsed HTML tree, plus best-effort sideband
//! extraction of script-embedded metadata and small value coercions shared by
//! every source adapter.

pub mod config;
pub mod document;
pub mod error;
pub mod sideband;

// Re-export public types
pub use config::{FieldSelector, MetaSelectors, PrestashopSelectors, ShopifySelectors};
pub use document::{CompiledSelector, HtmlDocument};
pub use error::{ParsingError, ParsingResult};
pub use sideband::SidebandPattern;

use serde_json::Value;

/// Parse a price that may be written with surrounding whitespace.
pub fn parse_amount(field: &str, raw: &str) -> ParsingResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ParsingError::invalid_number(field, raw))
}

/// A JSON number, or a string holding one.
pub fn json_amount(field: &str, value: &Value) -> ParsingResult<f64> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| ParsingError::invalid_number(field, &number.to_string())),
        Value::String(text) => parse_amount(field, text),
        other => Err(ParsingError::invalid_number(field, &other.to_string())),
    }
}

/// Render a JSON identifier (number or string) as text.
pub fn json_identifier(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("price", " 25.00 ").unwrap(), 25.0);
        assert!(matches!(
            parse_amount("price", "£25"),
            Err(ParsingError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_json_amount_accepts_numbers_and_strings() {
        assert_eq!(json_amount("price", &json!(2500)).unwrap(), 2500.0);
        assert_eq!(json_amount("price", &json!("3.99")).unwrap(), 3.99);
        assert!(json_amount("price", &json!(null)).is_err());
    }

    #[test]
    fn test_json_identifier() {
        assert_eq!(json_identifier(&json!(39281)).as_deref(), Some("39281"));
        assert_eq!(json_identifier(&json!("079424")).as_deref(), Some("079424"));
        assert_eq!(json_identifier(&json!("")), None);
        assert_eq!(json_identifier(&json!(null)), None);
    }
}
