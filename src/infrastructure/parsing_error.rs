//! Parsing error types for structured-field extraction
//!
//! Covers selector compilation, required selector hits, embedded JSON blobs
//! and numeric conversions. Missing optional data is not an error here; it is
//! modelled as `None` or an empty value by the callers.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("Required field '{field}' not found{}", .selector.as_ref().map(|s| format!(" (selector: {s})")).unwrap_or_default())]
    RequiredFieldMissing {
        field: String,
        selector: Option<String>,
    },

    #[error("Invalid selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("JSON parsing failed for {context}: {reason}")]
    JsonParsingFailed { context: String, reason: String },

    #[error("Field '{field}' is not a number: {value}")]
    InvalidNumber { field: String, value: String },

    #[error("Variant {variant_id} could not be processed: {reason}")]
    VariantProcessingFailed { variant_id: String, reason: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ParsingError {
    /// Create a required field missing error with the selector that was tried
    pub fn required_field_missing(field: &str, selector: Option<&str>) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            selector: selector.map(ToString::to_string),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn json_parsing_failed(context: &str, reason: impl ToString) -> Self {
        Self::JsonParsingFailed {
            context: context.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_number(field: &str, value: &str) -> Self {
        Self::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn variant_processing_failed(variant_id: &str, reason: impl ToString) -> Self {
        Self::VariantProcessingFailed {
            variant_id: variant_id.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field_message_names_selector() {
        let err = ParsingError::required_field_missing("image", Some("meta[property=\"og:image\"]"));
        assert_eq!(
            err.to_string(),
            "Required field 'image' not found (selector: meta[property=\"og:image\"])"
        );
    }

    #[test]
    fn test_required_field_message_without_selector() {
        let err = ParsingError::required_field_missing("data.products.items[0]", None);
        assert_eq!(err.to_string(), "Required field 'data.products.items[0]' not found");
    }
}
