//! Cross-field validation of candidate product records
//!
//! The validator never mutates a record and never fails: it returns every
//! semantic violation it finds as a human-readable diagnostic. An empty list
//! means the record may be persisted.

use super::product::ProductRecord;

/// Fields that must be present and truthy on an accepted record.
pub const MANDATORY_FIELDS: [&str; 3] = ["title", "product_id", "price"];

/// Validate a candidate record. All checks run; none short-circuits.
pub fn validate(record: &ProductRecord) -> Vec<String> {
    let mut errors = Vec::new();
    check_sale_prices(record, &mut errors);
    check_mandatory_fields(record, &mut errors);
    check_variants(record, &mut errors);
    errors
}

/// True when `validate` would return no diagnostics.
pub fn is_valid(record: &ProductRecord) -> bool {
    validate(record).is_empty()
}

fn check_sale_prices(record: &ProductRecord, errors: &mut Vec<String>) {
    // An absent price compares as 0, so any positive sale price is flagged too.
    let original_price = record.price.unwrap_or(0.0);
    for sale_price in &record.sale_prices {
        if *sale_price > original_price {
            errors.push(format!(
                "Sale price {sale_price} is greater than original price {original_price}"
            ));
        }
    }
}

fn check_mandatory_fields(record: &ProductRecord, errors: &mut Vec<String>) {
    for field in MANDATORY_FIELDS {
        let present = match field {
            "title" => !record.title.is_empty(),
            "product_id" => record.product_id.as_deref().is_some_and(|id| !id.is_empty()),
            "price" => is_truthy_amount(record.price),
            _ => true,
        };
        if !present {
            errors.push(format!("Mandatory field '{field}' is missing"));
        }
    }
}

fn check_variants(record: &ProductRecord, errors: &mut Vec<String>) {
    for variant in record.variants() {
        if variant.image.as_deref().is_none_or(str::is_empty) {
            errors.push(format!("Variant {} is missing an image", variant.id));
        }
        if !is_truthy_amount(variant.price) {
            errors.push(format!("Variant {} is missing a price", variant.id));
        }
    }
}

/// Zero counts as missing, matching how the sources encode "no price".
fn is_truthy_amount(amount: Option<f64>) -> bool {
    amount.is_some_and(|value| value != 0.0 && !value.is_nan())
}
