//! Shopify-style product pages
//!
//! Scalars come from Open Graph meta tags. Vendor, numeric product id and the
//! raw variant list come from the `var meta = {...}` script blob; each variant's
//! `public_title` ("Red / Large") is zipped against the option labels on the page.

use super::{CompiledMeta, single_price};
use crate::application::product_source::{ExtractionError, ExtractionOutcome, ProductSource, finalize};
use crate::domain::{Model, ProductRecord, Variant};
use crate::infrastructure::PageFetcher;
use crate::infrastructure::parsing::sideband::script_json;
use crate::infrastructure::parsing::{
    CompiledSelector, HtmlDocument, ParsingError, ParsingResult, ShopifySelectors, SidebandPattern,
    json_amount, json_identifier,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Variant prices are stored in minor units (cents).
const MINOR_UNITS_PER_UNIT: f64 = 100.0;

pub struct ShopifyMetaSource {
    name: String,
    url: String,
    fetcher: Arc<dyn PageFetcher>,
    meta: CompiledMeta,
    thumbnails: CompiledSelector,
    option_labels: CompiledSelector,
    meta_blob: SidebandPattern,
}

impl ShopifyMetaSource {
    pub fn new(
        name: &str,
        url: &str,
        selectors: &ShopifySelectors,
        fetcher: Arc<dyn PageFetcher>,
    ) -> ParsingResult<Self> {
        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
            fetcher,
            meta: CompiledMeta::compile(&selectors.meta)?,
            thumbnails: CompiledSelector::compile(&selectors.thumbnails)?,
            option_labels: CompiledSelector::compile(&selectors.option_labels)?,
            meta_blob: SidebandPattern::script_object(&selectors.meta_variable)?,
        })
    }

    /// Build the candidate record from the page text.
    pub fn parse_page(&self, page: &str) -> ParsingResult<ProductRecord> {
        let doc = HtmlDocument::parse(page);
        let fields = self.meta.extract(&doc)?;
        let labels = doc.select(&self.option_labels);
        let images = doc
            .select(&self.thumbnails)
            .into_iter()
            .map(|src| absolutize_protocol_relative(&src))
            .collect();

        let blob = script_json(page, &self.meta_blob);
        let product = blob.get("product").unwrap_or(&Value::Null);
        let raw_variants = product
            .get("variants")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut record = ProductRecord::new(fields.url, fields.image.clone());
        record.title = fields.title;
        record.description = fields.description;
        record.brand = product.get("vendor").and_then(Value::as_str).map(ToString::to_string);
        record.product_id = product.get("id").and_then(json_identifier);
        record.images = images;
        record.price = fields.price;
        record.prices = single_price(fields.price);
        record.sale_prices = single_price(fields.price);
        record.models = vec![Model {
            variants: process_variants(raw_variants, &fields.image, &labels),
        }];
        Ok(record)
    }
}

#[async_trait]
impl ProductSource for ShopifyMetaSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self) -> Result<ExtractionOutcome, ExtractionError> {
        let page = self.fetcher.fetch_text(&self.url).await?;
        let record = self.parse_page(&page)?;
        Ok(finalize(&self.name, record))
    }
}

/// Thumbnails are served protocol-relative (`//cdn...`).
fn absolutize_protocol_relative(src: &str) -> String {
    if src.starts_with("//") {
        format!("http:{src}")
    } else {
        src.to_string()
    }
}

/// Convert raw variants, skipping any that are untitled or malformed.
///
/// A bad variant is logged and dropped; it never fails the extraction.
pub fn process_variants(raw_variants: &[Value], image_url: &str, labels: &[String]) -> Vec<Variant> {
    raw_variants
        .iter()
        .filter_map(|raw| match build_variant(raw, image_url, labels) {
            Ok(variant) => variant,
            Err(e) => {
                warn!("Error processing variant: {}", e);
                None
            }
        })
        .collect()
}

fn build_variant(raw: &Value, image_url: &str, labels: &[String]) -> ParsingResult<Option<Variant>> {
    let id = raw.get("id").and_then(json_identifier);
    let display_id = id.clone().unwrap_or_else(|| "<unknown>".to_string());

    let Some(public_title) = raw
        .get("public_title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
    else {
        info!("Skipping variant with id {} because public_title is missing or empty", display_id);
        return Ok(None);
    };

    let id = match (id, raw.get("id")) {
        (Some(id), _) => id,
        (None, None | Some(Value::Null)) => {
            return Err(ParsingError::variant_processing_failed(&display_id, "missing 'id'"));
        }
        (None, Some(Value::String(_))) => {
            return Err(ParsingError::variant_processing_failed(&display_id, "empty 'id'"));
        }
        (None, Some(other)) => {
            return Err(ParsingError::variant_processing_failed(
                &display_id,
                format!("'id' has unexpected type: {other}"),
            ));
        }
    };
    let price = raw
        .get("price")
        .ok_or_else(|| ParsingError::variant_processing_failed(&id, "missing 'price'"))
        .and_then(|value| {
            json_amount("price", value).map_err(|e| ParsingError::variant_processing_failed(&id, e))
        })?;

    Ok(Some(
        Variant::new(id)
            .with_image(image_url)
            .with_price(price / MINOR_UNITS_PER_UNIT)
            .with_options_from_title(public_title, labels),
    ))
}
