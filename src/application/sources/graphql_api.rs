//! GraphQL-backed product source
//!
//! The product page only supplies the site name. Everything else comes from a
//! fixed `SearchProduct` query keyed by the SKU at the end of the product URL.

use super::single_price;
use crate::application::product_source::{ExtractionError, ExtractionOutcome, ProductSource, finalize};
use crate::domain::ProductRecord;
use crate::infrastructure::PageFetcher;
use crate::infrastructure::config::PriceMapping;
use crate::infrastructure::parsing::{
    CompiledSelector, FieldSelector, HtmlDocument, ParsingError, ParsingResult, json_amount,
    json_identifier,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

pub const SEARCH_PRODUCT_OPERATION: &str = "SearchProduct";
pub const STORE_CODE: &str = "TJ";
pub const PUBLISHED: &str = "1";

/// Image URLs in the metadata carry a rendition suffix starting here.
pub const IMAGE_RENDITION_MARKER: &str = "/jcr";

pub const SEARCH_PRODUCT_QUERY: &str = concat!(
    "query SearchProduct($sku: String, $storeCode: String = \"TJ\", $published: String = \"1\") { ",
    "products(filter: {sku: {eq: $sku}, store_code: {eq: $storeCode}, published: {eq: $published}}) { ",
    "items { category_hierarchy { id url_key description name position level created_at updated_at product_count __typename } ",
    "item_story_marketing product_label fun_tags primary_image primary_image_meta { url metadata __typename } ",
    "other_images other_images_meta { url metadata __typename } context_image context_image_meta { url metadata __typename } ",
    "published sku url_key name item_description item_title item_characteristics item_story_qil use_and_demo sales_size ",
    "sales_uom_code sales_uom_description country_of_origin availability new_product promotion price_range { ",
    "minimum_price { final_price { currency value __typename } __typename } __typename } retail_price nutrition { ",
    "display_sequence panel_id panel_title serving_size calories_per_serving servings_per_container details { display_seq ",
    "nutritional_item amount percent_dv __typename } __typename } ingredients { display_sequence ingredient __typename } ",
    "allergens { display_sequence ingredient __typename } created_at first_published_date last_published_date updated_at ",
    "related_products { sku item_title primary_image primary_image_meta { url metadata __typename } price_range { ",
    "minimum_price { final_price { currency value __typename } __typename } __typename } retail_price sales_size ",
    "sales_uom_description category_hierarchy { id name __typename } __typename } __typename } total_count page_info { ",
    "current_page page_size total_pages __typename } __typename } }"
);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

pub struct GraphqlApiSource {
    name: String,
    url: String,
    api_url: String,
    base_url: String,
    price_mapping: PriceMapping,
    fetcher: Arc<dyn PageFetcher>,
    site_name: CompiledSelector,
}

impl GraphqlApiSource {
    pub fn new(
        name: &str,
        url: &str,
        api_url: &str,
        base_url: &str,
        price_mapping: PriceMapping,
        fetcher: Arc<dyn PageFetcher>,
    ) -> ParsingResult<Self> {
        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
            api_url: api_url.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            price_mapping,
            fetcher,
            site_name: CompiledSelector::compile(&FieldSelector::meta_property("og:site_name"))?,
        })
    }

    /// Browser-like headers; the endpoint rejects requests without them.
    pub fn request_headers(&self) -> Vec<(String, String)> {
        [
            ("accept", "*/*"),
            ("accept-language", "en-US,en;q=0.9"),
            ("content-type", "application/json"),
            ("origin", self.base_url.as_str()),
            ("priority", "u=1, i"),
            ("referer", self.url.as_str()),
            ("sec-ch-ua", "\"Not/A)Brand\";v=\"8\", \"Chromium\";v=\"126\", \"Brave\";v=\"126\""),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", "\"Windows\""),
            ("sec-fetch-dest", "empty"),
            ("sec-fetch-mode", "cors"),
            ("sec-fetch-site", "same-origin"),
            ("sec-gpc", "1"),
            ("user-agent", BROWSER_USER_AGENT),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
    }

    fn site_name_from_page(&self, page: &str) -> Option<String> {
        HtmlDocument::parse(page)
            .first(&self.site_name)
            .filter(|name| !name.is_empty())
    }

    /// Build the candidate record from the API response text.
    pub fn parse_response(&self, response: &str, brand: Option<String>) -> ParsingResult<ProductRecord> {
        let root: Value = serde_json::from_str(response)
            .map_err(|e| ParsingError::json_parsing_failed("GraphQL response", e))?;
        let item = root
            .pointer("/data/products/items/0")
            .ok_or_else(|| ParsingError::required_field_missing("data.products.items[0]", None))?;

        let primary_image = item
            .get("primary_image")
            .and_then(Value::as_str)
            .ok_or_else(|| ParsingError::required_field_missing("primary_image", None))?;
        let effective = optional_amount(
            item.pointer("/price_range/minimum_price/final_price/value"),
            "price_range.minimum_price.final_price.value",
        )?;
        let retail = optional_amount(item.get("retail_price"), "retail_price")?;
        debug!("{} prices: retail={:?} effective={:?}", self.name, retail, effective);

        let mut record = ProductRecord::new(self.url.clone(), format!("{}{}", self.base_url, primary_image));
        record.brand = brand;
        record.title = item
            .get("item_title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        record.description = item
            .get("item_story_qil")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        record.product_id = item.get("sku").and_then(json_identifier);
        record.images = item
            .pointer("/primary_image_meta/metadata")
            .and_then(Value::as_str)
            .map(|metadata| responsive_images(metadata, &self.base_url))
            .unwrap_or_default();

        match self.price_mapping {
            PriceMapping::RetailAsPrice => {
                record.price = retail;
                record.prices = single_price(effective);
                record.sale_prices = single_price(effective);
            }
            PriceMapping::EffectiveAsPrice => {
                record.price = effective;
                record.prices = single_price(retail.or(effective));
                record.sale_prices = single_price(effective);
            }
        }
        Ok(record)
    }
}

#[async_trait]
impl ProductSource for GraphqlApiSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self) -> Result<ExtractionOutcome, ExtractionError> {
        let sku = sku_from_url(&self.url)?;
        let page = self.fetcher.fetch_text(&self.url).await?;
        let brand = self.site_name_from_page(&page);

        let body = search_product_body(&sku);
        let response = self
            .fetcher
            .post_json(&self.api_url, &self.request_headers(), &body)
            .await?;
        let record = self.parse_response(&response, brand)?;
        Ok(finalize(&self.name, record))
    }
}

/// The text after the last `-` of the URL's final path segment.
pub fn sku_from_url(product_url: &str) -> ParsingResult<String> {
    let parsed = Url::parse(product_url).map_err(|e| ParsingError::InvalidUrl {
        url: product_url.to_string(),
        reason: e.to_string(),
    })?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .and_then(|segment| segment.rsplit('-').next())
        .filter(|sku| !sku.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ParsingError::InvalidUrl {
            url: product_url.to_string(),
            reason: "no SKU in the final path segment".to_string(),
        })
}

/// JSON body of the `SearchProduct` request.
pub fn search_product_body(sku: &str) -> String {
    json!({
        "operationName": SEARCH_PRODUCT_OPERATION,
        "variables": {
            "storeCode": STORE_CODE,
            "published": PUBLISHED,
            "sku": sku,
        },
        "query": SEARCH_PRODUCT_QUERY,
    })
    .to_string()
}

/// Image URLs from the escaped `srcSet` metadata string.
///
/// Malformed metadata yields no images rather than failing the record.
pub fn responsive_images(metadata: &str, base_url: &str) -> Vec<String> {
    let unescaped = metadata.replace('\\', "");
    let parsed: Value = match serde_json::from_str(&unescaped) {
        Ok(value) => value,
        Err(e) => {
            warn!("Image metadata is not valid JSON, ignoring it: {}", e);
            return Vec::new();
        }
    };

    parsed
        .get("srcSet")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("src").and_then(Value::as_str))
                .map(|src| {
                    let path = src.split(IMAGE_RENDITION_MARKER).next().unwrap_or(src);
                    format!("{base_url}{path}")
                })
                .collect()
        })
        .unwrap_or_default()
}

fn optional_amount(value: Option<&Value>, field: &str) -> ParsingResult<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => json_amount(field, value).map(Some),
    }
}
