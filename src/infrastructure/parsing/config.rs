//! Declarative selector configuration for HTML extraction
//!
//! Each source kind gets a selector set with defaults matching the live site
//! markup; all of them can be overridden from the configuration file.

use serde::{Deserialize, Serialize};

/// Locates a value in an HTML tree: a CSS selector plus an optional attribute.
///
/// With `attr` unset the element's trimmed text content is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub css: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

impl FieldSelector {
    pub fn attr(css: &str, attr: &str) -> Self {
        Self {
            css: css.to_string(),
            attr: Some(attr.to_string()),
        }
    }

    pub fn text(css: &str) -> Self {
        Self {
            css: css.to_string(),
            attr: None,
        }
    }

    /// `<meta property="..." content="...">`
    pub fn meta_property(property: &str) -> Self {
        Self::attr(&format!("meta[property=\"{property}\"]"), "content")
    }
}

impl std::fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.attr {
            Some(attr) => write!(f, "{}@{}", self.css, attr),
            None => write!(f, "{}", self.css),
        }
    }
}

/// Open Graph scalar fields shared by the meta-tag sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaSelectors {
    pub title: FieldSelector,
    pub url: FieldSelector,
    pub description: FieldSelector,
    pub image: FieldSelector,
    pub price_amount: FieldSelector,
    pub price_currency: FieldSelector,
    pub site_name: FieldSelector,
}

impl MetaSelectors {
    /// Open Graph selectors with price tags under `price_prefix` (e.g. `og:price`).
    pub fn with_price_prefix(price_prefix: &str) -> Self {
        Self {
            title: FieldSelector::meta_property("og:title"),
            url: FieldSelector::meta_property("og:url"),
            description: FieldSelector::meta_property("og:description"),
            image: FieldSelector::meta_property("og:image"),
            price_amount: FieldSelector::meta_property(&format!("{price_prefix}:amount")),
            price_currency: FieldSelector::meta_property(&format!("{price_prefix}:currency")),
            site_name: FieldSelector::meta_property("og:site_name"),
        }
    }
}

impl Default for MetaSelectors {
    fn default() -> Self {
        Self::with_price_prefix("og:price")
    }
}

/// Selectors for Shopify themes exposing a `var meta = {...}` blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopifySelectors {
    pub meta: MetaSelectors,
    pub thumbnails: FieldSelector,
    pub option_labels: FieldSelector,
    /// JavaScript variable holding the product metadata object
    pub meta_variable: String,
}

impl Default for ShopifySelectors {
    fn default() -> Self {
        Self {
            meta: MetaSelectors::with_price_prefix("og:price"),
            thumbnails: FieldSelector::attr("img[class=\"product-single__thumbnail-image\"]", "src"),
            option_labels: FieldSelector::text("label[for*=\"SingleOptionSelector\"]"),
            meta_variable: "meta".to_string(),
        }
    }
}

/// Selectors for PrestaShop product pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestashopSelectors {
    pub meta: MetaSelectors,
    pub gallery: FieldSelector,
    /// JavaScript variable assigned the product id as a quoted string
    pub product_id_variable: String,
}

impl Default for PrestashopSelectors {
    fn default() -> Self {
        Self {
            meta: MetaSelectors::with_price_prefix("product:price"),
            gallery: FieldSelector::attr("li[class*=\"productImages\"] > a", "href"),
            product_id_variable: "prodid".to_string(),
        }
    }
}
