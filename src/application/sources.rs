//! Concrete source adapters, one per source kind
//!
//! The two meta-tag adapters share Open Graph scalar extraction through
//! [`CompiledMeta`]; the GraphQL adapter only reads the site name from its page.

pub mod graphql_api;
pub mod prestashop_meta;
pub mod shopify_meta;

pub use graphql_api::GraphqlApiSource;
pub use prestashop_meta::PrestashopMetaSource;
pub use shopify_meta::ShopifyMetaSource;

use crate::infrastructure::parsing::{
    CompiledSelector, HtmlDocument, MetaSelectors, ParsingResult, parse_amount,
};
use tracing::debug;

/// Compiled Open Graph selectors
pub(crate) struct CompiledMeta {
    title: CompiledSelector,
    url: CompiledSelector,
    description: CompiledSelector,
    image: CompiledSelector,
    price_amount: CompiledSelector,
    price_currency: CompiledSelector,
    site_name: CompiledSelector,
}

/// Scalar fields read from meta tags
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MetaFields {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub image: String,
    pub price: Option<f64>,
    pub site_name: Option<String>,
}

impl CompiledMeta {
    pub fn compile(selectors: &MetaSelectors) -> ParsingResult<Self> {
        Ok(Self {
            title: CompiledSelector::compile(&selectors.title)?,
            url: CompiledSelector::compile(&selectors.url)?,
            description: CompiledSelector::compile(&selectors.description)?,
            image: CompiledSelector::compile(&selectors.image)?,
            price_amount: CompiledSelector::compile(&selectors.price_amount)?,
            price_currency: CompiledSelector::compile(&selectors.price_currency)?,
            site_name: CompiledSelector::compile(&selectors.site_name)?,
        })
    }

    /// `url` and `image` are required; a present price must be numeric.
    pub fn extract(&self, doc: &HtmlDocument) -> ParsingResult<MetaFields> {
        let url = doc.require(&self.url, "url")?;
        let image = doc.require(&self.image, "image")?;

        let price = match doc.first(&self.price_amount).filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(parse_amount("price", &raw)?),
            None => None,
        };
        if let Some(currency) = doc.first(&self.price_currency) {
            debug!("Price currency for {}: {}", url, currency);
        }

        Ok(MetaFields {
            title: doc.first(&self.title).unwrap_or_default(),
            url,
            description: non_empty(doc.first(&self.description)),
            image,
            price,
            site_name: non_empty(doc.first(&self.site_name)),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `[price]` when present, otherwise empty.
pub(crate) fn single_price(price: Option<f64>) -> Vec<f64> {
    price.into_iter().collect()
}
