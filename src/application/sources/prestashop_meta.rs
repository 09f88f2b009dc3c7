//! PrestaShop product pages
//!
//! Open Graph scalars with `product:price:*` price tags, gallery links for
//! images, and the product id from an inline `prodid = '...';` assignment.
//! These pages carry no variant list.

use super::{CompiledMeta, single_price};
use crate::application::product_source::{ExtractionError, ExtractionOutcome, ProductSource, finalize};
use crate::domain::ProductRecord;
use crate::infrastructure::PageFetcher;
use crate::infrastructure::parsing::sideband::inline_string_assignment;
use crate::infrastructure::parsing::{
    CompiledSelector, HtmlDocument, ParsingResult, PrestashopSelectors, SidebandPattern,
};
use async_trait::async_trait;
use std::sync::Arc;

pub struct PrestashopMetaSource {
    name: String,
    url: String,
    fetcher: Arc<dyn PageFetcher>,
    meta: CompiledMeta,
    gallery: CompiledSelector,
    product_id: SidebandPattern,
}

impl PrestashopMetaSource {
    pub fn new(
        name: &str,
        url: &str,
        selectors: &PrestashopSelectors,
        fetcher: Arc<dyn PageFetcher>,
    ) -> ParsingResult<Self> {
        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
            fetcher,
            meta: CompiledMeta::compile(&selectors.meta)?,
            gallery: CompiledSelector::compile(&selectors.gallery)?,
            product_id: SidebandPattern::string_assignment(&selectors.product_id_variable)?,
        })
    }

    pub fn parse_page(&self, page: &str) -> ParsingResult<ProductRecord> {
        let doc = HtmlDocument::parse(page);
        let fields = self.meta.extract(&doc)?;

        let mut record = ProductRecord::new(fields.url, fields.image);
        record.title = fields.title;
        record.description = fields.description;
        record.brand = fields.site_name;
        record.images = doc.select(&self.gallery);
        record.price = fields.price;
        record.prices = single_price(fields.price);
        record.sale_prices = single_price(fields.price);
        record.product_id = inline_string_assignment(page, &self.product_id)
            .filter(|id| !id.is_empty());
        Ok(record)
    }
}

#[async_trait]
impl ProductSource for PrestashopMetaSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self) -> Result<ExtractionOutcome, ExtractionError> {
        let page = self.fetcher.fetch_text(&self.url).await?;
        let record = self.parse_page(&page)?;
        Ok(finalize(&self.name, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::FetchError;

    struct Offline;

    #[async_trait]
    impl PageFetcher for Offline {
        async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            Err(FetchError::Status { status: 503, url: url.to_string() })
        }

        async fn post_json(
            &self,
            url: &str,
            _headers: &[(String, String)],
            _body: &str,
        ) -> Result<String, FetchError> {
            Err(FetchError::Status { status: 503, url: url.to_string() })
        }
    }

    const HEAD: &str = r#"<meta property="og:url" content="https://choc.example/p">
        <meta property="og:image" content="https://choc.example/p.jpg">"#;

    fn source(selectors: &PrestashopSelectors) -> PrestashopMetaSource {
        PrestashopMetaSource::new("lechocolat", "https://choc.example/p", selectors, Arc::new(Offline))
            .unwrap()
    }

    #[test]
    fn test_product_id_variable_comes_from_selectors() {
        let selectors = PrestashopSelectors {
            product_id_variable: "id_product".to_string(),
            ..PrestashopSelectors::default()
        };
        let page = format!("{HEAD}<script>var prodid = '1'; var id_product = '77';</script>");

        let record = source(&selectors).parse_page(&page).unwrap();
        assert_eq!(record.product_id.as_deref(), Some("77"));
    }

    #[test]
    fn test_empty_inline_id_is_absent() {
        let page = format!("{HEAD}<script>var prodid = '';</script>");
        let record = source(&PrestashopSelectors::default()).parse_page(&page).unwrap();
        assert_eq!(record.product_id, None);
        assert!(record.images.is_empty());
        assert_eq!(record.brand, None);
    }
}
