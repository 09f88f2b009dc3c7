//! End-to-end extraction against canned pages and API responses

use async_trait::async_trait;
use product_harvester_lib::application::sources::{
    GraphqlApiSource, PrestashopMetaSource, ShopifyMetaSource,
};
use product_harvester_lib::application::{
    ExtractionError, ExtractionOutcome, Orchestrator, ProductSource, build_sources,
};
use product_harvester_lib::domain::ProductRecord;
use product_harvester_lib::infrastructure::config::{
    AppConfig, PriceMapping, SourceConfig, SourceKind,
};
use product_harvester_lib::infrastructure::parsing::{PrestashopSelectors, ShopifySelectors};
use product_harvester_lib::infrastructure::{
    FetchError, JsonFileSink, MemorySink, PageFetcher, RecordSink,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SHOP_URL: &str = "https://shop.example/products/shades";
const CHOC_URL: &str = "https://choc.example/uk/trio";
const TJ_URL: &str = "https://tj.example/home/products/pdp/peach-raspberry-crisp-079424";
const TJ_API: &str = "https://tj.example/api/graphql";

/// Serves fixed bodies by URL and records every POST body
#[derive(Default)]
struct CannedFetcher {
    pages: HashMap<String, String>,
    posts: Mutex<Vec<(String, String)>>,
}

impl CannedFetcher {
    fn with(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    fn lookup(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status { status: 404, url: url.to_string() })
    }
}

#[async_trait]
impl PageFetcher for CannedFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.lookup(url)
    }

    async fn post_json(
        &self,
        url: &str,
        _headers: &[(String, String)],
        body: &str,
    ) -> Result<String, FetchError> {
        self.posts
            .lock()
            .unwrap()
            .push((url.to_string(), body.to_string()));
        self.lookup(url)
    }
}

fn shopify_page(meta_script: &str) -> String {
    format!(
        r#"<html><head>
            <meta property="og:title" content="Foreign Fortune Shades">
            <meta property="og:url" content="{SHOP_URL}">
            <meta property="og:description" content="Sunglasses.">
            <meta property="og:image" content="http://cdn.shop.example/shades.jpg">
            <meta property="og:price:amount" content="25.00">
            <meta property="og:price:currency" content="USD">
        </head><body>
            <img class="product-single__thumbnail-image" src="//cdn.shop.example/t1.jpg">
            <img class="product-single__thumbnail-image" src="//cdn.shop.example/t2.jpg">
            <label for="SingleOptionSelector-0">Color</label>
            <label for="SingleOptionSelector-1"> Size </label>
            <script>{meta_script}</script>
        </body></html>"#
    )
}

const SHOPIFY_META: &str = r#"var meta = {"product":{"id":6614556278989,"vendor":"Foreign Fortune","variants":[{"id":1,"price":2500,"public_title":"Black / One Size"},{"id":2,"price":2500,"public_title":null},{"id":3,"price":2700,"public_title":"Tortoise"}]}};"#;

fn prestashop_page() -> String {
    format!(
        r#"<html><head>
            <meta property="og:title" content="Soveria">
            <meta property="og:url" content="{CHOC_URL}">
            <meta property="og:image" content="https://choc.example/img/soveria.jpg">
            <meta property="og:site_name" content="Alain Ducasse">
            <meta property="product:price:amount" content="24.5">
        </head><body>
            <ul><li class="productImages-item"><a href="https://choc.example/img/1.jpg"></a></li>
                <li class="productImages-item"><a href="https://choc.example/img/2.jpg"></a></li></ul>
            <script>var prodid = '1234';</script>
        </body></html>"#
    )
}

fn tj_page() -> &'static str {
    r#"<html><head><meta property="og:site_name" content="Trader Joe's"></head></html>"#
}

fn tj_response() -> String {
    json!({"data": {"products": {"items": [{
        "item_title": "Peach Raspberry Crisp",
        "item_story_qil": "Crisp.",
        "sku": "079424",
        "retail_price": "5.49",
        "price_range": {"minimum_price": {"final_price": {"value": 5.49}}},
        "primary_image": "/content/dam/crisp.png",
        "primary_image_meta": {"metadata": "{\\\"srcSet\\\":[{\\\"src\\\":\\\"/content/dam/crisp.png/jcr:content/renditions/w.png\\\"}]}"}
    }]}}})
    .to_string()
}

fn shopify(fetcher: CannedFetcher) -> ShopifyMetaSource {
    ShopifyMetaSource::new("foreign_fortune", SHOP_URL, &ShopifySelectors::default(), Arc::new(fetcher))
        .unwrap()
}

fn accepted(outcome: Result<ExtractionOutcome, ExtractionError>) -> ProductRecord {
    match outcome {
        Ok(ExtractionOutcome::Accepted(record)) => record,
        other => panic!("expected an accepted record, got {other:?}"),
    }
}

#[tokio::test]
async fn shopify_page_yields_variants_zipped_with_labels() {
    let source = shopify(CannedFetcher::default().with(SHOP_URL, shopify_page(SHOPIFY_META)));
    let record = accepted(source.extract().await);

    assert_eq!(record.title, "Foreign Fortune Shades");
    assert_eq!(record.brand.as_deref(), Some("Foreign Fortune"));
    assert_eq!(record.product_id.as_deref(), Some("6614556278989"));
    assert_eq!(record.price, Some(25.0));
    assert_eq!(record.prices, vec![25.0]);
    assert_eq!(
        record.images,
        vec!["http://cdn.shop.example/t1.jpg", "http://cdn.shop.example/t2.jpg"]
    );

    let variants: Vec<_> = record.variants().collect();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].options.get("Color").map(String::as_str), Some("Black"));
    assert_eq!(variants[0].options.get("Size").map(String::as_str), Some("One Size"));
    assert_eq!(variants[1].id, "3");
    assert_eq!(variants[1].price, Some(27.0));
    assert_eq!(variants[1].options.len(), 1);
    assert_eq!(variants[1].image.as_deref(), Some("http://cdn.shop.example/shades.jpg"));
}

#[tokio::test]
async fn shopify_page_with_broken_meta_blob_is_rejected() {
    let page = shopify_page("var meta = {\"product\": {oops}};");
    let source = shopify(CannedFetcher::default().with(SHOP_URL, page.as_str()));

    let record = source.parse_page(&page).unwrap();
    assert_eq!(record.brand, None);
    assert_eq!(record.product_id, None);
    assert_eq!(record.variants().count(), 0);

    match source.extract().await {
        Ok(ExtractionOutcome::Rejected { diagnostics }) => {
            assert_eq!(diagnostics, vec!["Mandatory field 'product_id' is missing".to_string()]);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn prestashop_page_reads_gallery_and_inline_id() {
    let fetcher = CannedFetcher::default().with(CHOC_URL, prestashop_page());
    let source = PrestashopMetaSource::new(
        "lechocolat",
        CHOC_URL,
        &PrestashopSelectors::default(),
        Arc::new(fetcher),
    )
    .unwrap();

    let record = accepted(source.extract().await);
    assert_eq!(record.brand.as_deref(), Some("Alain Ducasse"));
    assert_eq!(record.product_id.as_deref(), Some("1234"));
    assert_eq!(record.price, Some(24.5));
    assert_eq!(record.sale_prices, vec![24.5]);
    assert_eq!(record.images.len(), 2);
    assert!(record.models.is_empty());
}

#[tokio::test]
async fn graphql_source_posts_search_and_maps_item() {
    let fetcher = Arc::new(
        CannedFetcher::default()
            .with(TJ_URL, tj_page())
            .with(TJ_API, tj_response()),
    );
    let source = GraphqlApiSource::new(
        "trader_joes",
        TJ_URL,
        TJ_API,
        "https://tj.example",
        PriceMapping::RetailAsPrice,
        fetcher.clone(),
    )
    .unwrap();

    let record = accepted(source.extract().await);
    assert_eq!(record.brand.as_deref(), Some("Trader Joe's"));
    assert_eq!(record.product_id.as_deref(), Some("079424"));
    assert_eq!(record.image, "https://tj.example/content/dam/crisp.png");
    assert_eq!(record.images, vec!["https://tj.example/content/dam/crisp.png"]);
    assert_eq!(record.price, Some(5.49));

    let posts = fetcher.posts.lock().unwrap().clone();
    assert_eq!(posts.len(), 1);
    let body: Value = serde_json::from_str(&posts[0].1).unwrap();
    assert_eq!(body["variables"]["sku"], "079424");
}

#[tokio::test]
async fn run_continues_past_failing_sources() {
    // Only the GraphQL endpoint is unreachable.
    let fetcher: Arc<dyn PageFetcher> = Arc::new(
        CannedFetcher::default()
            .with(SHOP_URL, shopify_page(SHOPIFY_META))
            .with(CHOC_URL, prestashop_page())
            .with(TJ_URL, tj_page()),
    );
    let config = AppConfig {
        sources: vec![
            SourceConfig {
                name: "trader_joes".to_string(),
                url: TJ_URL.to_string(),
                kind: SourceKind::GraphqlApi {
                    api_url: TJ_API.to_string(),
                    base_url: "https://tj.example".to_string(),
                    price_mapping: PriceMapping::default(),
                },
            },
            SourceConfig {
                name: "foreign_fortune".to_string(),
                url: SHOP_URL.to_string(),
                kind: SourceKind::ShopifyMeta { selectors: ShopifySelectors::default() },
            },
            SourceConfig {
                name: "lechocolat".to_string(),
                url: CHOC_URL.to_string(),
                kind: SourceKind::PrestashopMeta { selectors: PrestashopSelectors::default() },
            },
        ],
        ..AppConfig::default()
    };

    let sources = build_sources(&config, &fetcher).unwrap();
    let sink = Arc::new(MemorySink::new());
    let summary = Orchestrator::new(sources, sink.clone()).run().await;

    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "trader_joes");
    assert_eq!(summary.accepted, vec!["foreign_fortune", "lechocolat"]);

    let writes = sink.writes();
    assert_eq!(writes.len(), 3);
    assert!(writes[0].1.is_none());
    assert!(writes[1].1.is_some());
    assert!(writes[2].1.is_some());
}

#[tokio::test]
async fn accepted_record_round_trips_through_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = shopify(CannedFetcher::default().with(SHOP_URL, shopify_page(SHOPIFY_META)));
    let record = accepted(source.extract().await);

    let sink = JsonFileSink::new(dir.path(), "_output.json");
    sink.write("foreign_fortune", Some(&record)).await.unwrap();

    let text = std::fs::read_to_string(dir.path().join("foreign_fortune_output.json")).unwrap();
    assert!(text.starts_with("{\n    \""));
    let parsed: ProductRecord = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, record);

    let raw: Value = serde_json::from_str(&text).unwrap();
    let variant = &raw["models"][0]["variants"][0];
    assert_eq!(variant["Color"], "Black");
    assert_eq!(variant["id"], "1");
}
