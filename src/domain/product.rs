use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys a variant owns itself; option labels may not shadow them.
pub const RESERVED_VARIANT_KEYS: [&str; 3] = ["id", "image", "price"];

/// Canonical product record produced by every source adapter.
///
/// Field names are the persisted wire format and must not be renamed.
/// `title`, `product_id` and `price` are mandatory on an accepted record,
/// but they stay representable as absent here so the validator can report
/// them instead of the adapter inventing a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub brand: Option<String>,
    pub description: Option<String>,
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<Model>,
    pub price: Option<f64>,
    #[serde(default)]
    pub prices: Vec<f64>,
    #[serde(default)]
    pub sale_prices: Vec<f64>,
    #[serde(default)]
    pub title: String,
    pub url: String,
    pub product_id: Option<String>,
}

/// A group of purchasable variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// Purchasable option combination (e.g. size/color) of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub image: Option<String>,
    pub price: Option<f64>,
    /// Option label (e.g. "Size") to option value (e.g. "Large").
    #[serde(flatten)]
    pub options: BTreeMap<String, String>,
}

impl ProductRecord {
    /// Start a record for `url` with the primary image; every other field empty.
    pub fn new(url: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            brand: None,
            description: None,
            image: image.into(),
            images: Vec::new(),
            models: Vec::new(),
            price: None,
            prices: Vec::new(),
            sale_prices: Vec::new(),
            title: String::new(),
            url: url.into(),
            product_id: None,
        }
    }

    /// All variants across every model, in order.
    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.models.iter().flat_map(|model| model.variants.iter())
    }
}

impl Variant {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: None,
            price: None,
            options: BTreeMap::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Pair option labels with the parts of a `"A / B / C"` title positionally.
    ///
    /// Only the overlapping prefix is used when the counts differ. Labels and
    /// values are trimmed; reserved keys and empty labels are ignored.
    pub fn with_options_from_title(mut self, public_title: &str, labels: &[String]) -> Self {
        for (label, part) in labels.iter().zip(public_title.split('/')) {
            let label = label.trim();
            if label.is_empty() || RESERVED_VARIANT_KEYS.contains(&label) {
                tracing::debug!("Ignoring option label '{}' on variant {}", label, self.id);
                continue;
            }
            self.options.insert(label.to_string(), part.trim().to_string());
        }
        self
    }
}
