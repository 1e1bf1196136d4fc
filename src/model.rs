use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Brand used when no catalog entry matches.
pub const UNKNOWN_BRAND: &str = "Brand";
/// Name used when the title line is empty after the brand is removed.
pub const DEFAULT_NAME: &str = "Product";
/// Size used when a post has no size label.
pub const ONE_SIZE: &str = "One Size";
pub const DEFAULT_DESCRIPTION: &str = "Premium quality";

/// Currencies in the fixed order their detectors run. The derived `Ord`
/// follows declaration order, so a `BTreeMap<Currency, _>` iterates in check
/// order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Rub,
    Byn,
}

impl Currency {
    pub const CHECK_ORDER: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Rub, Currency::Byn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Rub => "RUB",
            Currency::Byn => "BYN",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Shoes,
    Accessories,
    Clothing,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Shoes => "shoes",
            Category::Accessories => "accessories",
            Category::Clothing => "clothing",
        }
    }
}

pub type Prices = BTreeMap<Currency, u64>;

/// Where a post's attached photo can be fetched from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaRef {
    /// Telegram Bot API file id, as stored by the ingest bot.
    TelegramFile { file_id: String },
    /// Photo file on disk, as found in a desktop export.
    LocalFile { path: PathBuf },
}

/// One channel post as returned by a message source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub id: i64,
    pub text: Option<String>,
    pub media: Option<MediaRef>,
}

/// Everything derived from a post's text, before an id and image are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    pub brand: String,
    pub category: Category,
    pub prices: Prices,
    pub primary_currency: Currency,
    pub primary_price: u64,
    pub sizes: Vec<String>,
    pub description: String,
}

/// Outcome of running the text pipeline on a single post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Sold,
    NotAProduct,
    Product(Listing),
}

/// A product as written to the storefront data file. Field names follow what
/// the storefront reads (`price`, `currency`, `image`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: u32,
    pub name: String,
    pub brand: String,
    pub category: Category,
    #[serde(rename = "price")]
    pub primary_price: u64,
    #[serde(rename = "currency")]
    pub primary_currency: Currency,
    pub prices: Prices,
    #[serde(rename = "image")]
    pub image_url: String,
    pub description: String,
    pub sizes: Vec<String>,
}

impl ProductRecord {
    pub fn assemble(id: u32, listing: Listing, image_url: String) -> Self {
        Self {
            id,
            name: listing.name,
            brand: listing.brand,
            category: listing.category,
            primary_price: listing.primary_price,
            primary_currency: listing.primary_currency,
            prices: listing.prices,
            image_url,
            description: listing.description,
            sizes: listing.sizes,
        }
    }
}

/// Counts reported after a batch run. Posts rejected as not-a-product are
/// intentionally absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub kept: usize,
    pub skipped_sold: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_storefront_field_names() {
        let mut prices = Prices::new();
        prices.insert(Currency::Eur, 110);
        prices.insert(Currency::Usd, 120);
        let listing = Listing {
            name: "Air Max".into(),
            brand: "Nike".into(),
            category: Category::Shoes,
            prices,
            primary_currency: Currency::Usd,
            primary_price: 120,
            sizes: vec!["42".into()],
            description: "Nike Air Max".into(),
        };
        let record = ProductRecord::assemble(1, listing, "https://i.ibb.co/x.jpg".into());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["price"], 120);
        assert_eq!(value["currency"], "USD");
        assert_eq!(value["category"], "shoes");
        assert_eq!(value["image"], "https://i.ibb.co/x.jpg");
        assert_eq!(value["prices"]["EUR"], 110);
        let keys: Vec<&String> = value["prices"].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn currency_order_is_check_order() {
        let mut sorted = Currency::CHECK_ORDER.to_vec();
        sorted.sort();
        assert_eq!(sorted, Currency::CHECK_ORDER.to_vec());
    }
}
