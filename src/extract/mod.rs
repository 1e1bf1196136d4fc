//! Text pipeline turning one post into a product listing.
//!
//! Steps run in a fixed order: sold check, prices, sizes, brand and name,
//! category, description. A sold post or a post without any price stops the
//! pipeline early.
mod brand;
mod category;
mod price;
mod size;
mod sold;

pub use brand::classify_brand;
pub use category::classify_category;
pub use price::{extract_prices, primary_price};
pub use size::{extract_sizes, MAX_RANGE_LEN};
pub use sold::sold_keyword;

use crate::catalog::Catalog;
use crate::model::{Currency, Extraction, Listing, ProductRecord, DEFAULT_DESCRIPTION, DEFAULT_NAME};
use tracing::debug;

/// Number of leading non-empty lines used for the description.
pub const DESCRIPTION_LINES: usize = 3;
/// Description length cap, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// Run the text pipeline on one post body.
pub fn extract_listing(catalog: &Catalog, text: &str) -> Extraction {
    let lower = text.to_lowercase();
    if let Some(keyword) = sold_keyword(catalog, &lower) {
        debug!(keyword, text = %preview(text), "skipping sold post");
        return Extraction::Sold;
    }

    let prices = extract_prices(text);
    let Some((primary_currency, primary_price)) = primary_price(&prices, &Currency::CHECK_ORDER)
    else {
        return Extraction::NotAProduct;
    };

    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let title = lines.first().copied().unwrap_or(DEFAULT_NAME);
    let (brand, name) = classify_brand(catalog, title, text);

    Extraction::Product(Listing {
        name,
        brand,
        category: classify_category(catalog, &lower),
        prices,
        primary_currency,
        primary_price,
        sizes: extract_sizes(text),
        description: describe(&lines),
    })
}

/// Single-post convenience: extract and assemble a record in one step.
pub fn extract_product(
    catalog: &Catalog,
    text: &str,
    id: u32,
    image_url: impl FnOnce(&Listing) -> String,
) -> Result<ProductRecord, Extraction> {
    match extract_listing(catalog, text) {
        Extraction::Product(listing) => {
            let image = image_url(&listing);
            Ok(ProductRecord::assemble(id, listing, image))
        }
        other => Err(other),
    }
}

fn describe(lines: &[&str]) -> String {
    let joined = lines
        .iter()
        .take(DESCRIPTION_LINES)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let description: String = joined.chars().take(DESCRIPTION_MAX_CHARS).collect();
    let description = description.trim_end().to_string();
    if description.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        description
    }
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
