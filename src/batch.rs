//! One pass over a channel's posts, producing the ordered product list.
use crate::catalog::Catalog;
use crate::extract::extract_listing;
use crate::media::{placeholder_url, MediaUploader};
use crate::model::{BatchSummary, Extraction, Listing, MediaRef, ProductRecord, RawPost};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub products: Vec<ProductRecord>,
    pub skipped_sold: usize,
    /// Posts with text but no recognizable price. Logged, never reported.
    pub not_products: usize,
}

impl BatchOutcome {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            kept: self.products.len(),
            skipped_sold: self.skipped_sold,
        }
    }
}

/// Classify every post, then resolve images for the kept ones with at most
/// `upload_concurrency` uploads in flight. Records are numbered from 1 in post
/// order regardless of which upload finishes first.
#[instrument(skip_all, fields(posts = posts.len()))]
pub async fn run_batch(
    catalog: &Catalog,
    uploader: &dyn MediaUploader,
    posts: Vec<RawPost>,
    upload_concurrency: usize,
) -> BatchOutcome {
    let mut kept: Vec<(i64, Listing, Option<MediaRef>)> = Vec::new();
    let mut skipped_sold = 0;
    let mut not_products = 0;

    for post in posts {
        let Some(text) = post.text.as_deref() else {
            continue;
        };
        match extract_listing(catalog, text) {
            Extraction::Sold => skipped_sold += 1,
            Extraction::NotAProduct => {
                not_products += 1;
                debug!(post_id = post.id, "no price found; not a product");
            }
            Extraction::Product(listing) => kept.push((post.id, listing, post.media)),
        }
    }

    let products: Vec<ProductRecord> = stream::iter(kept)
        .map(|(post_id, listing, media)| async move {
            let image = resolve_image(uploader, post_id, &listing.brand, media.as_ref()).await;
            (listing, image)
        })
        .buffered(upload_concurrency.max(1))
        .enumerate()
        .map(|(idx, (listing, image))| {
            let record = ProductRecord::assemble(idx as u32 + 1, listing, image);
            info!(
                id = record.id,
                brand = %record.brand,
                name = %record.name,
                price = record.primary_price,
                currency = record.primary_currency.as_str(),
                "product"
            );
            record
        })
        .collect()
        .await;

    info!(kept = products.len(), skipped_sold, not_products, "batch complete");
    BatchOutcome {
        products,
        skipped_sold,
        not_products,
    }
}

async fn resolve_image(
    uploader: &dyn MediaUploader,
    post_id: i64,
    brand: &str,
    media: Option<&MediaRef>,
) -> String {
    let Some(media) = media.filter(|_| uploader.is_enabled()) else {
        return placeholder_url(brand);
    };
    match uploader.upload(media).await {
        Ok(url) => url,
        Err(err) => {
            warn!(?err, post_id, "image upload failed; using placeholder");
            placeholder_url(brand)
        }
    }
}
