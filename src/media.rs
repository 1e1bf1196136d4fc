//! Image hosting for product photos.
use crate::model::MediaRef;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client, Url};
use serde::Deserialize;
use std::fmt;
use teloxide::net::Download;
use teloxide::prelude::*;
use tracing::debug;

const IMGBB_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";
const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/500x500/000000/FFFFFF";

/// Image URL used when a post has no photo or its upload failed.
pub fn placeholder_url(brand: &str) -> String {
    match Url::parse_with_params(PLACEHOLDER_BASE, [("text", brand)]) {
        Ok(url) => url.to_string(),
        Err(_) => PLACEHOLDER_BASE.to_string(),
    }
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload the referenced photo and return its public URL.
    async fn upload(&self, media: &MediaRef) -> Result<String>;

    /// False when no image host is configured and every post gets a
    /// placeholder without trying an upload.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Uploader used when no image host is configured; every post gets a
/// placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderOnly;

#[async_trait]
impl MediaUploader for PlaceholderOnly {
    async fn upload(&self, _media: &MediaRef) -> Result<String> {
        bail!("no image host configured")
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Fetches photos (from the Bot API or from disk) and re-hosts them on ImgBB.
#[derive(Clone)]
pub struct ImgbbUploader {
    http: Client,
    endpoint: Url,
    api_key: String,
    bot: Option<Bot>,
}

impl fmt::Debug for ImgbbUploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImgbbUploader")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

impl ImgbbUploader {
    pub fn new(api_key: String, bot: Option<Bot>) -> Result<Self> {
        let endpoint = Url::parse(IMGBB_UPLOAD_URL).context("invalid ImgBB URL")?;
        Self::with_endpoint(api_key, bot, endpoint)
    }

    pub fn with_endpoint(api_key: String, bot: Option<Bot>, endpoint: Url) -> Result<Self> {
        let http = Client::builder()
            .user_agent("tg-storefront/0.1")
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint,
            api_key,
            bot,
        })
    }

    async fn fetch_bytes(&self, media: &MediaRef) -> Result<(Vec<u8>, String)> {
        match media {
            MediaRef::TelegramFile { file_id } => {
                let bot = self
                    .bot
                    .as_ref()
                    .ok_or_else(|| anyhow!("telegram photo but no bot token configured"))?;
                let file = bot
                    .get_file(file_id.clone())
                    .await
                    .with_context(|| format!("getFile failed for {file_id}"))?;
                let mut buf = Vec::with_capacity(file.meta.size as usize);
                bot.download_file(&file.path, &mut buf)
                    .await
                    .with_context(|| format!("download failed for {}", file.path))?;
                Ok((buf, file_name_of(&file.path)))
            }
            MediaRef::LocalFile { path } => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok((bytes, file_name_of(&path.to_string_lossy())))
            }
        }
    }
}

fn file_name_of(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("photo.jpg")
        .to_string()
}

#[async_trait]
impl MediaUploader for ImgbbUploader {
    async fn upload(&self, media: &MediaRef) -> Result<String> {
        let (bytes, file_name) = self.fetch_bytes(media).await?;
        debug!(file_name = %file_name, size = bytes.len(), "uploading photo");
        let form = multipart::Form::new()
            .part("image", multipart::Part::bytes(bytes).file_name(file_name));
        let res = self
            .http
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await
            .context("failed to reach ImgBB")?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("imgbb error {}: {}", status, body));
        }
        let payload: UploadResponse = res.json().await.context("invalid ImgBB response")?;
        Ok(payload.data.url)
    }
}
