//! Message sources: where the batch gets its posts from.
//!
//! Every source returns posts newest first, the order a channel history is
//! read in. Failures here are fatal to the run.
use crate::db::{self, Pool};
use crate::model::{MediaRef, RawPost};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid export file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("post store error: {0}")]
    Store(#[source] anyhow::Error),
    #[error("channel {0:?} has no stored posts")]
    UnknownChannel(String),
}

#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Up to `limit` posts of `channel`, newest first.
    async fn fetch(&self, channel: &str, limit: u32) -> Result<Vec<RawPost>, SourceError>;
}

/// Reads posts collected by the ingest bot.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    pool: Pool,
}

impl SqliteSource {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageSource for SqliteSource {
    #[instrument(skip(self))]
    async fn fetch(&self, channel: &str, limit: u32) -> Result<Vec<RawPost>, SourceError> {
        let total = db::count_posts(&self.pool, channel)
            .await
            .map_err(SourceError::Store)?;
        if total == 0 {
            return Err(SourceError::UnknownChannel(channel.to_string()));
        }
        let rows = db::recent_posts(&self.pool, channel, limit)
            .await
            .map_err(SourceError::Store)?;
        info!(fetched = rows.len(), stored = total, "loaded posts from store");
        Ok(rows
            .into_iter()
            .map(|row| RawPost {
                id: row.message_id,
                text: row.text,
                media: row
                    .photo_file_id
                    .map(|file_id| MediaRef::TelegramFile { file_id }),
            })
            .collect())
    }
}

/// Reads a Telegram Desktop "Export chat history" JSON file (`result.json`).
/// Photo paths in the export are relative to the file's directory.
#[derive(Debug, Clone)]
pub struct ExportSource {
    path: PathBuf,
}

impl ExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Deserialize)]
struct Export {
    #[serde(default)]
    name: Option<String>,
    messages: Vec<ExportMessage>,
}

#[derive(Debug, Deserialize)]
struct ExportMessage {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: ExportText,
    #[serde(default)]
    photo: Option<String>,
}

/// Message text is either a plain string or a list of plain strings and
/// formatted entities.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportText {
    Plain(String),
    Rich(Vec<TextPart>),
}

impl Default for ExportText {
    fn default() -> Self {
        ExportText::Plain(String::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextPart {
    Plain(String),
    Entity { text: String },
}

impl ExportText {
    fn flatten(self) -> String {
        match self {
            ExportText::Plain(s) => s,
            ExportText::Rich(parts) => parts
                .into_iter()
                .map(|p| match p {
                    TextPart::Plain(s) => s,
                    TextPart::Entity { text } => text,
                })
                .collect(),
        }
    }
}

fn parse_export(raw: &str, base_dir: &Path, limit: u32) -> Result<Vec<RawPost>, SourceError> {
    let export: Export = serde_json::from_str(raw)?;
    let mut posts: Vec<RawPost> = export
        .messages
        .into_iter()
        .filter(|m| m.kind == "message")
        .map(|m| {
            let text = m.text.flatten();
            RawPost {
                id: m.id,
                text: (!text.trim().is_empty()).then_some(text),
                media: m
                    .photo
                    .filter(|p| !p.starts_with("(File not included"))
                    .map(|p| MediaRef::LocalFile {
                        path: base_dir.join(p),
                    }),
            }
        })
        .collect();
    // Exports are oldest first.
    posts.reverse();
    posts.truncate(limit as usize);
    info!(chat = export.name.as_deref().unwrap_or("?"), fetched = posts.len(), "loaded posts from export");
    Ok(posts)
}

#[async_trait]
impl MessageSource for ExportSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self, _channel: &str, limit: u32) -> Result<Vec<RawPost>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        let base_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        parse_export(&raw, base_dir, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "name": "StealthShop",
        "type": "public_channel",
        "id": 1,
        "messages": [
            {"id": 1, "type": "service", "action": "create_channel", "text": ""},
            {"id": 2, "type": "message", "text": "Nike Air Max\n120 USD", "photo": "photos/photo_2.jpg"},
            {"id": 3, "type": "message", "text": ["Supreme ", {"type": "bold", "text": "Box Logo"}, "\n250 USD"]},
            {"id": 4, "type": "message", "text": "", "photo": "(File not included. Change data exporting settings to download.)"},
            {"id": 5, "type": "message", "text": "Stone Island 300 EUR"}
        ]
    }"#;

    #[test]
    fn export_is_read_newest_first_and_limited() {
        let posts = parse_export(EXPORT, Path::new("/exports/shop"), 3).unwrap();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn rich_text_is_flattened() {
        let posts = parse_export(EXPORT, Path::new("."), 10).unwrap();
        let supreme = posts.iter().find(|p| p.id == 3).unwrap();
        assert_eq!(supreme.text.as_deref(), Some("Supreme Box Logo\n250 USD"));
    }

    #[test]
    fn photos_resolve_relative_to_export() {
        let posts = parse_export(EXPORT, Path::new("/exports/shop"), 10).unwrap();
        let nike = posts.iter().find(|p| p.id == 2).unwrap();
        assert_eq!(
            nike.media,
            Some(MediaRef::LocalFile {
                path: PathBuf::from("/exports/shop/photos/photo_2.jpg")
            })
        );
        let empty = posts.iter().find(|p| p.id == 4).unwrap();
        assert_eq!(empty.text, None);
        assert_eq!(empty.media, None);
    }

    #[test]
    fn broken_export_is_an_error() {
        assert!(matches!(
            parse_export("{\"messages\": 3}", Path::new("."), 10),
            Err(SourceError::Json(_))
        ));
    }
}
