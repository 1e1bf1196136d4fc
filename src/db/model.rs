//! Row types read and written by the post repository.

use chrono::{DateTime, Utc};

/// A channel post as received by the ingest bot.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub chat_id: i64,
    /// Channel username, lowercased and without the leading `@`.
    pub channel: Option<String>,
    pub message_id: i32,
    pub text: Option<String>,
    pub photo_file_id: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

/// Stored post slice used by the batch extractor.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredPost {
    pub message_id: i64,
    pub text: Option<String>,
    pub photo_file_id: Option<String>,
}
