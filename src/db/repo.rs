use super::model::{NewPost, StoredPost};
use anyhow::Result;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // The ingest bot and the parser may run at the same time.
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout=5000;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/`, ensure the parent
/// directory exists and ask SQLite to create the file. In-memory URLs pass
/// through untouched.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    match query_part {
        Some(q) if q.contains("mode=") => {
            rebuilt.push('?');
            rebuilt.push_str(q);
        }
        Some(q) => {
            rebuilt.push('?');
            rebuilt.push_str(q);
            rebuilt.push_str("&mode=rwc");
        }
        None => rebuilt.push_str("?mode=rwc"),
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Normalize a channel reference (`@Name`, `Name`, `https://t.me/Name`) to the
/// lowercase username used as the lookup key.
pub fn normalize_channel(channel: &str) -> String {
    let trimmed = channel.trim();
    let without_link = trimmed
        .strip_prefix("https://t.me/")
        .or_else(|| trimmed.strip_prefix("http://t.me/"))
        .or_else(|| trimmed.strip_prefix("t.me/"))
        .unwrap_or(trimmed);
    without_link
        .trim_start_matches('@')
        .trim_end_matches('/')
        .to_lowercase()
}

/// Insert a post, or update text/photo/edit time when the same message was
/// stored before (edited channel posts arrive with the same message id).
#[instrument(skip_all, fields(chat_id = post.chat_id, message_id = post.message_id))]
pub async fn upsert_post(pool: &Pool, post: &NewPost) -> Result<i64> {
    let channel = post.channel.as_deref().map(normalize_channel);
    let rec = sqlx::query(
        "INSERT INTO posts (chat_id, channel, message_id, text, photo_file_id, posted_at, edited_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (chat_id, message_id) DO UPDATE SET
            channel = COALESCE(excluded.channel, posts.channel),
            text = excluded.text,
            photo_file_id = COALESCE(excluded.photo_file_id, posts.photo_file_id),
            edited_at = excluded.edited_at
         RETURNING id",
    )
    .bind(post.chat_id)
    .bind(channel)
    .bind(post.message_id)
    .bind(post.text.as_deref())
    .bind(post.photo_file_id.as_deref())
    .bind(post.posted_at)
    .bind(post.edited_at)
    .fetch_one(pool)
    .await?;
    Ok(rec.get::<i64, _>("id"))
}

/// Newest `limit` posts of `channel`, newest first. `channel` is a username
/// or, for channels without one, the numeric chat id (`-100...`).
#[instrument(skip(pool))]
pub async fn recent_posts(pool: &Pool, channel: &str, limit: u32) -> Result<Vec<StoredPost>> {
    let key = normalize_channel(channel);
    let rows = sqlx::query_as::<_, StoredPost>(
        "SELECT message_id, text, photo_file_id FROM posts
         WHERE channel = ? OR CAST(chat_id AS TEXT) = ?
         ORDER BY message_id DESC
         LIMIT ?",
    )
    .bind(&key)
    .bind(&key)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_posts(pool: &Pool, channel: &str) -> Result<i64> {
    let key = normalize_channel(channel);
    let n = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM posts WHERE channel = ? OR CAST(chat_id AS TEXT) = ?",
    )
    .bind(&key)
    .bind(&key)
    .fetch_one(pool)
    .await?;
    Ok(n)
}
