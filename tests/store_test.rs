use chrono::{TimeZone, Utc};
use tg_storefront::db::{self, NewPost};
use tg_storefront::model::MediaRef;
use tg_storefront::source::{MessageSource, SourceError, SqliteSource};

async fn setup_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

fn new_post(message_id: i32, text: Option<&str>, photo: Option<&str>) -> NewPost {
    NewPost {
        chat_id: -1001,
        channel: Some("StealthShopEU".into()),
        message_id,
        text: text.map(str::to_string),
        photo_file_id: photo.map(str::to_string),
        posted_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
            + chrono::Duration::minutes(message_id as i64),
        edited_at: None,
    }
}

#[tokio::test]
async fn recent_posts_are_newest_first_and_limited() {
    let pool = setup_pool().await;
    for id in 1..=5 {
        db::upsert_post(&pool, &new_post(id, Some(&format!("post {id}")), None))
            .await
            .unwrap();
    }

    let rows = db::recent_posts(&pool, "@stealthshopeu", 3).await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.message_id).collect();
    assert_eq!(ids, vec![5, 4, 3]);
    assert_eq!(db::count_posts(&pool, "StealthShopEU").await.unwrap(), 5);
}

#[tokio::test]
async fn edited_post_replaces_text_and_keeps_photo() {
    let pool = setup_pool().await;
    let first = db::upsert_post(&pool, &new_post(7, Some("Nike Dunk 150 USD"), Some("file-a")))
        .await
        .unwrap();

    let mut edited = new_post(7, Some("Nike Dunk 150 USD\nSOLD"), None);
    edited.edited_at = Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap());
    let second = db::upsert_post(&pool, &edited).await.unwrap();
    assert_eq!(first, second);

    let rows = db::recent_posts(&pool, "stealthshopeu", 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text.as_deref(), Some("Nike Dunk 150 USD\nSOLD"));
    assert_eq!(rows[0].photo_file_id.as_deref(), Some("file-a"));
}

#[tokio::test]
async fn sqlite_source_maps_rows_to_posts() {
    let pool = setup_pool().await;
    db::upsert_post(&pool, &new_post(1, Some("Adidas Samba 100 USD"), Some("file-1")))
        .await
        .unwrap();
    db::upsert_post(&pool, &new_post(2, None, Some("file-2")))
        .await
        .unwrap();

    let source = SqliteSource::new(pool);
    let posts = source.fetch("StealthShopEU", 50).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, 2);
    assert_eq!(posts[0].text, None);
    assert_eq!(posts[1].text.as_deref(), Some("Adidas Samba 100 USD"));
    assert_eq!(
        posts[1].media,
        Some(MediaRef::TelegramFile {
            file_id: "file-1".into()
        })
    );
}

#[tokio::test]
async fn chat_id_and_username_land_in_their_columns() {
    let pool = setup_pool().await;
    db::upsert_post(&pool, &new_post(1, Some("Nike Dunk 150 USD"), None))
        .await
        .unwrap();

    let (chat_id, channel): (i64, Option<String>) =
        sqlx::query_as("SELECT chat_id, channel FROM posts")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(chat_id, -1001);
    assert_eq!(channel.as_deref(), Some("stealthshopeu"));
}

#[tokio::test]
async fn channel_without_username_is_read_by_chat_id() {
    let pool = setup_pool().await;
    let mut private = new_post(3, Some("Adidas Samba 100 USD"), None);
    private.channel = None;
    db::upsert_post(&pool, &private).await.unwrap();

    assert_eq!(db::count_posts(&pool, "-1001").await.unwrap(), 1);
    let posts = SqliteSource::new(pool).fetch("-1001", 10).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, 3);
}

#[tokio::test]
async fn unknown_channel_is_fatal() {
    let pool = setup_pool().await;
    let source = SqliteSource::new(pool);
    let err = source.fetch("nobody", 50).await.unwrap_err();
    assert!(matches!(err, SourceError::UnknownChannel(_)));
}
