//! Storing channel posts delivered to the ingest bot.
use crate::db::{self, NewPost, Pool};
use anyhow::Result;
use teloxide::types::Message;
use tracing::{debug, info, instrument, warn};

/// Convert a channel post into a storable row. Posts with neither text nor a
/// photo (stickers, polls, service messages) are ignored.
pub fn post_from_message(msg: &Message) -> Option<NewPost> {
    let text = msg.text().or_else(|| msg.caption()).map(str::to_owned);
    // Telegram lists photo sizes smallest first.
    let photo_file_id = msg
        .photo()
        .and_then(|sizes| sizes.last())
        .map(|size| size.file.id.clone());
    if text.is_none() && photo_file_id.is_none() {
        return None;
    }
    Some(NewPost {
        chat_id: msg.chat.id.0,
        channel: msg.chat.username().map(str::to_owned),
        message_id: msg.id.0,
        text,
        photo_file_id,
        posted_at: msg.date,
        edited_at: msg.edit_date().copied(),
    })
}

#[instrument(skip_all, fields(chat_id = msg.chat.id.0, message_id = msg.id.0))]
pub async fn handle_channel_post(pool: &Pool, msg: &Message) -> Result<()> {
    let Some(post) = post_from_message(msg) else {
        debug!("ignoring post without text or photo");
        return Ok(());
    };
    if post.channel.is_none() {
        warn!(
            chat_id = post.chat_id,
            "channel has no username; set telegram.channel to the chat id to parse it"
        );
    }
    let row_id = db::upsert_post(pool, &post).await?;
    info!(
        row_id,
        channel = post.channel.as_deref().unwrap_or("-"),
        edited = post.edited_at.is_some(),
        "stored channel post"
    );
    Ok(())
}
