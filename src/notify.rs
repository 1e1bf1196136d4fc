use crate::model::BatchSummary;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode, Recipient};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel: &str, summary: &BatchSummary) -> Result<()>;
}

/// Posts the batch summary to a chat through the bot.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
}

impl TelegramNotifier {
    /// `chat` is a numeric chat id or an `@username`.
    pub fn new(bot: Bot, chat: &str) -> Self {
        let chat = match chat.trim().parse::<i64>() {
            Ok(id) => Recipient::Id(ChatId(id)),
            Err(_) => Recipient::ChannelUsername(format!("@{}", chat.trim().trim_start_matches('@'))),
        };
        Self { bot, chat }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, channel: &str, summary: &BatchSummary) -> Result<()> {
        self.bot
            .send_message(self.chat.clone(), summary_message(channel, summary, Utc::now()))
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

pub fn summary_message(channel: &str, summary: &BatchSummary, at: DateTime<Utc>) -> String {
    format!(
        "🔄 <b>Catalog updated!</b>\n\n\
         ✅ In stock: {}\n\
         ⏭️ Sold, skipped: {}\n\n\
         ⏰ {}\n\
         📡 Channel: @{}",
        summary.kept,
        summary.skipped_sold,
        at.format("%Y-%m-%d %H:%M UTC"),
        escape_html(channel.trim_start_matches('@')),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
