use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use teloxide::prelude::*;
use tracing::{error, info, warn};

use tg_storefront::batch::run_batch;
use tg_storefront::catalog::{Catalog, CatalogConfig};
use tg_storefront::config::{self, Config, SourceKind};
use tg_storefront::db;
use tg_storefront::media::{ImgbbUploader, MediaUploader, PlaceholderOnly};
use tg_storefront::notify::{Notifier, TelegramNotifier};
use tg_storefront::sink;
use tg_storefront::source::{ExportSource, MessageSource, SqliteSource};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Parse the channel's recent posts into the storefront products file"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the products as JSON instead of writing the file and notifying.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let timeout = Duration::from_secs(cfg.app.batch_timeout_seconds);
    match tokio::time::timeout(timeout, run(&cfg, args.dry_run)).await {
        Ok(result) => result,
        Err(_) => {
            error!(seconds = cfg.app.batch_timeout_seconds, "parse run timed out; nothing written");
            anyhow::bail!("parse run timed out")
        }
    }
}

async fn run(cfg: &Config, dry_run: bool) -> Result<()> {
    let catalog = Catalog::compile(cfg.catalog.as_ref().unwrap_or(&CatalogConfig::default()))
        .context("invalid catalog")?;

    let bot = (!cfg.telegram.bot_token.trim().is_empty())
        .then(|| Bot::new(cfg.telegram.bot_token.clone()));

    let source: Box<dyn MessageSource> = match cfg.source.kind {
        SourceKind::Sqlite => {
            let database_url =
                std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.database_url());
            let pool = db::init_pool(&database_url).await?;
            db::run_migrations(&pool).await?;
            Box::new(SqliteSource::new(pool))
        }
        SourceKind::Export => {
            let path = cfg.source.export_path.clone().unwrap_or_default();
            Box::new(ExportSource::new(path))
        }
    };

    let uploader: Box<dyn MediaUploader> = if cfg.imgbb.api_key.trim().is_empty() {
        info!("no image host configured; products get placeholder images");
        Box::new(PlaceholderOnly)
    } else {
        Box::new(ImgbbUploader::new(cfg.imgbb.api_key.clone(), bot.clone())?)
    };

    let channel = cfg.telegram.channel.as_str();
    info!(channel, limit = cfg.telegram.posts_limit, "parsing channel");
    let posts = source.fetch(channel, cfg.telegram.posts_limit).await?;
    info!(posts = posts.len(), "fetched posts");

    let outcome = run_batch(&catalog, uploader.as_ref(), posts, cfg.app.upload_concurrency).await;
    let summary = outcome.summary();

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&outcome.products)?);
        return Ok(());
    }

    sink::write_products(&cfg.app.output_path(), channel, &outcome.products).await?;
    info!(kept = summary.kept, skipped_sold = summary.skipped_sold, "products saved");

    if let (Some(bot), Some(chat)) = (bot, cfg.telegram.notify_chat_id.as_deref()) {
        let notifier = TelegramNotifier::new(bot, chat);
        if let Err(err) = notifier.notify(channel, &summary).await {
            warn!(?err, "failed to send update notification");
        }
    }

    Ok(())
}
