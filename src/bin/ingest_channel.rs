use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use teloxide::prelude::*;
use tracing::{error, info};

use tg_storefront::config;
use tg_storefront::db::{self, Pool};
use tg_storefront::ingest;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Store posts of the channels this bot administers in the SQLite post store"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
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
    if cfg.telegram.bot_token.trim().is_empty() {
        bail!("telegram.bot_token is required for the ingest bot");
    }

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.database_url());
    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let bot = Bot::new(cfg.telegram.bot_token.clone());

    let handler = dptree::entry()
        .branch(Update::filter_channel_post().endpoint(on_post))
        .branch(Update::filter_edited_channel_post().endpoint(on_post));

    info!(database_url = %database_url, "starting channel ingest bot");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![pool])
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn on_post(msg: Message, pool: Pool) -> ResponseResult<()> {
    if let Err(err) = ingest::handle_channel_post(&pool, &msg).await {
        error!(?err, "failed to store channel post");
    }
    Ok(())
}
