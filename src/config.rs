//! Configuration loader and validator for the channel parser and ingest bot.
use crate::catalog::CatalogConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub telegram: Telegram,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub imgbb: Imgbb,
    /// Replaces the built-in brand list and vocabularies when present.
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
    pub output_file: String,
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout_seconds: u64,
    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,
}

fn default_batch_timeout() -> u64 {
    300
}

fn default_upload_concurrency() -> usize {
    4
}

/// Telegram bot and channel settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Telegram {
    #[serde(default)]
    pub bot_token: String,
    /// Channel username, or the numeric chat id for a channel without one.
    pub channel: String,
    #[serde(default = "default_posts_limit")]
    pub posts_limit: u32,
    /// Chat that receives the post-run summary; no summary when unset.
    #[serde(default)]
    pub notify_chat_id: Option<String>,
}

fn default_posts_limit() -> u32 {
    50
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Posts stored by the ingest bot.
    #[default]
    Sqlite,
    /// Telegram Desktop JSON export.
    Export,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Source {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default)]
    pub export_path: Option<String>,
}

/// Image hosting; an empty key means every product gets a placeholder image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Imgbb {
    #[serde(default)]
    pub api_key: String,
}

impl App {
    /// `data_dir` with a leading `~/` expanded.
    pub fn resolved_data_dir(&self) -> String {
        expand_home(&self.data_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.output_file))
    }
}

fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path.to_string(),
    }
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(self.app.resolved_data_dir())
    }

    /// Default SQLite URL inside the data directory.
    pub fn database_url(&self) -> String {
        format!("sqlite://{}/storefront.db", self.app.resolved_data_dir())
    }

    /// Apply `TELEGRAM_BOT_TOKEN`, `CHANNEL_USERNAME` and `POSTS_LIMIT` from the
    /// environment on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(token) = get("TELEGRAM_BOT_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(channel) = get("CHANNEL_USERNAME").filter(|v| !v.trim().is_empty()) {
            self.telegram.channel = channel;
        }
        if let Some(limit) = get("POSTS_LIMIT").and_then(|v| v.trim().parse().ok()) {
            self.telegram.posts_limit = limit;
        }
    }
}

/// Load configuration from a YAML file, apply env overrides and validate.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let mut cfg: Config = serde_yaml::from_str(&content)?;
    cfg.apply_env_overrides();
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.app.output_file.trim().is_empty() {
        return Err(ConfigError::Invalid("app.output_file must be non-empty"));
    }
    if cfg.app.batch_timeout_seconds == 0 {
        return Err(ConfigError::Invalid("app.batch_timeout_seconds must be > 0"));
    }
    if cfg.app.upload_concurrency == 0 {
        return Err(ConfigError::Invalid("app.upload_concurrency must be > 0"));
    }

    if cfg.telegram.channel.trim().trim_start_matches('@').is_empty() {
        return Err(ConfigError::Invalid("telegram.channel must be non-empty"));
    }
    if cfg.telegram.posts_limit == 0 {
        return Err(ConfigError::Invalid("telegram.posts_limit must be > 0"));
    }
    if cfg.telegram.notify_chat_id.is_some() && cfg.telegram.bot_token.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "telegram.bot_token is required when telegram.notify_chat_id is set",
        ));
    }

    if cfg.source.kind == SourceKind::Export
        && cfg
            .source
            .export_path
            .as_deref()
            .map_or(true, |p| p.trim().is_empty())
    {
        return Err(ConfigError::Invalid(
            "source.export_path is required when source.kind is export",
        ));
    }

    if let Some(catalog) = &cfg.catalog {
        if catalog.brands.iter().any(|b| b.name.trim().is_empty()) {
            return Err(ConfigError::Invalid("catalog.brands[].name must be non-empty"));
        }
    }

    Ok(())
}

/// Returns the example YAML content.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"
  output_file: "./public/products.js"
  batch_timeout_seconds: 300
  upload_concurrency: 4

telegram:
  bot_token: "YOUR_TELEGRAM_BOT_TOKEN"
  channel: "StealthShopEU"
  posts_limit: 50
  notify_chat_id: "123456789"

source:
  kind: sqlite

imgbb:
  api_key: ""
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn example_cfg() -> Config {
        serde_yaml::from_str(example()).unwrap()
    }

    #[test]
    fn parse_example_ok() {
        let cfg = example_cfg();
        validate(&cfg).unwrap();
        assert_eq!(cfg.source.kind, SourceKind::Sqlite);
        assert!(cfg.catalog.is_none());
    }

    #[test]
    fn defaults_fill_optional_sections() {
        let cfg: Config = serde_yaml::from_str(
            "app:\n  data_dir: d\n  output_file: o.json\ntelegram:\n  channel: shop\n",
        )
        .unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.app.batch_timeout_seconds, 300);
        assert_eq!(cfg.app.upload_concurrency, 4);
        assert_eq!(cfg.telegram.posts_limit, 50);
        assert_eq!(cfg.imgbb.api_key, "");
        assert_eq!(cfg.source, Source::default());
    }

    #[test]
    fn invalid_channel() {
        let mut cfg = example_cfg();
        cfg.telegram.channel = "@".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("telegram.channel")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn notify_requires_token() {
        let mut cfg = example_cfg();
        cfg.telegram.bot_token = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(msg)) if msg.contains("bot_token")));
        cfg.telegram.notify_chat_id = None;
        validate(&cfg).unwrap();
    }

    #[test]
    fn export_source_requires_path() {
        let mut cfg = example_cfg();
        cfg.source.kind = SourceKind::Export;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
        cfg.source.export_path = Some("export/result.json".into());
        validate(&cfg).unwrap();
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut cfg = example_cfg();
        cfg.telegram.posts_limit = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg = example_cfg();
        cfg.app.upload_concurrency = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg = example_cfg();
        cfg.app.batch_timeout_seconds = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn catalog_override_is_parsed_in_order() {
        let yaml = format!(
            "{}\ncatalog:\n  brands:\n    - name: Maison Margiela\n      aliases: [MM6]\n    - name: Nike\n  sold_keywords: [sold]\n  categories:\n    shoes: [sneakers]\n    accessories: [bag]\n    clothing: [coat]\n",
            example()
        );
        let cfg: Config = serde_yaml::from_str(&yaml).unwrap();
        validate(&cfg).unwrap();
        let catalog = cfg.catalog.unwrap();
        assert_eq!(catalog.brands[0].name, "Maison Margiela");
        assert_eq!(catalog.brands[0].aliases, vec!["MM6"]);
        assert_eq!(catalog.brands[1].name, "Nike");
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = example_cfg();
        let env: HashMap<&str, &str> = [
            ("TELEGRAM_BOT_TOKEN", "42:token"),
            ("CHANNEL_USERNAME", "OtherShop"),
            ("POSTS_LIMIT", "200"),
        ]
        .into_iter()
        .collect();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.telegram.bot_token, "42:token");
        assert_eq!(cfg.telegram.channel, "OtherShop");
        assert_eq!(cfg.telegram.posts_limit, 200);

        cfg.apply_overrides(|k| (k == "POSTS_LIMIT").then(|| "many".to_string()));
        assert_eq!(cfg.telegram.posts_limit, 200);
    }

    #[test]
    fn ensure_dirs_creates_data_dir() {
        let td = tempdir().unwrap();
        let data_path = td.path().join("data");
        let mut cfg = example_cfg();
        cfg.app.data_dir = data_path.to_string_lossy().to_string();
        cfg.ensure_dirs().unwrap();
        assert!(data_path.exists());
        assert_eq!(
            cfg.database_url(),
            format!("sqlite://{}/storefront.db", data_path.display())
        );
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.app.output_path(), PathBuf::from("./public/products.js"));
    }
}
