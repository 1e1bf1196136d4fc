//! Writes the product list consumed by the storefront.
use crate::model::ProductRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Output flavour, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain JSON array.
    Json,
    /// `const products = [...]` script that also works as a CommonJS module.
    Script,
}

impl OutputFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Script,
        }
    }
}

pub fn render(
    format: OutputFormat,
    channel: &str,
    products: &[ProductRecord],
    now: DateTime<Utc>,
) -> Result<String> {
    let json = serde_json::to_string_pretty(products).context("failed to serialize products")?;
    Ok(match format {
        OutputFormat::Json => format!("{json}\n"),
        OutputFormat::Script => format!(
            "// Products from Telegram channel @{channel}\n\
             // Updated automatically: {updated}\n\
             \n\
             const products = {json};\n\
             \n\
             if (typeof module !== 'undefined' && module.exports) {{\n    module.exports = products;\n}}\n",
            channel = channel.trim_start_matches('@'),
            updated = now.format("%Y-%m-%d %H:%M:%S UTC"),
        ),
    })
}

/// Replace `path` with the rendered product list. The content goes to a
/// sibling temp file first and is renamed over the target, so readers never
/// see a partial file.
#[instrument(skip(products), fields(count = products.len()))]
pub async fn write_products(path: &Path, channel: &str, products: &[ProductRecord]) -> Result<()> {
    let content = render(OutputFormat::for_path(path), channel, products, Utc::now())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    // The replacement runs to completion on the blocking pool even if this
    // future is dropped, so the target is either the old or the new file.
    let tmp = temp_path(path);
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || replace_file(&tmp, &target, content.as_bytes()))
        .await
        .context("products writer task failed")??;
    info!(path = %path.display(), "products file written");
    Ok(())
}

fn replace_file(tmp: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let guard = TempFile(tmp.to_path_buf());
    std::fs::write(tmp, content).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(tmp, target)
        .with_context(|| format!("failed to replace {}", target.display()))?;
    guard.keep();
    Ok(())
}

/// Removes the temp file on drop unless `keep` was called after the rename.
struct TempFile(PathBuf);

impl TempFile {
    fn keep(self) {
        std::mem::forget(self);
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "products".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()))
}
