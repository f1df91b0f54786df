use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;

/// Filesystem blob store for screenshot images. Records in the database
/// carry paths relative to this root.
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a screenshot under `{employee_code}/{timestamp}.{ext}`. The
    /// timestamp keeps millisecond precision with colons and dots replaced
    /// so the segment is path-safe; the extension comes from the uploaded
    /// filename, defaulting to `png`. The write is create-new: a second
    /// write to the same generated path is an error, never an overwrite.
    pub async fn store_screenshot(
        &self,
        employee_code: &str,
        bytes: &[u8],
        original_name: Option<&str>,
    ) -> Result<String> {
        let timestamp = Utc::now()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        let ext = original_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(char::is_alphanumeric))
            .unwrap_or("png");

        let relative = format!("{}/{}.{}", employee_code, timestamp, ext);
        let full = self.root.join(&relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating screenshot directory for {}", employee_code))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await
            .with_context(|| format!("writing screenshot blob {}", relative))?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(relative)
    }

    pub async fn read(&self, relative: &str) -> Result<Vec<u8>> {
        let full = self.root.join(relative);
        let bytes = tokio::fs::read(&full)
            .await
            .with_context(|| format!("reading screenshot blob {}", relative))?;
        Ok(bytes)
    }
}
