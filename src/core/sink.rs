use std::path::{Path, PathBuf};

use async_trait::async_trait;
use vidlingo_core::core::events::QueueItemInfo;

use crate::models::media::DownloadOutcome;

/// Receives each successful outcome. The returned location, if any, is
/// recorded on the completed item. An error fails the item.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn deliver(
        &self,
        item: &QueueItemInfo,
        outcome: DownloadOutcome,
    ) -> anyhow::Result<Option<String>>;
}

/// Saves payloads under `output_dir` and optionally opens redirect
/// locations with the system handler.
pub struct LocalResultSink {
    output_dir: PathBuf,
    open_redirects: bool,
}

impl LocalResultSink {
    pub fn new(output_dir: impl Into<PathBuf>, open_redirects: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            open_redirects,
        }
    }
}

#[async_trait]
impl ResultSink for LocalResultSink {
    async fn deliver(
        &self,
        item: &QueueItemInfo,
        outcome: DownloadOutcome,
    ) -> anyhow::Result<Option<String>> {
        match outcome {
            DownloadOutcome::Redirect(location) => {
                if self.open_redirects {
                    if let Err(e) = open::that_detached(&location) {
                        tracing::warn!("Could not open '{}' for item {}: {}", location, item.id, e);
                    }
                }
                Ok(Some(location))
            }
            DownloadOutcome::Payload {
                bytes,
                suggested_filename,
            } => {
                tokio::fs::create_dir_all(&self.output_dir).await?;
                let path = free_path(&self.output_dir, &suggested_filename).await;
                tokio::fs::write(&path, &bytes).await?;
                tracing::info!(
                    "Saved '{}' ({} bytes) to {}",
                    item.title,
                    bytes.len(),
                    path.display()
                );
                Ok(Some(path.to_string_lossy().to_string()))
            }
        }
    }
}

/// First of `name`, `stem (1).ext`, `stem (2).ext`, ... not present on disk.
async fn free_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
        return candidate;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((s, e)) => (s, format!(".{}", e)),
        None => (name, String::new()),
    };
    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, n, ext));
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}
