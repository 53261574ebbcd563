use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use vidlingo_core::core::events::{EventEmitter, QueueItemInfo};
use vidlingo_core::fs_paths::DesktopPaths;
use vidlingo_core::models::settings::AppSettings;

use crate::backend::analyze::{analyze_and_report, HttpMetadataClient};
use crate::backend::download::HttpDownloadClient;
use crate::backend::traits::{DownloadClient, MetadataClient};
use crate::core::errors::{AnalyzeError, QueueError};
use crate::core::processor::{QueueProcessor, RunSummary};
use crate::core::queue::DownloadQueue;
use crate::core::selection::Selection;
use crate::core::sink::{LocalResultSink, ResultSink};
use crate::core::status::StatusReporter;

pub mod backend;
pub mod core;
pub mod models;
pub mod storage;

/// Owned application state: the queue, the status reporter and the
/// adapters that talk to the extraction backend.
pub struct AppState {
    pub settings: AppSettings,
    pub queue: Arc<Mutex<DownloadQueue>>,
    pub status: StatusReporter,
    pub metadata: Arc<dyn MetadataClient>,
    pub processor: QueueProcessor,
}

impl AppState {
    pub fn new(settings: AppSettings, emitter: Arc<dyn EventEmitter>) -> Self {
        let client = crate::core::http_client::build_client(&settings);
        let metadata = Arc::new(HttpMetadataClient::new(
            client.clone(),
            settings.backend.base_url.clone(),
        ));
        let downloader = Arc::new(HttpDownloadClient::new(
            client,
            settings.backend.base_url.clone(),
            settings.backend.response_mode,
        ));
        let sink = Arc::new(LocalResultSink::new(
            settings.download.default_output_dir.clone(),
            settings.download.open_on_complete,
        ));
        Self::with_clients(settings, emitter, metadata, downloader, sink)
    }

    pub fn with_clients(
        settings: AppSettings,
        emitter: Arc<dyn EventEmitter>,
        metadata: Arc<dyn MetadataClient>,
        downloader: Arc<dyn DownloadClient>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let queue = Arc::new(Mutex::new(DownloadQueue::new()));
        let status = StatusReporter::new(emitter);
        let processor = QueueProcessor::new(queue.clone(), status.clone(), downloader, sink);
        Self {
            settings,
            queue,
            status,
            metadata,
            processor,
        }
    }

    /// Analyzes `url` and opens a pending selection on its default variants.
    pub async fn analyze(&self, url: &str) -> Result<Selection, AnalyzeError> {
        let meta = analyze_and_report(self.metadata.as_ref(), &self.status, url).await?;
        Selection::new(meta, self.settings.download.include_subtitles).ok_or_else(|| {
            AnalyzeError::MalformedResponse("no selectable video or audio variant".into())
        })
    }

    pub async fn commit(&self, selection: Selection) -> u64 {
        let mut q = self.queue.lock().await;
        let id = q.add(selection.commit());
        self.status.emitter().emit_queue_state(&q.list());
        id
    }

    pub async fn remove(&self, id: u64) -> Result<bool, QueueError> {
        let mut q = self.queue.lock().await;
        let removed = q.remove(id)?;
        if removed {
            self.status.emitter().emit_queue_state(&q.list());
        }
        Ok(removed)
    }

    pub async fn clear(&self) -> Result<(), QueueError> {
        let mut q = self.queue.lock().await;
        q.clear()?;
        self.status.emitter().emit_queue_state(&q.list());
        Ok(())
    }

    pub async fn clear_finished(&self) {
        let mut q = self.queue.lock().await;
        q.clear_finished();
        self.status.emitter().emit_queue_state(&q.list());
    }

    pub async fn run_queue(&self, cancel: CancellationToken) -> Result<RunSummary, QueueError> {
        self.processor.run(cancel).await
    }

    pub async fn queue_state(&self) -> Vec<QueueItemInfo> {
        self.queue.lock().await.list()
    }
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Analyzes every url, queues its default selection and processes the
/// queue once. Ctrl-C stops the run before the next item.
pub async fn run(urls: Vec<String>) -> anyhow::Result<()> {
    if urls.is_empty() {
        anyhow::bail!("usage: vidlingo <url> [<url>...]");
    }

    let settings = storage::config::load_settings(&DesktopPaths);
    tracing::info!(
        "Using backend {} ({:?} responses)",
        settings.backend.base_url,
        settings.backend.response_mode
    );
    let state = AppState::new(settings, Arc::new(crate::core::events::TracingEventEmitter));

    for url in &urls {
        match state.analyze(url).await {
            Ok(selection) => {
                let id = state.commit(selection).await;
                tracing::info!("Queued {} as item {}", url, id);
            }
            Err(e) => tracing::error!("Skipping {}: {}", url, e),
        }
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current item");
            on_signal.cancel();
        }
    });

    let summary = state.run_queue(cancel).await?;
    println!("{}", serde_json::to_string_pretty(&state.queue_state().await)?);

    if summary.failed > 0 {
        anyhow::bail!("{} of {} download(s) failed", summary.failed, summary.attempted);
    }
    Ok(())
}
