use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use vidlingo_core::core::events::ProcessingPhase;

use crate::backend::traits::DownloadClient;
use crate::core::errors::{DownloadError, QueueError};
use crate::core::queue::DownloadQueue;
use crate::core::sink::ResultSink;
use crate::core::status::{run_progress, StatusReporter};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub attempted: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl RunSummary {
    fn describe(&self) -> String {
        let mut s = format!("{} completed, {} failed", self.completed, self.failed);
        if self.cancelled {
            s.push_str(", cancelled");
        }
        s
    }
}

/// Drives the queue one item at a time. A run works on the items that were
/// `Queued` when it started, in insertion order, with at most one download
/// request outstanding. A failed item never stops the batch.
#[derive(Clone)]
pub struct QueueProcessor {
    queue: Arc<Mutex<DownloadQueue>>,
    status: StatusReporter,
    downloader: Arc<dyn DownloadClient>,
    sink: Arc<dyn ResultSink>,
}

impl QueueProcessor {
    pub fn new(
        queue: Arc<Mutex<DownloadQueue>>,
        status: StatusReporter,
        downloader: Arc<dyn DownloadClient>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            queue,
            status,
            downloader,
            sink,
        }
    }

    /// Fails with [`QueueError::Busy`] if another run is active. The token is
    /// checked before each item and raced against the in-flight request.
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunSummary, QueueError> {
        let (_guard, snapshot) = {
            let q = self.queue.lock().await;
            let guard = q.begin_run()?;
            (guard, q.queued_ids())
        };

        let total = snapshot.len();
        if total == 0 {
            self.status.set(ProcessingPhase::Idle, "Queue is empty", 0);
            return Ok(RunSummary::default());
        }

        tracing::info!("Run started with {} queued item(s)", total);
        let mut summary = RunSummary::default();

        for (index, id) in snapshot.into_iter().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let item = {
                let mut q = self.queue.lock().await;
                match q.mark_downloading(id) {
                    Some(item) => {
                        self.status.emitter().emit_queue_state(&q.list());
                        item
                    }
                    None => {
                        tracing::debug!("Item {} left the queue before its turn", id);
                        continue;
                    }
                }
            };

            summary.attempted += 1;
            self.status.set(
                ProcessingPhase::Running,
                format!("Processing item {} of {}", index + 1, total),
                run_progress(index, total),
            );
            tracing::info!(
                "Downloading item {} '{}' ({} / {})",
                item.id,
                item.title,
                item.quality,
                item.language
            );

            let request = item.to_request();
            let result = tokio::select! {
                r = self.downloader.download(&request) => r,
                _ = cancel.cancelled() => Err(DownloadError::Cancelled),
            };

            let delivered = match result {
                Ok(outcome) => self
                    .sink
                    .deliver(&item.to_info(), outcome)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => {
                    if e == DownloadError::Cancelled {
                        summary.cancelled = true;
                    }
                    Err(e.to_string())
                }
            };

            let mut q = self.queue.lock().await;
            match delivered {
                Ok(location) => {
                    q.mark_completed(id, location);
                    summary.completed += 1;
                }
                Err(message) => {
                    tracing::warn!("Item {} '{}' failed: {}", item.id, item.title, message);
                    self.status
                        .set_detail(format!("Item {} of {} failed: {}", index + 1, total, message));
                    q.mark_failed(id, message);
                    summary.failed += 1;
                }
            }
            self.status.emitter().emit_queue_state(&q.list());
        }

        tracing::info!("Run finished: {}", summary.describe());
        self.status.set(ProcessingPhase::Done, summary.describe(), 100);
        Ok(summary)
    }
}
