use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use vidlingo_core::core::events::{QueueItemInfo, QueueStatus};

use crate::core::errors::QueueError;
use crate::models::media::DownloadRequest;

/// A committed selection, ready to be appended to the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueueItem {
    pub url: String,
    pub title: String,
    pub quality: String,
    pub language: String,
    pub video_ref: String,
    pub audio_ref: String,
    pub include_subtitles: bool,
}

#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: u64,
    pub url: String,
    pub title: String,
    pub quality: String,
    pub language: String,
    pub video_ref: String,
    pub audio_ref: String,
    pub include_subtitles: bool,
    pub status: QueueStatus,
    pub result_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl QueueItem {
    pub fn to_info(&self) -> QueueItemInfo {
        QueueItemInfo {
            id: self.id,
            url: self.url.clone(),
            title: self.title.clone(),
            quality: self.quality.clone(),
            language: self.language.clone(),
            video_ref: self.video_ref.clone(),
            audio_ref: self.audio_ref.clone(),
            include_subtitles: self.include_subtitles,
            status: self.status.clone(),
            result_location: self.result_location.clone(),
            created_at: self.created_at,
            finished_at: self.finished_at,
        }
    }

    pub fn to_request(&self) -> DownloadRequest {
        DownloadRequest {
            url: self.url.clone(),
            title: self.title.clone(),
            quality: self.quality.clone(),
            language: self.language.clone(),
            video_ref: self.video_ref.clone(),
            audio_ref: self.audio_ref.clone(),
            include_subtitles: self.include_subtitles,
        }
    }
}

/// Ordered job list. Insertion order is processing order and is never
/// reshuffled; statuses are only advanced by the processor.
pub struct DownloadQueue {
    items: Vec<QueueItem>,
    next_id: u64,
    running: Arc<AtomicBool>,
}

/// Held for the duration of a run; releases the busy flag on drop.
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl DownloadQueue {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn add(&mut self, new: NewQueueItem) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(QueueItem {
            id,
            url: new.url,
            title: new.title,
            quality: new.quality,
            language: new.language,
            video_ref: new.video_ref,
            audio_ref: new.audio_ref,
            include_subtitles: new.include_subtitles,
            status: QueueStatus::Queued,
            result_location: None,
            created_at: Utc::now(),
            finished_at: None,
        });
        id
    }

    /// `Ok(false)` when the id is unknown. An item that is downloading is
    /// never removed.
    pub fn remove(&mut self, id: u64) -> Result<bool, QueueError> {
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            return Ok(false);
        };
        if self.items[pos].status == QueueStatus::Downloading {
            return Err(QueueError::Busy("item is downloading"));
        }
        self.items.remove(pos);
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), QueueError> {
        if self.is_running() {
            return Err(QueueError::Busy("queue is being processed"));
        }
        self.items.clear();
        Ok(())
    }

    pub fn clear_finished(&mut self) {
        self.items.retain(|i| !i.status.is_finished());
    }

    pub fn list(&self) -> Vec<QueueItemInfo> {
        self.items.iter().map(|i| i.to_info()).collect()
    }

    pub fn get(&self, id: u64) -> Option<&QueueItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn downloading_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == QueueStatus::Downloading)
            .count()
    }

    pub(crate) fn begin_run(&self) -> Result<RunGuard, QueueError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| QueueError::Busy("a run is already in progress"))?;
        Ok(RunGuard {
            running: self.running.clone(),
        })
    }

    pub(crate) fn queued_ids(&self) -> Vec<u64> {
        self.items
            .iter()
            .filter(|i| i.status == QueueStatus::Queued)
            .map(|i| i.id)
            .collect()
    }

    /// Moves a still-queued item to `Downloading` and returns a copy of it.
    /// `None` if the item was removed or already left the queued state.
    pub(crate) fn mark_downloading(&mut self, id: u64) -> Option<QueueItem> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        if item.status != QueueStatus::Queued {
            return None;
        }
        item.status = QueueStatus::Downloading;
        Some(item.clone())
    }

    pub(crate) fn mark_completed(&mut self, id: u64, result_location: Option<String>) {
        if let Some(item) = self.downloading_mut(id) {
            item.status = QueueStatus::Completed;
            item.result_location = result_location;
            item.finished_at = Some(Utc::now());
        }
    }

    pub(crate) fn mark_failed(&mut self, id: u64, message: String) {
        if let Some(item) = self.downloading_mut(id) {
            item.status = QueueStatus::Failed { message };
            item.finished_at = Some(Utc::now());
        }
    }

    fn downloading_mut(&mut self, id: u64) -> Option<&mut QueueItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id && i.status == QueueStatus::Downloading)
    }
}

impl Default for DownloadQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) fn sample_item(url: &str, quality: &str) -> NewQueueItem {
    NewQueueItem {
        url: url.to_string(),
        title: format!("Title of {}", url),
        quality: quality.to_string(),
        language: "en".to_string(),
        video_ref: quality.to_string(),
        audio_ref: "en".to_string(),
        include_subtitles: false,
    }
}
