use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of one queued job. Transitions only move forward:
/// `Queued -> Downloading -> Completed | Failed`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum QueueStatus {
    Queued,
    Downloading,
    Completed,
    Failed { message: String },
}

impl QueueStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, QueueStatus::Completed | QueueStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueItemInfo {
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

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPhase {
    #[default]
    Idle,
    Analyzing,
    Running,
    Done,
}

/// Coarse, human-readable state for presentation. `progress_percent` is
/// derived from phase and queue position, never from transferred bytes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct ProcessingStatus {
    pub phase: ProcessingPhase,
    pub detail: String,
    pub progress_percent: u8,
}

pub trait EventEmitter: Send + Sync + 'static {
    fn emit_queue_state(&self, items: &[QueueItemInfo]);
    fn emit_status(&self, status: &ProcessingStatus);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_statuses() {
        assert!(!QueueStatus::Queued.is_finished());
        assert!(!QueueStatus::Downloading.is_finished());
        assert!(QueueStatus::Completed.is_finished());
        assert!(QueueStatus::Failed {
            message: "HTTP 500".into()
        }
        .is_finished());
    }

    #[test]
    fn status_serializes_tagged() {
        let v = serde_json::to_value(QueueStatus::Failed {
            message: "boom".into(),
        })
        .unwrap();
        assert_eq!(v["type"], "Failed");
        assert_eq!(v["data"]["message"], "boom");

        let v = serde_json::to_value(QueueStatus::Queued).unwrap();
        assert_eq!(v["type"], "Queued");
    }

    #[test]
    fn phase_serializes_snake_case() {
        let v = serde_json::to_value(ProcessingPhase::Analyzing).unwrap();
        assert_eq!(v, "analyzing");
    }

    #[test]
    fn default_status_is_idle() {
        let s = ProcessingStatus::default();
        assert_eq!(s.phase, ProcessingPhase::Idle);
        assert_eq!(s.progress_percent, 0);
        assert!(s.detail.is_empty());
    }
}
