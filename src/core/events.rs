use vidlingo_core::core::events::{EventEmitter, ProcessingStatus, QueueItemInfo, QueueStatus};

/// Publishes queue and status updates to the log. Front-ends that render
/// state themselves plug their own [`EventEmitter`] in instead.
#[derive(Clone, Default)]
pub struct TracingEventEmitter;

impl EventEmitter for TracingEventEmitter {
    fn emit_queue_state(&self, items: &[QueueItemInfo]) {
        let downloading = items
            .iter()
            .filter(|i| i.status == QueueStatus::Downloading)
            .count();
        let finished = items.iter().filter(|i| i.status.is_finished()).count();
        tracing::debug!(
            total = items.len(),
            downloading,
            finished,
            "queue-state-update"
        );
    }

    fn emit_status(&self, status: &ProcessingStatus) {
        tracing::info!(
            phase = ?status.phase,
            progress = status.progress_percent,
            "{}",
            status.detail
        );
    }
}

#[cfg(test)]
pub use recording::RecordingEmitter;

#[cfg(test)]
mod recording {
    use std::sync::Mutex;

    use super::*;

    /// Keeps every emitted snapshot so tests can sample invariants over time.
    #[derive(Default)]
    pub struct RecordingEmitter {
        queue_states: Mutex<Vec<Vec<QueueItemInfo>>>,
        statuses: Mutex<Vec<ProcessingStatus>>,
    }

    impl RecordingEmitter {
        pub fn queue_states(&self) -> Vec<Vec<QueueItemInfo>> {
            self.queue_states.lock().unwrap().clone()
        }

        pub fn statuses(&self) -> Vec<ProcessingStatus> {
            self.statuses.lock().unwrap().clone()
        }
    }

    impl EventEmitter for RecordingEmitter {
        fn emit_queue_state(&self, items: &[QueueItemInfo]) {
            self.queue_states.lock().unwrap().push(items.to_vec());
        }

        fn emit_status(&self, status: &ProcessingStatus) {
            self.statuses.lock().unwrap().push(status.clone());
        }
    }
}
