use std::sync::{Arc, RwLock};

use vidlingo_core::core::events::{EventEmitter, ProcessingPhase, ProcessingStatus};

/// Shared handle over the process-wide [`ProcessingStatus`]. Clones observe
/// and update the same state; every update is forwarded to the emitter.
#[derive(Clone)]
pub struct StatusReporter {
    state: Arc<RwLock<ProcessingStatus>>,
    emitter: Arc<dyn EventEmitter>,
}

impl StatusReporter {
    pub fn new(emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ProcessingStatus::default())),
            emitter,
        }
    }

    pub fn snapshot(&self) -> ProcessingStatus {
        self.state.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn phase(&self) -> ProcessingPhase {
        self.snapshot().phase
    }

    pub fn set(&self, phase: ProcessingPhase, detail: impl Into<String>, progress_percent: u8) {
        let status = ProcessingStatus {
            phase,
            detail: detail.into(),
            progress_percent: progress_percent.min(100),
        };
        if let Ok(mut guard) = self.state.write() {
            *guard = status.clone();
        }
        self.emitter.emit_status(&status);
    }

    /// Replaces the detail text, keeping phase and progress.
    pub fn set_detail(&self, detail: impl Into<String>) {
        let current = self.snapshot();
        self.set(current.phase, detail, current.progress_percent);
    }

    /// Like [`set`](Self::set), but while a run is in progress only the
    /// detail changes, so the run keeps its phase and progress.
    pub fn set_outside_run(
        &self,
        phase: ProcessingPhase,
        detail: impl Into<String>,
        progress_percent: u8,
    ) {
        let detail = detail.into();
        let status = match self.state.write() {
            Ok(mut guard) => {
                if guard.phase == ProcessingPhase::Running {
                    guard.detail = detail;
                } else {
                    *guard = ProcessingStatus {
                        phase,
                        detail,
                        progress_percent: progress_percent.min(100),
                    };
                }
                guard.clone()
            }
            Err(_) => return,
        };
        self.emitter.emit_status(&status);
    }

    pub fn emitter(&self) -> &Arc<dyn EventEmitter> {
        &self.emitter
    }
}

/// Coarse progress through a run: share of items already finished.
pub fn run_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::RecordingEmitter;

    #[test]
    fn set_updates_snapshot_and_emits() {
        let emitter = Arc::new(RecordingEmitter::default());
        let status = StatusReporter::new(emitter.clone());
        status.set(ProcessingPhase::Analyzing, "Analyzing video...", 30);

        let snap = status.snapshot();
        assert_eq!(snap.phase, ProcessingPhase::Analyzing);
        assert_eq!(snap.progress_percent, 30);
        assert_eq!(emitter.statuses().len(), 1);
    }

    #[test]
    fn outside_run_update_keeps_running_phase() {
        let status = StatusReporter::new(Arc::new(RecordingEmitter::default()));
        status.set(ProcessingPhase::Running, "Processing item 2 of 4", 25);
        status.set_outside_run(ProcessingPhase::Analyzing, "Analyzing video...", 30);

        let snap = status.snapshot();
        assert_eq!(snap.phase, ProcessingPhase::Running);
        assert_eq!(snap.progress_percent, 25);
        assert_eq!(snap.detail, "Analyzing video...");

        status.set(ProcessingPhase::Done, "4 completed, 0 failed", 100);
        status.set_outside_run(ProcessingPhase::Analyzing, "Analyzing video...", 30);
        assert_eq!(status.phase(), ProcessingPhase::Analyzing);
    }

    #[test]
    fn clones_share_state() {
        let status = StatusReporter::new(Arc::new(RecordingEmitter::default()));
        let other = status.clone();
        other.set(ProcessingPhase::Running, "Processing item 1 of 2", 0);
        assert_eq!(status.phase(), ProcessingPhase::Running);
    }

    #[test]
    fn progress_is_clamped() {
        let status = StatusReporter::new(Arc::new(RecordingEmitter::default()));
        status.set(ProcessingPhase::Done, "", 250);
        assert_eq!(status.snapshot().progress_percent, 100);
    }

    #[test]
    fn set_detail_keeps_phase() {
        let status = StatusReporter::new(Arc::new(RecordingEmitter::default()));
        status.set(ProcessingPhase::Running, "Processing item 1 of 3", 33);
        status.set_detail("HTTP 500");
        let snap = status.snapshot();
        assert_eq!(snap.phase, ProcessingPhase::Running);
        assert_eq!(snap.progress_percent, 33);
        assert_eq!(snap.detail, "HTTP 500");
    }

    #[test]
    fn run_progress_steps() {
        assert_eq!(run_progress(0, 4), 0);
        assert_eq!(run_progress(1, 4), 25);
        assert_eq!(run_progress(4, 4), 100);
        assert_eq!(run_progress(0, 0), 100);
    }
}
