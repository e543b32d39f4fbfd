// src/core/coordinator.rs

use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::core::error::{AuditError, AuditResult};
use crate::core::models::RunStatus;

/// Allows at most one assessment at a time. Later requests are rejected,
/// never queued.
#[derive(Debug, Default)]
pub struct RunCoordinator {
    running: AtomicBool,
    last_completed: Mutex<Option<DateTime<Local>>>,
}

impl RunCoordinator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Moves Idle to Running. The returned guard moves it back when dropped.
    pub fn try_begin(self: &Arc<Self>) -> AuditResult<RunGuard> {
        if self.running.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            warn!("Rejected scan request: a scan is already running.");
            return Err(AuditError::AlreadyRunning);
        }
        info!("Scan run started.");
        Ok(RunGuard { coordinator: Arc::clone(self) })
    }

    /// Snapshot of the run flag and the last completion time.
    pub fn status(&self) -> RunStatus {
        RunStatus {
            running: self.running.load(Ordering::Acquire),
            last_completed: self.last_completed.lock().map(|t| *t).unwrap_or(None),
        }
    }

    fn finish(&self) {
        let now = Local::now();
        if let Ok(mut last) = self.last_completed.lock() {
            *last = Some(now);
        }
        self.running.store(false, Ordering::Release);
        info!(completed = %now.format("%H:%M:%S"), "Scan run finished.");
    }
}

/// Proof that the holder owns the single running slot.
#[derive(Debug)]
pub struct RunGuard {
    coordinator: Arc<RunCoordinator>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.coordinator.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_start_is_rejected_while_running() {
        let coordinator = RunCoordinator::new();
        let guard = coordinator.try_begin().unwrap();

        let err = coordinator.try_begin().unwrap_err();
        assert_eq!(err.to_string(), "Scan already running");
        assert!(coordinator.status().running);

        drop(guard);
        let status = coordinator.status();
        assert!(!status.running);
        assert!(status.last_completed.is_some());
        assert!(coordinator.try_begin().is_ok());
    }

    #[test]
    fn fresh_coordinator_is_idle() {
        let status = RunCoordinator::new().status();
        assert_eq!(status, RunStatus { running: false, last_completed: None });
    }

    #[test]
    fn panicking_run_still_releases_the_slot() {
        let coordinator = RunCoordinator::new();
        let inner = Arc::clone(&coordinator);
        let outcome = std::thread::spawn(move || {
            let _guard = inner.try_begin().unwrap();
            panic!("module blew up");
        })
        .join();

        assert!(outcome.is_err());
        assert!(!coordinator.status().running);
    }

    #[test]
    fn only_one_of_many_concurrent_starts_wins() {
        let coordinator = RunCoordinator::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&coordinator);
                std::thread::spawn(move || c.try_begin().ok().map(std::mem::forget).is_some())
            })
            .collect();
        let winners = handles.into_iter().filter_map(|h| h.join().ok()).filter(|won| *won).count();
        assert_eq!(winners, 1);
    }
}
