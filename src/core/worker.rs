// src/core/worker.rs

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::core::coordinator::{RunCoordinator, RunGuard};
use crate::core::error::{AuditError, AuditResult};
use crate::core::history::ScanHistory;
use crate::core::models::{ScanReport, ScanRequest};
use crate::core::scanner::Auditor;

/// What the background worker reports back to the dashboard.
#[derive(Debug)]
pub enum WorkerEvent {
    /// The report was produced and saved to the history ledger.
    Completed(ScanReport),
    /// The report was produced but could not be saved.
    Unsaved { report: ScanReport, reason: String },
}

struct Job {
    request: ScanRequest,
    guard: RunGuard,
}

/// Handle to the single task that executes assessments.
#[derive(Clone)]
pub struct ScanWorker {
    jobs: mpsc::Sender<Job>,
    coordinator: Arc<RunCoordinator>,
}

impl ScanWorker {
    /// Starts the worker task. Must be called from within a tokio runtime.
    pub fn spawn(
        auditor: Auditor,
        history: ScanHistory,
        coordinator: Arc<RunCoordinator>,
    ) -> (Self, mpsc::Receiver<WorkerEvent>) {
        let (jobs_tx, mut jobs_rx) = mpsc::channel::<Job>(1);
        let (events_tx, events_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            while let Some(Job { request, guard }) = jobs_rx.recv().await {
                let report = auditor.run_full_scan(&request).await;
                let event = match history.append(report.clone()) {
                    Ok(saved) => WorkerEvent::Completed(saved),
                    Err(e) => {
                        error!(error = %e, "Failed to save report to history.");
                        WorkerEvent::Unsaved { report, reason: e.to_string() }
                    }
                };
                // Release the slot before notifying so the dashboard sees Idle.
                drop(guard);
                if events_tx.send(event).await.is_err() {
                    info!("Dashboard gone, stopping scan worker.");
                    break;
                }
            }
        });

        (Self { jobs: jobs_tx, coordinator }, events_rx)
    }

    /// Queues one assessment. Fails with `AlreadyRunning` if another is in
    /// flight and with `WorkerUnavailable` once the worker task is gone; the
    /// caller never waits for the scan itself. A rejected job releases its
    /// run slot.
    pub fn submit(&self, request: ScanRequest) -> AuditResult<()> {
        let guard = self.coordinator.try_begin()?;
        info!(scan_target = %request.target.display_name(), "Scan request accepted.");
        self.jobs
            .try_send(Job { request, guard })
            .map_err(|_| AuditError::WorkerUnavailable)
    }
}
