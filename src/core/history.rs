// src/core/history.rs

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::AuditResult;
use crate::core::models::ScanReport;
use crate::core::store::DocumentStore;

pub const HISTORY_CAPACITY: usize = 50;
pub const HISTORY_DOCUMENT: &str = "scan_history";
pub const CURRENT_REPORT_DOCUMENT: &str = "current_report";

/// Bounded, newest-first ledger of completed reports.
///
/// Only one writer at a time is expected; the run coordinator serialises
/// assessments so appends never race.
#[derive(Clone)]
pub struct ScanHistory {
    store: Arc<dyn DocumentStore>,
}

impl ScanHistory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Stamps the report with a fresh `scan_id`, puts it at the front of the
    /// ledger and persists both the ledger and the current-report snapshot.
    pub fn append(&self, mut report: ScanReport) -> AuditResult<ScanReport> {
        report.scan_id = Some(new_scan_id());

        let mut entries = self.list()?;
        entries.insert(0, report.clone());
        entries.truncate(HISTORY_CAPACITY);

        self.store.write(HISTORY_DOCUMENT, &serde_json::to_value(&entries)?)?;
        self.store.write(CURRENT_REPORT_DOCUMENT, &serde_json::to_value(&report)?)?;
        info!(scan_id = ?report.scan_id, entries = entries.len(), "Report added to history.");
        Ok(report)
    }

    /// Every stored report, newest first. A missing ledger is empty.
    pub fn list(&self) -> AuditResult<Vec<ScanReport>> {
        match self.store.read(HISTORY_DOCUMENT)? {
            Some(document) => Ok(serde_json::from_value(document)?),
            None => Ok(Vec::new()),
        }
    }

    /// Looks a report up by its short `scan_id`.
    pub fn get(&self, scan_id: &str) -> AuditResult<Option<ScanReport>> {
        Ok(self.list()?.into_iter().find(|r| r.scan_id.as_deref() == Some(scan_id)))
    }

    /// The most recently completed report, if any.
    pub fn current(&self) -> AuditResult<Option<ScanReport>> {
        match self.store.read(CURRENT_REPORT_DOCUMENT)? {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }
}

fn new_scan_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AuditError;
    use crate::core::models::{Finding, FindingCategory, Severity, Target};
    use crate::core::store::MemoryStore;
    use serde_json::json;

    fn history() -> ScanHistory {
        ScanHistory::new(Arc::new(MemoryStore::default()))
    }

    fn report(name: &str) -> ScanReport {
        let target = Target { host: "10.0.0.5".into(), port: 2200, target_name: name.into() };
        let findings = vec![
            Finding::new(Severity::High, FindingCategory::Ssh, "Password authentication enabled", "Use keys")
                .with_compliance(&[("CIS", "5.2.2")]),
        ];
        ScanReport::new(target, findings)
    }

    #[test]
    fn empty_ledger_lists_nothing() {
        let history = history();
        assert!(history.list().unwrap().is_empty());
        assert_eq!(history.current().unwrap(), None);
        assert_eq!(history.get("deadbeef").unwrap(), None);
    }

    #[test]
    fn append_then_get_round_trips() {
        let history = history();
        let stored = history.append(report("Lab")).unwrap();
        let scan_id = stored.scan_id.clone().unwrap();

        assert_eq!(scan_id.len(), 8);
        assert_eq!(history.get(&scan_id).unwrap(), Some(stored.clone()));
        assert_eq!(history.current().unwrap(), Some(stored));
    }

    #[test]
    fn ledger_keeps_the_newest_fifty() {
        let history = history();
        let mut ids = Vec::new();
        for i in 0..=HISTORY_CAPACITY {
            ids.push(history.append(report(&format!("target-{}", i))).unwrap().scan_id.unwrap());
        }

        let entries = history.list().unwrap();
        assert_eq!(entries.len(), HISTORY_CAPACITY);
        assert_eq!(entries[0].scan_id.as_deref(), Some(ids[HISTORY_CAPACITY].as_str()));
        assert_eq!(entries[0].target.target_name, "target-50");
        assert_eq!(entries[HISTORY_CAPACITY - 1].target.target_name, "target-1");
        assert_eq!(history.get(&ids[0]).unwrap(), None);
    }

    #[test]
    fn malformed_ledger_is_a_persistence_error() {
        let store = Arc::new(MemoryStore::default());
        store.write(HISTORY_DOCUMENT, &json!({"not": "a list"})).unwrap();
        let history = ScanHistory::new(store);

        assert!(matches!(history.list(), Err(AuditError::Persistence(_))));
        assert!(matches!(history.append(report("Lab")), Err(AuditError::Persistence(_))));
    }
}
