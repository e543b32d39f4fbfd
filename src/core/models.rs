// src/core/models.rs

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use strum::{Display, EnumIter};

// --- Core Data Models ---

/// Severity level of a finding. `Error` marks a check that could not run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Error,
}

/// The assessment concern a finding belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
pub enum FindingCategory {
    Network,
    #[serde(rename = "SSH")]
    #[strum(serialize = "SSH")]
    Ssh,
    System,
    Connection,
}

/// One leveled observation produced by a scan module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub level: Severity,
    pub category: FindingCategory,
    pub issue: String,
    #[serde(default)]
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub compliance: BTreeMap<String, String>,
}

impl Finding {
    pub fn new(level: Severity, category: FindingCategory, issue: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self {
            level,
            category,
            issue: issue.into(),
            recommendation: recommendation.into(),
            timestamp: Utc::now(),
            compliance: BTreeMap::new(),
        }
    }

    /// An `ERROR` finding carrying a failure message and no recommendation.
    pub fn error(category: FindingCategory, issue: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, issue, "")
    }

    pub fn with_compliance(mut self, refs: &[(&str, &str)]) -> Self {
        self.compliance = refs
            .iter()
            .map(|(framework, control)| (framework.to_string(), control.to_string()))
            .collect();
        self
    }
}

// --- Target & Credentials ---

/// Authentication material for the remote session. Exactly one kind is used.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Password(String),
    KeyFile(PathBuf),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Password(_) => f.write_str("Password(***)"),
            Credential::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
        }
    }
}

/// The host being assessed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub target_name: String,
}

impl Target {
    pub fn display_name(&self) -> String {
        format!("{} ({}:{})", self.target_name, self.host, self.port)
    }
}

/// Everything needed to run one assessment.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub target: Target,
    pub username: String,
    pub credential: Credential,
}

// --- Main Report ---

/// The merged result of one full assessment run.
///
/// `scan_id` stays `None` until the report is appended to the history ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    pub scan_target: String,
    #[serde(flatten)]
    pub target: Target,
    pub total_findings: usize,
    pub findings: Vec<Finding>,
    pub scan_time: DateTime<Utc>,
    pub scan_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,
}

impl ScanReport {
    pub fn new(target: Target, findings: Vec<Finding>) -> Self {
        let scan_time = Utc::now();
        Self {
            scan_target: target.display_name(),
            target,
            total_findings: findings.len(),
            findings,
            scan_time,
            scan_date: scan_time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
            scan_id: None,
        }
    }

    pub fn count_by_level(&self, level: Severity) -> usize {
        self.findings.iter().filter(|f| f.level == level).count()
    }
}

/// Snapshot of the run coordinator.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RunStatus {
    pub running: bool,
    pub last_completed: Option<DateTime<Local>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target { host: "10.0.0.5".into(), port: 2200, target_name: "Lab".into() }
    }

    #[test]
    fn finding_serializes_to_wire_shape() {
        let finding = Finding::new(Severity::High, FindingCategory::Ssh, "Password authentication enabled", "Use keys")
            .with_compliance(&[("CIS", "5.2.2"), ("NIST", "IA-2")]);
        let value = serde_json::to_value(&finding).unwrap();

        assert_eq!(value["level"], "HIGH");
        assert_eq!(value["category"], "SSH");
        assert_eq!(value["compliance"]["CIS"], "5.2.2");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn error_finding_has_empty_compliance_object() {
        let value = serde_json::to_value(Finding::error(FindingCategory::Connection, "boom")).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["recommendation"], "");
        assert_eq!(value["compliance"], serde_json::json!({}));
    }

    #[test]
    fn report_counts_findings_and_flattens_target() {
        let findings = vec![
            Finding::new(Severity::Low, FindingCategory::Network, "a", ""),
            Finding::new(Severity::Low, FindingCategory::Network, "b", ""),
        ];
        let report = ScanReport::new(target(), findings);
        assert_eq!(report.total_findings, 2);
        assert_eq!(report.scan_target, "Lab (10.0.0.5:2200)");
        assert_eq!(report.count_by_level(Severity::Low), 2);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["host"], "10.0.0.5");
        assert_eq!(value["port"], 2200);
        assert!(value.get("scan_id").is_none());
    }

    #[test]
    fn credential_debug_hides_password() {
        let rendered = format!("{:?}", Credential::Password("hunter2".into()));
        assert!(!rendered.contains("hunter2"));
    }
}
