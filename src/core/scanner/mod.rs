// src/core/scanner/mod.rs

pub mod network_scanner;
pub mod port_prober;
pub mod ssh_config_scanner;
pub mod system_config_scanner;

use std::sync::Arc;
use tokio::task::spawn_blocking;
use tracing::{error, info, warn};

use self::network_scanner::NetworkScanner;
use self::ssh_config_scanner::SshConfigScanner;
use self::system_config_scanner::SystemConfigScanner;
use crate::config::AuditConfig;
use crate::core::credentials::validate_credential;
use crate::core::error::AuditResult;
use crate::core::models::{Finding, FindingCategory, ScanReport, ScanRequest};
use crate::core::session::{Connector, RemoteShell};

/// The fixed set of assessment modules.
pub enum ScanModule {
    Network(NetworkScanner),
    SshConfig(SshConfigScanner),
    SystemConfig(SystemConfigScanner),
}

impl ScanModule {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ScanModule::Network(_) => "network",
            ScanModule::SshConfig(_) => "ssh-config",
            ScanModule::SystemConfig(_) => "system-config",
        }
    }

    /// Runs the module. Failures are already folded into `ERROR` findings.
    pub async fn scan(&self) -> Vec<Finding> {
        match self {
            ScanModule::Network(scanner) => scanner.scan().await,
            ScanModule::SshConfig(scanner) => scanner.scan().await,
            ScanModule::SystemConfig(scanner) => scanner.scan().await,
        }
    }
}

/// Opens a session, runs `checks` against it on a blocking thread and always
/// disconnects afterwards.
///
/// Whatever `checks` pushed before an error is kept, followed by exactly one
/// `ERROR` finding in `category`.
pub(crate) async fn run_remote_checks<F>(
    connector: Arc<dyn Connector>,
    request: ScanRequest,
    category: FindingCategory,
    checks: F,
) -> Vec<Finding>
where
    F: FnOnce(&mut dyn RemoteShell, &mut Vec<Finding>) -> AuditResult<()> + Send + 'static,
{
    spawn_blocking(move || {
        let mut findings = Vec::new();
        let outcome = connector.connect(&request).and_then(|mut shell| {
            let result = checks(shell.as_mut(), &mut findings);
            shell.disconnect();
            result
        });
        if let Err(e) = outcome {
            error!(category = %category, error = %e, "Scan module failed.");
            findings.push(Finding::error(category, format!("Scan failed: {}", e)));
        }
        findings
    })
    .await
    .unwrap_or_else(|e| {
        error!(panic = %e, "Blocking scan task panicked!");
        vec![Finding::error(category, format!("Scan failed: task panicked: {}", e))]
    })
}

/// Runs the assessment pipeline for one target.
pub struct Auditor {
    config: AuditConfig,
    connector: Arc<dyn Connector>,
}

impl Auditor {
    pub fn new(config: AuditConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    /// Builds the modules in execution order: network first since it needs no
    /// session, then SSH configuration, then system configuration.
    pub fn build_modules(&self, request: &ScanRequest) -> AuditResult<Vec<ScanModule>> {
        validate_credential(&request.credential)?;
        Ok(vec![
            ScanModule::Network(NetworkScanner::new(request.target.clone(), &self.config)?),
            ScanModule::SshConfig(SshConfigScanner::new(request.clone(), self.connector.clone())),
            ScanModule::SystemConfig(SystemConfigScanner::new(request.clone(), self.connector.clone())),
        ])
    }

    /// Executes every module in order and merges their findings by
    /// concatenation. Always returns a report: if the modules cannot even be
    /// built, the report holds a single `Connection` error.
    pub async fn run_full_scan(&self, request: &ScanRequest) -> ScanReport {
        let target = &request.target;
        info!(scan_target = %target.display_name(), user = %request.username, "Starting security audit.");

        let mut all_findings = Vec::new();
        match self.build_modules(request) {
            Ok(modules) => {
                for module in &modules {
                    let findings = module.scan().await;
                    info!(module = module.name(), findings = findings.len(), "Module finished.");
                    all_findings.extend(findings);
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not prepare scan modules.");
                all_findings.push(Finding::error(FindingCategory::Connection, format!("Failed to connect: {}", e)));
            }
        }

        let report = ScanReport::new(target.clone(), all_findings);
        info!(total = report.total_findings, "Security audit complete.");
        report
    }
}
