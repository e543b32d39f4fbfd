// src/core/scanner/ssh_config_scanner.rs

use std::sync::Arc;
use tracing::{debug, info};

use super::run_remote_checks;
use crate::core::knowledge_base;
use crate::core::models::{Finding, FindingCategory, ScanRequest};
use crate::core::session::Connector;

pub const SSHD_CONFIG_COMMAND: &str = "cat /etc/ssh/sshd_config";

/// Cipher tokens that make a `Ciphers` directive weak.
const WEAK_CIPHERS: [&str; 4] = ["3des-cbc", "aes128-cbc", "aes192-cbc", "aes256-cbc"];

/// Audits the SSH daemon configuration of the target.
pub struct SshConfigScanner {
    request: ScanRequest,
    connector: Arc<dyn Connector>,
}

impl SshConfigScanner {
    pub fn new(request: ScanRequest, connector: Arc<dyn Connector>) -> Self {
        Self { request, connector }
    }

    /// Reads `sshd_config` over one session and applies the rules to it.
    pub async fn scan(&self) -> Vec<Finding> {
        info!(host = %self.request.target.host, "Starting SSH configuration scan.");
        let findings = run_remote_checks(
            self.connector.clone(),
            self.request.clone(),
            FindingCategory::Ssh,
            |shell, findings| {
                let output = shell.execute(SSHD_CONFIG_COMMAND)?;
                findings.extend(analyze_sshd_config(&output.stdout));
                Ok(())
            },
        )
        .await;
        info!(findings = findings.len(), "SSH configuration scan finished.");
        findings
    }
}

/// Applies the sshd hardening rules to the raw configuration text.
///
/// Matching is literal and case-sensitive. A `Ciphers` line yields one
/// finding per weak token it lists, and every such line is evaluated.
pub fn analyze_sshd_config(config: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    if config.contains("PermitRootLogin yes") {
        findings.push(knowledge_base::SSH_ROOT_LOGIN.finding("Root login is enabled"));
    }

    if config.contains("PasswordAuthentication yes") {
        findings.push(knowledge_base::SSH_PASSWORD_AUTH.finding("Password authentication enabled"));
    }

    if config.contains("PermitEmptyPasswords yes") {
        findings.push(knowledge_base::SSH_EMPTY_PASSWORDS.finding("Empty passwords permitted"));
    }

    for line in config.lines().filter(|l| l.trim().starts_with("Ciphers")) {
        debug!(line, "Inspecting Ciphers directive.");
        for cipher in WEAK_CIPHERS.iter().filter(|c| line.contains(*c)) {
            findings.push(knowledge_base::SSH_WEAK_CIPHER.finding(format!("Weak cipher {} enabled", cipher)));
        }
    }

    findings
}
