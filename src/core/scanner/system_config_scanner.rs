// src/core/scanner/system_config_scanner.rs

use std::sync::Arc;
use tracing::{debug, info};

use super::run_remote_checks;
use crate::core::knowledge_base;
use crate::core::models::{Finding, FindingCategory, ScanRequest};
use crate::core::session::{CommandOutput, Connector};

pub const SHADOW_PERMISSIONS_COMMAND: &str = "ls -la /etc/shadow";
pub const EMPTY_PASSWORDS_COMMAND: &str = r#"awk -F: '($2 == "") {print $1}' /etc/shadow"#;
pub const WORLD_WRITABLE_COMMAND: &str = "find /etc -type f -perm -002 2>/dev/null";

/// Mode string `/etc/shadow` must start with (0640).
const EXPECTED_SHADOW_MODE: &str = "-rw-r-----";

/// Audits file permissions and account hygiene on the target.
pub struct SystemConfigScanner {
    request: ScanRequest,
    connector: Arc<dyn Connector>,
}

impl SystemConfigScanner {
    /// Sessions are opened at scan time, not here.
    pub fn new(request: ScanRequest, connector: Arc<dyn Connector>) -> Self {
        Self { request, connector }
    }

    /// Runs the three checks in order. A failing command stops the remaining
    /// checks but keeps the findings already produced.
    pub async fn scan(&self) -> Vec<Finding> {
        info!(host = %self.request.target.host, "Starting system configuration scan.");
        let findings = run_remote_checks(
            self.connector.clone(),
            self.request.clone(),
            FindingCategory::System,
            |shell, findings| {
                let listing = shell.execute(SHADOW_PERMISSIONS_COMMAND)?;
                findings.extend(check_shadow_permissions(&listing));

                let empty = shell.execute(EMPTY_PASSWORDS_COMMAND)?;
                findings.extend(check_empty_passwords(&empty));

                let writable = shell.execute(WORLD_WRITABLE_COMMAND)?;
                findings.extend(check_world_writable(&writable));
                Ok(())
            },
        )
        .await;
        info!(findings = findings.len(), "System configuration scan finished.");
        findings
    }
}

/// Flags `/etc/shadow` unless its `ls -l` listing shows mode `-rw-r-----`.
pub fn check_shadow_permissions(listing: &CommandOutput) -> Option<Finding> {
    if listing.stdout.starts_with(EXPECTED_SHADOW_MODE) {
        return None;
    }
    debug!(listing = %listing.stdout.trim(), stderr = %listing.stderr.trim(), "Unexpected /etc/shadow mode.");
    Some(knowledge_base::SYS_SHADOW_PERMISSIONS.finding("Insecure /etc/shadow permissions"))
}

/// Flags the accounts listed by the empty-password query, if any.
pub fn check_empty_passwords(output: &CommandOutput) -> Option<Finding> {
    let users = output.stdout.trim();
    if users.is_empty() {
        return None;
    }
    Some(knowledge_base::SYS_EMPTY_PASSWORDS.finding(format!("Users with empty passwords: {}", users)))
}

/// One finding for all world-writable files under `/etc`, however many
/// there are. The file list itself only goes to the debug log.
pub fn check_world_writable(output: &CommandOutput) -> Option<Finding> {
    let files = output.stdout.trim();
    if files.is_empty() {
        return None;
    }
    debug!(count = files.lines().count(), "World-writable files under /etc.");
    Some(knowledge_base::SYS_WORLD_WRITABLE.finding("World-writable files found in /etc"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Credential, Severity, Target};
    use crate::core::session::testing::ScriptedConnector;

    fn out(stdout: &str) -> CommandOutput {
        CommandOutput { stdout: stdout.to_string(), stderr: String::new() }
    }

    fn request() -> ScanRequest {
        ScanRequest {
            target: Target { host: "10.0.0.5".into(), port: 22, target_name: "Lab".into() },
            username: "root".into(),
            credential: Credential::Password("pw".into()),
        }
    }

    #[test]
    fn shadow_mode_must_match_exact_prefix() {
        assert!(check_shadow_permissions(&out("-rw-r----- 1 root shadow 1203 Jan 1 /etc/shadow")).is_none());
        let finding = check_shadow_permissions(&out("-rw-r--r-- 1 root shadow 1203 Jan 1 /etc/shadow")).unwrap();
        assert_eq!(finding.level, Severity::High);
        assert!(check_shadow_permissions(&out("")).is_some());
    }

    #[test]
    fn empty_password_users_are_listed() {
        let finding = check_empty_passwords(&out("guest\nbackup\n")).unwrap();
        assert_eq!(finding.level, Severity::Critical);
        assert_eq!(finding.issue, "Users with empty passwords: guest\nbackup");
        assert!(check_empty_passwords(&out("  \n")).is_none());
    }

    #[test]
    fn world_writable_files_are_medium() {
        assert_eq!(check_world_writable(&out("/etc/motd\n")).unwrap().level, Severity::Medium);
        assert!(check_world_writable(&out("")).is_none());
    }

    #[tokio::test]
    async fn all_checks_run_over_one_session() {
        let connector = ScriptedConnector::default()
            .with(SHADOW_PERMISSIONS_COMMAND, "-rw-rw-rw- 1 root shadow 900 /etc/shadow\n")
            .with(EMPTY_PASSWORDS_COMMAND, "guest\n")
            .with(WORLD_WRITABLE_COMMAND, "/etc/hosts\n");
        let connects = connector.connects.clone();
        let findings = SystemConfigScanner::new(request(), Arc::new(connector)).scan().await;

        let levels: Vec<_> = findings.iter().map(|f| f.level).collect();
        assert_eq!(levels, vec![Severity::High, Severity::Critical, Severity::Medium]);
        assert_eq!(*connects.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_command_keeps_earlier_findings() {
        let connector = ScriptedConnector::default()
            .with(SHADOW_PERMISSIONS_COMMAND, "-rw-r--r-- 1 root shadow 900 /etc/shadow\n");
        let disconnects = connector.disconnects.clone();
        let findings = SystemConfigScanner::new(request(), Arc::new(connector)).scan().await;

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].level, Severity::High);
        assert_eq!(findings[1].level, Severity::Error);
        assert_eq!(findings[1].category, FindingCategory::System);
        assert_eq!(*disconnects.lock().unwrap(), 1);
    }
}
