//! Static, read-only catalogue of every hardening rule the auditor knows.
//! Each entry fixes the severity, category, remediation text and compliance
//! references of one kind of finding; scanners only supply the issue text.

use tracing::debug;

use crate::core::models::{Finding, FindingCategory, Severity};

/// Everything about a rule that does not depend on what was observed.
pub struct FindingDetail {
    /// Machine-readable identifier (e.g. "SSH_ROOT_LOGIN").
    pub code: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    /// Actionable remediation shown next to the finding.
    pub remediation: &'static str,
    /// Framework name to control identifier.
    pub compliance: &'static [(&'static str, &'static str)],
}

impl FindingDetail {
    /// Builds a finding for this rule with the observed issue text.
    pub fn finding(&self, issue: impl Into<String>) -> Finding {
        debug!(rule = self.code, severity = %self.severity, "Rule matched.");
        Finding::new(self.severity, self.category, issue, self.remediation).with_compliance(self.compliance)
    }
}

// --- Network exposure ---

pub static NET_TELNET: FindingDetail = FindingDetail {
    code: "NET_TELNET",
    category: FindingCategory::Network,
    severity: Severity::Critical,
    remediation: "Disable Telnet and use SSH instead",
    compliance: &[("CIS", "2.1.1"), ("NIST", "SC-8")],
};

pub static NET_FILE_SHARING: FindingDetail = FindingDetail {
    code: "NET_FILE_SHARING",
    category: FindingCategory::Network,
    severity: Severity::High,
    remediation: "Restrict access or disable if not needed",
    compliance: &[("CIS", "2.2.1"), ("NIST", "AC-4")],
};

pub static NET_FTP: FindingDetail = FindingDetail {
    code: "NET_FTP",
    category: FindingCategory::Network,
    severity: Severity::High,
    remediation: "Use SFTP instead of FTP for secure file transfer",
    compliance: &[("CIS", "2.1.2"), ("NIST", "SC-8")],
};

pub static NET_RDP: FindingDetail = FindingDetail {
    code: "NET_RDP",
    category: FindingCategory::Network,
    severity: Severity::Medium,
    remediation: "Ensure RDP is properly secured with NLA and strong authentication",
    compliance: &[("CIS", "2.2.2"), ("NIST", "AC-17")],
};

pub static NET_DATABASE: FindingDetail = FindingDetail {
    code: "NET_DATABASE",
    category: FindingCategory::Network,
    severity: Severity::High,
    remediation: "Database should not be directly accessible from external networks",
    compliance: &[("CIS", "2.2.3"), ("NIST", "AC-4")],
};

pub static NET_REDIS: FindingDetail = FindingDetail {
    code: "NET_REDIS",
    category: FindingCategory::Network,
    severity: Severity::High,
    remediation: "Configure Redis authentication and bind to localhost only",
    compliance: &[("OWASP", "A6"), ("NIST", "AC-3")],
};

pub static NET_MONGODB: FindingDetail = FindingDetail {
    code: "NET_MONGODB",
    category: FindingCategory::Network,
    severity: Severity::High,
    remediation: "Ensure MongoDB has authentication enabled and proper access controls",
    compliance: &[("OWASP", "A6"), ("NIST", "AC-3")],
};

pub static NET_SSH_STANDARD_PORT: FindingDetail = FindingDetail {
    code: "NET_SSH_STANDARD_PORT",
    category: FindingCategory::Network,
    severity: Severity::Low,
    remediation: "Consider moving SSH to a non-standard port for additional security",
    compliance: &[],
};

pub static NET_UNKNOWN_SERVICE: FindingDetail = FindingDetail {
    code: "NET_UNKNOWN_SERVICE",
    category: FindingCategory::Network,
    severity: Severity::Low,
    remediation: "Review if this service is necessary and properly secured",
    compliance: &[],
};

pub static NET_NO_SERVICES: FindingDetail = FindingDetail {
    code: "NET_NO_SERVICES",
    category: FindingCategory::Network,
    severity: Severity::Low,
    remediation: "This indicates good port security - only necessary services should be exposed",
    compliance: &[],
};

pub static NET_ONLY_NONSTANDARD_SSH: FindingDetail = FindingDetail {
    code: "NET_ONLY_NONSTANDARD_SSH",
    category: FindingCategory::Network,
    severity: Severity::Low,
    remediation: "Good security practice - minimal attack surface with SSH on non-standard port",
    compliance: &[],
};

// --- SSH daemon configuration ---

pub static SSH_ROOT_LOGIN: FindingDetail = FindingDetail {
    code: "SSH_ROOT_LOGIN",
    category: FindingCategory::Ssh,
    severity: Severity::Critical,
    remediation: "Set 'PermitRootLogin no' in /etc/ssh/sshd_config",
    compliance: &[("CIS", "5.2.1"), ("NIST", "AC-3")],
};

pub static SSH_PASSWORD_AUTH: FindingDetail = FindingDetail {
    code: "SSH_PASSWORD_AUTH",
    category: FindingCategory::Ssh,
    severity: Severity::High,
    remediation: "Use SSH keys and set 'PasswordAuthentication no'",
    compliance: &[("CIS", "5.2.2"), ("NIST", "IA-2")],
};

pub static SSH_EMPTY_PASSWORDS: FindingDetail = FindingDetail {
    code: "SSH_EMPTY_PASSWORDS",
    category: FindingCategory::Ssh,
    severity: Severity::Critical,
    remediation: "Set 'PermitEmptyPasswords no'",
    compliance: &[("CIS", "5.2.3"), ("NIST", "IA-5")],
};

pub static SSH_WEAK_CIPHER: FindingDetail = FindingDetail {
    code: "SSH_WEAK_CIPHER",
    category: FindingCategory::Ssh,
    severity: Severity::Medium,
    remediation: "Remove weak ciphers from SSH configuration",
    compliance: &[("CIS", "5.2.11")],
};

// --- System configuration ---

pub static SYS_SHADOW_PERMISSIONS: FindingDetail = FindingDetail {
    code: "SYS_SHADOW_PERMISSIONS",
    category: FindingCategory::System,
    severity: Severity::High,
    remediation: "Run: chmod 640 /etc/shadow",
    compliance: &[("CIS", "6.1.3"), ("NIST", "AC-3")],
};

pub static SYS_EMPTY_PASSWORDS: FindingDetail = FindingDetail {
    code: "SYS_EMPTY_PASSWORDS",
    category: FindingCategory::System,
    severity: Severity::Critical,
    remediation: "Set passwords for all users",
    compliance: &[("CIS", "5.4.1.1"), ("NIST", "IA-5")],
};

pub static SYS_WORLD_WRITABLE: FindingDetail = FindingDetail {
    code: "SYS_WORLD_WRITABLE",
    category: FindingCategory::System,
    severity: Severity::Medium,
    remediation: "Review and fix file permissions",
    compliance: &[("CIS", "6.1.10"), ("NIST", "AC-3")],
};
