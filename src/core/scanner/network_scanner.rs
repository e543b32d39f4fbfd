// src/core/scanner/network_scanner.rs

use tracing::{error, info};

use super::port_prober::{PortProber, classify_open_ports};
use crate::config::AuditConfig;
use crate::core::error::AuditResult;
use crate::core::models::{Finding, FindingCategory, Target};

/// Services that should almost never face an untrusted network.
const CRITICAL_PORTS: [u16; 10] = [21, 23, 135, 139, 445, 1433, 1521, 3389, 5432, 3306];
/// Everyday services.
const COMMON_PORTS: [u16; 11] = [22, 25, 53, 80, 110, 143, 443, 993, 995, 8080, 8443];
/// Data stores and management endpoints that are often left unauthenticated.
const HIGH_RISK_PORTS: [u16; 6] = [6379, 27017, 5985, 5986, 9200, 11211];

/// The fixed candidate set plus the port the SSH session uses.
pub fn candidate_ports(auth_port: u16) -> Vec<u16> {
    let mut ports: Vec<u16> = CRITICAL_PORTS.iter().chain(&COMMON_PORTS).chain(&HIGH_RISK_PORTS).copied().collect();
    if !ports.contains(&auth_port) {
        ports.push(auth_port);
    }
    ports
}

/// Probes the exposed network surface. Needs no SSH session.
pub struct NetworkScanner {
    target: Target,
    prober: PortProber,
    ports: Vec<u16>,
}

impl NetworkScanner {
    /// Fails only when the configured concurrency is zero.
    pub fn new(target: Target, config: &AuditConfig) -> AuditResult<Self> {
        let prober = PortProber::new(target.host.clone(), config.probe_timeout(), config.probe_concurrency)?;
        let ports = candidate_ports(target.port);
        Ok(Self { target, prober, ports })
    }

    #[cfg(test)]
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    /// Checks every candidate port and turns the open ones into findings.
    /// Needs no SSH session.
    pub async fn scan(&self) -> Vec<Finding> {
        info!(host = %self.target.host, ports = self.ports.len(), "Starting network scan.");
        let findings = match self.prober.probe(&self.ports).await {
            Ok(open_ports) => classify_open_ports(&open_ports, self.target.port),
            Err(e) => {
                error!(error = %e, "Network scan failed.");
                vec![Finding::error(FindingCategory::Network, format!("Network scan failed: {}", e))]
            }
        };
        info!(findings = findings.len(), "Network scan finished.");
        findings
    }
}
