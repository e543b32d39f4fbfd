// src/core/scanner/port_prober.rs

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::core::error::{AuditError, AuditResult};
use crate::core::knowledge_base;
use crate::core::models::Finding;

/// Well-known port to service name.
static COMMON_SERVICES: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (21, "FTP"),
        (22, "SSH"),
        (23, "Telnet"),
        (25, "SMTP"),
        (53, "DNS"),
        (80, "HTTP"),
        (110, "POP3"),
        (135, "MSRPC"),
        (139, "NetBIOS"),
        (143, "IMAP"),
        (443, "HTTPS"),
        (445, "SMB"),
        (993, "IMAPS"),
        (995, "POP3S"),
        (1433, "MSSQL"),
        (1521, "Oracle"),
        (3306, "MySQL"),
        (3389, "RDP"),
        (5432, "PostgreSQL"),
        (5985, "WinRM"),
        (5986, "WinRM-HTTPS"),
        (6379, "Redis"),
        (8080, "HTTP-Alt"),
        (8443, "HTTPS-Alt"),
        (9200, "Elasticsearch"),
        (11211, "Memcached"),
        (27017, "MongoDB"),
    ])
});

const STANDARD_SSH_PORT: u16 = 22;
const FILE_SHARING_PORTS: [u16; 3] = [135, 139, 445];
const DATABASE_PORTS: [u16; 4] = [3306, 5432, 1433, 1521];

/// Tests TCP reachability of many ports with a bounded number of
/// simultaneous connection attempts.
#[derive(Debug, Clone)]
pub struct PortProber {
    host: String,
    timeout: Duration,
    concurrency: usize,
}

impl PortProber {
    /// `timeout` applies to each connect attempt. `concurrency` must be at
    /// least 1.
    pub fn new(host: impl Into<String>, timeout: Duration, concurrency: usize) -> AuditResult<Self> {
        if concurrency == 0 {
            return Err(AuditError::Configuration("probe concurrency must be at least 1".into()));
        }
        Ok(Self { host: host.into(), timeout, concurrency })
    }

    /// Returns the open subset of `ports`, sorted ascending and without
    /// duplicates.
    ///
    /// Ports are probed in batches of at most `concurrency`; every attempt in a
    /// batch finishes before the next batch starts. Refused, unreachable and
    /// timed-out ports all count as closed. The only error is a probe task that
    /// panicked.
    pub async fn probe(&self, ports: &[u16]) -> AuditResult<Vec<u16>> {
        let host = self.host.clone();
        let timeout = self.timeout;
        self.probe_with(ports, move |port| {
            let host = host.clone();
            async move { is_port_open(&host, port, timeout).await }
        })
        .await
    }

    async fn probe_with<F, Fut>(&self, ports: &[u16], attempt: F) -> AuditResult<Vec<u16>>
    where
        F: Fn(u16) -> Fut,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let candidates: Vec<u16> = ports.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        info!(host = %self.host, ports = candidates.len(), concurrency = self.concurrency, "Probing ports.");

        let mut open_ports = Vec::new();
        for batch in candidates.chunks(self.concurrency) {
            let mut attempts = JoinSet::new();
            for &port in batch {
                let check = attempt(port);
                attempts.spawn(async move { (port, check.await) });
            }

            while let Some(joined) = attempts.join_next().await {
                let (port, open) = joined.map_err(|e| AuditError::Connection(format!("port probe task failed: {}", e)))?;
                if open {
                    debug!(port, "Port is open.");
                    open_ports.push(port);
                }
            }
        }

        open_ports.sort_unstable();
        info!(host = %self.host, open = ?open_ports, "Port probe finished.");
        Ok(open_ports)
    }
}

/// A port is open when a TCP connect completes within `timeout`.
async fn is_port_open(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(tokio::time::timeout(timeout, TcpStream::connect((host, port))).await, Ok(Ok(_)))
}

/// Names the service behind an open port. The port used for the SSH session
/// wins over the lookup table when it is not 22.
pub fn identify_service(port: u16, auth_port: u16) -> String {
    if port == auth_port && port != STANDARD_SSH_PORT {
        return format!("SSH (non-standard port {})", port);
    }
    COMMON_SERVICES
        .get(&port)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Unknown service on port {}", port))
}

/// Turns the open ports into findings, one per matching port, first matching
/// rule wins. The non-standard SSH port is never reported as a problem.
pub fn classify_open_ports(open_ports: &[u16], auth_port: u16) -> Vec<Finding> {
    let mut findings = Vec::new();

    for &port in open_ports {
        let service = identify_service(port, auth_port);
        let finding = match port {
            23 => Some(knowledge_base::NET_TELNET.finding(format!("Telnet service running on port {}", port))),
            p if FILE_SHARING_PORTS.contains(&p) => Some(
                knowledge_base::NET_FILE_SHARING.finding(format!("Windows file sharing port {} open ({})", port, service)),
            ),
            21 => Some(knowledge_base::NET_FTP.finding(format!("FTP service running on port {}", port))),
            3389 => Some(knowledge_base::NET_RDP.finding(format!("RDP service running on port {}", port))),
            p if DATABASE_PORTS.contains(&p) => Some(
                knowledge_base::NET_DATABASE.finding(format!("Database service exposed on port {} ({})", port, service)),
            ),
            6379 => Some(
                knowledge_base::NET_REDIS.finding(format!("Redis service on port {} - often unsecured by default", port)),
            ),
            27017 => Some(knowledge_base::NET_MONGODB.finding(format!("MongoDB service on port {}", port))),
            STANDARD_SSH_PORT => Some(
                knowledge_base::NET_SSH_STANDARD_PORT.finding(format!("SSH service detected on standard port {}", port)),
            ),
            p if p == auth_port => None,
            _ => Some(
                knowledge_base::NET_UNKNOWN_SERVICE.finding(format!("Unknown service detected: {} on port {}", service, port)),
            ),
        };
        findings.extend(finding);
    }

    if !findings.is_empty() {
        return findings;
    }

    if open_ports.is_empty() {
        findings.push(knowledge_base::NET_NO_SERVICES.finding("No services detected on common ports"));
    } else if open_ports == [auth_port] && auth_port != STANDARD_SSH_PORT {
        findings.push(
            knowledge_base::NET_ONLY_NONSTANDARD_SSH
                .finding(format!("Only remote-access detected on non-standard port {}", auth_port)),
        );
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{FindingCategory, Severity};
    use std::net::TcpListener;

    fn levels(findings: &[Finding]) -> Vec<Severity> {
        findings.iter().map(|f| f.level).collect()
    }

    #[test]
    fn only_nonstandard_ssh_port_is_a_positive_signal() {
        let findings = classify_open_ports(&[2200], 2200);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].level, Severity::Low);
        assert_eq!(findings[0].category, FindingCategory::Network);
        assert_eq!(findings[0].issue, "Only remote-access detected on non-standard port 2200");
    }

    #[test]
    fn no_open_ports_reports_quiet_surface() {
        let findings = classify_open_ports(&[], 2222);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, "No services detected on common ports");
    }

    #[test]
    fn nonstandard_ssh_port_is_never_flagged_next_to_other_services() {
        let findings = classify_open_ports(&[80, 2222], 2222);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, "Unknown service detected: HTTP on port 80");
    }

    #[test]
    fn severities_follow_the_port_policy() {
        let findings = classify_open_ports(&[21, 22, 23, 445, 3306, 3389, 6379, 27017], 22);
        assert_eq!(
            levels(&findings),
            vec![
                Severity::High,
                Severity::Low,
                Severity::Critical,
                Severity::High,
                Severity::High,
                Severity::Medium,
                Severity::High,
                Severity::High,
            ]
        );
        assert_eq!(findings[3].issue, "Windows file sharing port 445 open (SMB)");
        assert_eq!(findings[4].issue, "Database service exposed on port 3306 (MySQL)");
        assert_eq!(findings[2].compliance.get("NIST").map(String::as_str), Some("SC-8"));
    }

    #[test]
    fn standard_ssh_alone_is_informational_not_fallback() {
        let findings = classify_open_ports(&[22], 22);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, "SSH service detected on standard port 22");
    }

    #[test]
    fn service_names_prefer_the_session_port() {
        assert_eq!(identify_service(2222, 2222), "SSH (non-standard port 2222)");
        assert_eq!(identify_service(22, 22), "SSH");
        assert_eq!(identify_service(6379, 22), "Redis");
        assert_eq!(identify_service(4444, 22), "Unknown service on port 4444");
    }

    #[test]
    fn zero_concurrency_is_a_configuration_error() {
        assert!(matches!(
            PortProber::new("127.0.0.1", Duration::from_secs(1), 0),
            Err(AuditError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn probe_returns_sorted_unique_subset() {
        let listeners: Vec<TcpListener> = (0..3).map(|_| TcpListener::bind("127.0.0.1:0").unwrap()).collect();
        let mut open: Vec<u16> = listeners.iter().map(|l| l.local_addr().unwrap().port()).collect();

        let closed = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };

        let mut candidates = vec![open[2], closed, open[0], open[1], open[0]];
        candidates.push(open[2]);

        let prober = PortProber::new("127.0.0.1", Duration::from_millis(500), 2).unwrap();
        let found = prober.probe(&candidates).await.unwrap();

        open.sort_unstable();
        assert_eq!(found, open);
        assert!(found.windows(2).all(|w| w[0] < w[1]));
        assert!(found.iter().all(|p| candidates.contains(p)));
    }

    #[tokio::test]
    async fn attempts_never_exceed_concurrency_and_batches_do_not_overlap() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{Arc, Mutex};

        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        // (port, started) in the order attempts begin and end.
        let timeline = Arc::new(Mutex::new(Vec::<(u16, bool)>::new()));

        let prober = PortProber::new("127.0.0.1", Duration::from_millis(500), 2).unwrap();
        let open = {
            let (in_flight, max_in_flight, timeline) = (in_flight.clone(), max_in_flight.clone(), timeline.clone());
            prober
                .probe_with(&[6, 1, 5, 2, 4, 3, 1], move |port| {
                    let (in_flight, max_in_flight, timeline) =
                        (in_flight.clone(), max_in_flight.clone(), timeline.clone());
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        max_in_flight.fetch_max(now, Ordering::SeqCst);
                        timeline.lock().unwrap().push((port, true));
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        timeline.lock().unwrap().push((port, false));
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        port % 2 == 0
                    }
                })
                .await
                .unwrap()
        };

        assert_eq!(open, vec![2, 4, 6]);
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 2);

        // Sorted candidates 1..=6 form batches {1,2}, {3,4}, {5,6}.
        let batch_of = |port: u16| (port - 1) / 2;
        let timeline = timeline.lock().unwrap();
        assert_eq!(timeline.len(), 12);
        let position = |event: (u16, bool)| timeline.iter().position(|e| *e == event).unwrap();
        for port in 1..=6u16 {
            for earlier in (1..=6u16).filter(|p| batch_of(*p) < batch_of(port)) {
                assert!(
                    position((earlier, false)) < position((port, true)),
                    "port {} started before port {} finished",
                    port,
                    earlier
                );
            }
        }
    }

    #[tokio::test]
    async fn unresolvable_host_reports_everything_closed() {
        let prober = PortProber::new("host.invalid", Duration::from_millis(300), 50).unwrap();
        assert!(prober.probe(&[22, 80]).await.unwrap().is_empty());
    }
}
