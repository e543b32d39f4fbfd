// src/config.rs

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{AuditError, AuditResult};

/// Runtime settings, read from `WARDEN_*` environment variables
/// (optionally seeded from a `.env` file).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AuditConfig {
    /// Per-port TCP connect timeout.
    pub probe_timeout_secs: u64,
    /// Upper bound on simultaneous outbound probe connections.
    pub probe_concurrency: usize,
    /// Socket timeout for the SSH session.
    pub ssh_timeout_secs: u64,
    /// Overrides the platform data directory for logs and scan history.
    pub data_dir: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: 3,
            probe_concurrency: 50,
            ssh_timeout_secs: 10,
            data_dir: None,
        }
    }
}

impl AuditConfig {
    pub fn from_env() -> AuditResult<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("WARDEN").try_parsing(true))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AuditResult<()> {
        if self.probe_concurrency == 0 {
            return Err(AuditError::Configuration("probe_concurrency must be at least 1".into()));
        }
        if self.probe_timeout_secs == 0 || self.ssh_timeout_secs == 0 {
            return Err(AuditError::Configuration("timeouts must be at least one second".into()));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn ssh_timeout(&self) -> Duration {
        Duration::from_secs(self.ssh_timeout_secs)
    }
}
