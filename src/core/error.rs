// src/core/error.rs

use thiserror::Error;

/// Every failure the audit engine can produce.
///
/// Connection, authentication and command failures are caught at the scan
/// module boundary and turned into `ERROR` findings. Configuration failures
/// stop module construction. Persistence failures and coordinator rejections
/// are returned to whoever triggered the operation, as is a
/// submission to a worker that has shut down.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("Scan already running")]
    AlreadyRunning,

    #[error("scan worker is not available")]
    WorkerUnavailable,
}

impl From<serde_json::Error> for AuditError {
    fn from(e: serde_json::Error) -> Self {
        AuditError::Persistence(format!("invalid JSON document: {}", e))
    }
}

impl From<config::ConfigError> for AuditError {
    fn from(e: config::ConfigError) -> Self {
        AuditError::Configuration(e.to_string())
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
