// src/core/mod.rs

// The audit engine: everything below is independent of the terminal UI.

pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod history;

/// Contains the business logic for turning raw observations into findings
/// with remediation advice and compliance references.
pub mod knowledge_base;

/// Data structures shared across the engine and the dashboard, such as
/// `Finding`, `ScanReport` and `ScanRequest`.
pub mod models;

/// Houses the scan modules and the orchestrator that runs them in order.
pub mod scanner;

pub mod session;
pub mod store;
pub mod worker;
