// src/ui/widgets/mod.rs

pub mod analysis_view; // Findings list and details for the shown report.
pub mod disclaimer_popup;
pub mod footer;
pub mod history; // Ledger entries, newest first.
pub mod input; // The target form.
pub mod summary;
