// src/app.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use ratatui::widgets::ListState;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::core::models::{Credential, RunStatus, ScanReport, ScanRequest, Severity, Target};

pub const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

/// Which panel receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Form,
    Findings,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FormField {
    Host,
    Port,
    Username,
    Secret,
    #[strum(serialize = "Target Name")]
    TargetName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AuthMethod {
    Password,
    #[strum(serialize = "Key File")]
    KeyFile,
}

/// The target form, pre-filled with the lab defaults.
#[derive(Debug, Clone)]
pub struct TargetForm {
    pub host: String,
    pub port: String,
    pub username: String,
    pub secret: String,
    pub target_name: String,
    pub auth: AuthMethod,
    pub focus: FormField,
}

impl Default for TargetForm {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: "2222".into(),
            username: "root".into(),
            secret: String::new(),
            target_name: "Custom Target".into(),
            auth: AuthMethod::Password,
            focus: FormField::Host,
        }
    }
}

impl TargetForm {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Host => &self.host,
            FormField::Port => &self.port,
            FormField::Username => &self.username,
            FormField::Secret => &self.secret,
            FormField::TargetName => &self.target_name,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Host => &mut self.host,
            FormField::Port => &mut self.port,
            FormField::Username => &mut self.username,
            FormField::Secret => &mut self.secret,
            FormField::TargetName => &mut self.target_name,
        }
    }

    pub fn push(&mut self, c: char) {
        self.value_mut().push(c);
    }

    pub fn pop(&mut self) {
        self.value_mut().pop();
    }

    pub fn next_field(&mut self) {
        let fields: Vec<FormField> = FormField::iter().collect();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields: Vec<FormField> = FormField::iter().collect();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + fields.len() - 1) % fields.len()];
    }

    pub fn toggle_auth(&mut self) {
        self.auth = match self.auth {
            AuthMethod::Password => AuthMethod::KeyFile,
            AuthMethod::KeyFile => AuthMethod::Password,
        };
    }

    /// Builds the scan request. Malformed or missing input is rejected here
    /// so it shows up as a notice; credentials the target refuses surface as
    /// findings in the report.
    pub fn to_request(&self) -> Result<ScanRequest, String> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err("Host is required".into());
        }
        let port: u16 = self.port.trim().parse().map_err(|_| "Invalid port number".to_string())?;
        if self.secret.trim().is_empty() {
            return Err(format!("{} is required", self.auth));
        }
        let credential = match self.auth {
            AuthMethod::Password => Credential::Password(self.secret.clone()),
            AuthMethod::KeyFile => Credential::KeyFile(PathBuf::from(self.secret.trim())),
        };
        Ok(ScanRequest {
            target: Target { host: host.to_string(), port, target_name: self.target_name.trim().to_string() },
            username: self.username.trim().to_string(),
            credential,
        })
    }
}

/// Per-severity counts and a 0-100 posture score for the shown report.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanSummary {
    pub score: u8,
    pub counts: BTreeMap<Severity, usize>,
}

impl ScanSummary {
    pub fn from_report(report: &ScanReport) -> Self {
        let counts: BTreeMap<Severity, usize> = Severity::iter().map(|s| (s, report.count_by_level(s))).collect();
        let penalty: usize = counts
            .iter()
            .map(|(severity, n)| {
                n * match severity {
                    Severity::Critical => 15,
                    Severity::High => 10,
                    Severity::Medium => 5,
                    Severity::Low | Severity::Error => 0,
                }
            })
            .sum();
        Self { score: 100usize.saturating_sub(penalty) as u8, counts }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.counts.get(&severity).copied().unwrap_or(0)
    }

    pub fn issues(&self) -> usize {
        self.count(Severity::Critical) + self.count(Severity::High) + self.count(Severity::Medium)
    }
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub show_disclaimer: bool,
    pub pane: Pane,
    pub form: TargetForm,
    pub report: Option<ScanReport>,
    pub viewing_historical: bool,
    pub summary: ScanSummary,
    pub findings_state: ListState,
    pub history: Vec<ScanReport>,
    pub history_state: ListState,
    pub status: RunStatus,
    pub notice: Option<String>,
    pub spinner_frame: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Idle,
            show_disclaimer: true,
            pane: Pane::Form,
            form: TargetForm::default(),
            report: None,
            viewing_historical: false,
            summary: ScanSummary::default(),
            findings_state: ListState::default(),
            history: Vec::new(),
            history_state: ListState::default(),
            status: RunStatus::default(),
            notice: None,
            spinner_frame: 0,
        }
    }

    /// Shows a report; `historical` marks one picked from the ledger.
    pub fn show_report(&mut self, report: ScanReport, historical: bool) {
        self.summary = ScanSummary::from_report(&report);
        self.findings_state = ListState::default();
        if !report.findings.is_empty() {
            self.findings_state.select(Some(0));
        }
        self.report = Some(report);
        self.viewing_historical = historical;
        self.state = AppState::Finished;
    }

    /// Replaces the history list, keeping the selection when it is still in range.
    pub fn set_history(&mut self, entries: Vec<ScanReport>) {
        let selected = self.history_state.selected().filter(|i| *i < entries.len());
        self.history = entries;
        self.history_state.select(selected.or(if self.history.is_empty() { None } else { Some(0) }));
    }

    pub fn selected_history_id(&self) -> Option<String> {
        self.history_state.selected().and_then(|i| self.history.get(i)).and_then(|r| r.scan_id.clone())
    }

    pub fn next_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Form => Pane::Findings,
            Pane::Findings => Pane::History,
            Pane::History => Pane::Form,
        };
    }

    pub fn scroll_up(&mut self) {
        match self.pane {
            Pane::Findings => self.findings_state.select_previous(),
            Pane::History => self.history_state.select_previous(),
            Pane::Form => self.form.prev_field(),
        }
    }

    pub fn scroll_down(&mut self) {
        match self.pane {
            Pane::Findings => {
                let len = self.report.as_ref().map_or(0, |r| r.findings.len());
                select_next(&mut self.findings_state, len);
            }
            Pane::History => select_next(&mut self.history_state, self.history.len()),
            Pane::Form => self.form.next_field(),
        }
    }

    pub fn on_tick(&mut self, status: RunStatus) {
        self.status = status;
        if status.running {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn select_next(state: &mut ListState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let next = state.selected().map_or(0, |i| (i + 1).min(len - 1));
    state.select(Some(next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Finding, FindingCategory};

    #[test]
    fn form_defaults_build_a_password_request() {
        let mut form = TargetForm::default();
        form.secret = "password".into();
        let request = form.to_request().unwrap();

        assert_eq!(request.target.display_name(), "Custom Target (localhost:2222)");
        assert_eq!(request.username, "root");
        assert_eq!(request.credential, Credential::Password("password".into()));
    }

    #[test]
    fn bad_port_is_rejected() {
        let form = TargetForm { port: "22a".into(), ..Default::default() };
        assert_eq!(form.to_request().unwrap_err(), "Invalid port number");
        let form = TargetForm { port: "70000".into(), ..Default::default() };
        assert!(form.to_request().is_err());
    }

    #[test]
    fn empty_secret_is_rejected_before_submitting() {
        let form = TargetForm::default();
        assert_eq!(form.to_request().unwrap_err(), "Password is required");

        let mut form = TargetForm { secret: "   ".into(), ..Default::default() };
        form.toggle_auth();
        assert_eq!(form.to_request().unwrap_err(), "Key File is required");
    }

    #[test]
    fn key_file_mode_uses_the_secret_as_a_path() {
        let mut form = TargetForm::default();
        form.toggle_auth();
        form.secret = " /home/me/.ssh/id_ed25519 ".into();
        let request = form.to_request().unwrap();
        assert_eq!(request.credential, Credential::KeyFile(PathBuf::from("/home/me/.ssh/id_ed25519")));
    }

    #[test]
    fn field_focus_wraps_around() {
        let mut form = TargetForm::default();
        form.prev_field();
        assert_eq!(form.focus, FormField::TargetName);
        form.next_field();
        assert_eq!(form.focus, FormField::Host);
        form.push('x');
        assert_eq!(form.host, "localhostx");
    }

    #[test]
    fn score_ignores_low_and_error_findings() {
        let target = Target { host: "h".into(), port: 22, target_name: "t".into() };
        let findings = vec![
            Finding::new(Severity::Critical, FindingCategory::Ssh, "a", ""),
            Finding::new(Severity::High, FindingCategory::System, "b", ""),
            Finding::new(Severity::Low, FindingCategory::Network, "c", ""),
            Finding::error(FindingCategory::Ssh, "d"),
        ];
        let summary = ScanSummary::from_report(&ScanReport::new(target, findings));

        assert_eq!(summary.score, 75);
        assert_eq!(summary.count(Severity::Error), 1);
        assert_eq!(summary.issues(), 2);
    }
}
