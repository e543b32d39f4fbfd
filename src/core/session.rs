// src/core/session.rs

use ssh2::Session;
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::credentials::validate_credential;
use crate::core::error::{AuditError, AuditResult};
use crate::core::models::{Credential, ScanRequest};

/// Captured output of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// An authenticated command channel to the audited host.
pub trait RemoteShell {
    fn execute(&mut self, command: &str) -> AuditResult<CommandOutput>;
    fn disconnect(&mut self);
}

/// Opens remote shells. Implementations are shared across the blocking
/// scan tasks, hence `Send + Sync`.
pub trait Connector: Send + Sync {
    fn connect(&self, request: &ScanRequest) -> AuditResult<Box<dyn RemoteShell>>;
}

/// Connector backed by libssh2.
pub struct SshConnector {
    timeout: Duration,
}

impl SshConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn open_session(&self, host: &str, port: u16) -> AuditResult<Session> {
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| AuditError::Connection(format!("cannot resolve {}: {}", host, e)))?
            .next()
            .ok_or_else(|| AuditError::Connection(format!("no address found for {}", host)))?;

        debug!(%addr, "Opening TCP stream for SSH.");
        let tcp = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| AuditError::Connection(format!("failed to connect to {}: {}", addr, e)))?;
        tcp.set_read_timeout(Some(self.timeout))
            .and_then(|_| tcp.set_write_timeout(Some(self.timeout)))
            .map_err(|e| AuditError::Connection(e.to_string()))?;

        let mut session = Session::new().map_err(|e| AuditError::Connection(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(session_timeout_millis(self.timeout));
        session
            .handshake()
            .map_err(|e| AuditError::Connection(format!("SSH handshake failed: {}", e)))?;
        Ok(session)
    }
}

/// libssh2 takes the timeout in milliseconds as a `u32`, where 0 disables it.
/// Oversized values are clamped rather than wrapped.
fn session_timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

impl Connector for SshConnector {
    fn connect(&self, request: &ScanRequest) -> AuditResult<Box<dyn RemoteShell>> {
        let target = &request.target;
        // Re-checked here so a key file removed after module construction still
        // fails as a configuration problem.
        let key_kind = validate_credential(&request.credential)?;
        let session = self.open_session(&target.host, target.port)?;

        let auth = match &request.credential {
            Credential::Password(secret) => session.userauth_password(&request.username, secret),
            Credential::KeyFile(path) => session.userauth_pubkey_file(&request.username, None, path, None),
        };
        auth.map_err(|e| AuditError::Authentication(e.to_string()))?;

        if !session.authenticated() {
            return Err(AuditError::Authentication(format!("server rejected credentials for {}", request.username)));
        }

        info!(host = %target.host, port = target.port, user = %request.username, key_kind = ?key_kind, "SSH session established.");
        Ok(Box::new(SshShell { session }))
    }
}

struct SshShell {
    session: Session,
}

impl RemoteShell for SshShell {
    fn execute(&mut self, command: &str) -> AuditResult<CommandOutput> {
        let command_error = |reason: String| AuditError::Command { command: command.to_string(), reason };

        let mut channel = self.session.channel_session().map_err(|e| command_error(e.to_string()))?;
        channel.exec(command).map_err(|e| command_error(e.to_string()))?;

        let mut stdout = Vec::new();
        channel.read_to_end(&mut stdout).map_err(|e| command_error(e.to_string()))?;
        let mut stderr = Vec::new();
        channel.stderr().read_to_end(&mut stderr).map_err(|e| command_error(e.to_string()))?;
        channel.wait_close().map_err(|e| command_error(e.to_string()))?;

        if let Ok(status) = channel.exit_status() {
            if status != 0 {
                debug!(command, status, "Remote command exited with non-zero status.");
            }
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    fn disconnect(&mut self) {
        if let Err(e) = self.session.disconnect(None, "audit complete", None) {
            warn!(error = %e, "SSH disconnect did not complete cleanly.");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted stand-ins for the SSH collaborator.

    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Replies to known commands with canned stdout; unknown commands fail.
    #[derive(Clone, Default)]
    pub struct ScriptedConnector {
        pub responses: HashMap<String, String>,
        pub refuse_with: Option<String>,
        /// Number of initial connection attempts to refuse before succeeding.
        pub refuse_first: usize,
        pub connects: Arc<Mutex<usize>>,
        pub disconnects: Arc<Mutex<usize>>,
    }

    impl ScriptedConnector {
        pub fn with(mut self, command: &str, stdout: &str) -> Self {
            self.responses.insert(command.to_string(), stdout.to_string());
            self
        }

        pub fn refusing(reason: &str) -> Self {
            Self { refuse_with: Some(reason.to_string()), ..Default::default() }
        }

        pub fn refusing_first(mut self, attempts: usize, reason: &str) -> Self {
            self.refuse_with = Some(reason.to_string());
            self.refuse_first = attempts;
            self
        }
    }

    impl Connector for ScriptedConnector {
        fn connect(&self, _request: &ScanRequest) -> AuditResult<Box<dyn RemoteShell>> {
            let attempt = {
                let mut connects = self.connects.lock().unwrap();
                *connects += 1;
                *connects
            };
            if let Some(reason) = &self.refuse_with {
                if self.refuse_first == 0 || attempt <= self.refuse_first {
                    return Err(AuditError::Connection(reason.clone()));
                }
            }
            Ok(Box::new(ScriptedShell { responses: self.responses.clone(), disconnects: self.disconnects.clone() }))
        }
    }

    struct ScriptedShell {
        responses: HashMap<String, String>,
        disconnects: Arc<Mutex<usize>>,
    }

    impl RemoteShell for ScriptedShell {
        fn execute(&mut self, command: &str) -> AuditResult<CommandOutput> {
            self.responses
                .get(command)
                .map(|stdout| CommandOutput { stdout: stdout.clone(), stderr: String::new() })
                .ok_or_else(|| AuditError::Command { command: command.to_string(), reason: "channel closed".into() })
        }

        fn disconnect(&mut self) {
            *self.disconnects.lock().unwrap() += 1;
        }
    }
}
