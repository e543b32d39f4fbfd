// src/core/credentials.rs

use base64::{Engine as _, engine::general_purpose::STANDARD};
use strum::Display;
use tracing::{debug, warn};

use crate::core::error::{AuditError, AuditResult};
use crate::core::models::Credential;

/// Private key algorithms the session can authenticate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum KeyKind {
    Rsa,
    Ed25519,
    Ecdsa,
}

/// Order in which a key file is matched against the supported algorithms.
const KEY_FALLBACK_ORDER: [KeyKind; 3] = [KeyKind::Rsa, KeyKind::Ed25519, KeyKind::Ecdsa];

impl KeyKind {
    /// Label of the legacy algorithm-specific PEM envelope, if there is one.
    fn legacy_pem_label(self) -> Option<&'static str> {
        match self {
            KeyKind::Rsa => Some("RSA PRIVATE KEY"),
            KeyKind::Ecdsa => Some("EC PRIVATE KEY"),
            KeyKind::Ed25519 => None,
        }
    }

    /// Key type string embedded in an `openssh-key-v1` blob.
    fn openssh_marker(self) -> &'static [u8] {
        match self {
            KeyKind::Rsa => b"ssh-rsa",
            KeyKind::Ed25519 => b"ssh-ed25519",
            KeyKind::Ecdsa => b"ecdsa-sha2-",
        }
    }

    /// DER-encoded algorithm OID found in a PKCS#8 `PRIVATE KEY` body.
    fn pkcs8_oid(self) -> &'static [u8] {
        match self {
            // 1.2.840.113549.1.1.1
            KeyKind::Rsa => &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01],
            // 1.3.101.112
            KeyKind::Ed25519 => &[0x2b, 0x65, 0x70],
            // 1.2.840.10045.2.1
            KeyKind::Ecdsa => &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01],
        }
    }

    fn matches(self, envelope: &PemEnvelope) -> bool {
        if self.legacy_pem_label() == Some(envelope.label.as_str()) {
            return true;
        }
        match envelope.label.as_str() {
            "OPENSSH PRIVATE KEY" => contains(&envelope.body, self.openssh_marker()),
            "PRIVATE KEY" => contains(&envelope.body, self.pkcs8_oid()),
            _ => false,
        }
    }
}

struct PemEnvelope {
    label: String,
    body: Vec<u8>,
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn parse_pem(text: &str) -> AuditResult<PemEnvelope> {
    let mut lines = text.lines().map(str::trim).skip_while(|l| !l.starts_with("-----BEGIN "));
    let label = lines
        .next()
        .and_then(|l| l.strip_prefix("-----BEGIN "))
        .and_then(|l| l.strip_suffix("-----"))
        .ok_or_else(|| AuditError::Configuration("key file is not PEM encoded".into()))?
        .to_string();

    let encoded: String = lines
        .take_while(|l| !l.starts_with("-----END "))
        // Legacy encrypted PEM carries "Proc-Type:"/"DEK-Info:" headers.
        .filter(|l| !l.contains(':'))
        .collect();
    let body = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| AuditError::Configuration(format!("key file body is not valid base64: {}", e)))?;

    Ok(PemEnvelope { label, body })
}

/// Determines which algorithm a private key file holds, trying RSA, then
/// Ed25519, then ECDSA.
pub fn classify_private_key(text: &str) -> AuditResult<KeyKind> {
    let envelope = parse_pem(text)?;
    for kind in KEY_FALLBACK_ORDER {
        if kind.matches(&envelope) {
            debug!(key_kind = %kind, label = %envelope.label, "Private key format recognized.");
            return Ok(kind);
        }
    }
    warn!(label = %envelope.label, "No supported key algorithm matched.");
    Err(AuditError::Configuration(format!("unsupported private key format ({})", envelope.label)))
}

/// Checks that the credential can actually be used before any connection is
/// attempted. A key file that cannot be read is never replaced by password
/// authentication.
pub fn validate_credential(credential: &Credential) -> AuditResult<Option<KeyKind>> {
    match credential {
        Credential::Password(secret) if secret.is_empty() => {
            Err(AuditError::Configuration("no password or key file provided".into()))
        }
        Credential::Password(_) => Ok(None),
        Credential::KeyFile(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                AuditError::Configuration(format!("cannot read key file {}: {}", path.display(), e))
            })?;
            classify_private_key(&text).map(Some)
        }
    }
}
