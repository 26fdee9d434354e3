//! Shared-secret admin gate
//!
//! Only a SHA-256 digest of the configured secret is held in memory.
//! Comparison runs over the full digest regardless of where the first
//! mismatch is.

use crate::error::{AppError, Result};
use sha2::{Digest, Sha256};

/// Authorizes pricing-config writes against a single shared secret
#[derive(Clone)]
pub struct AdminGate {
    digest: Option<[u8; 32]>,
}

impl AdminGate {
    /// Build a gate from the configured secret; an empty or missing secret
    /// leaves the gate closed to everyone.
    pub fn new(secret: Option<&str>) -> Self {
        let digest = secret
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::hash);

        let gate = Self { digest };
        match gate.fingerprint() {
            Some(fp) => tracing::debug!(fingerprint = %fp, "Admin gate enabled"),
            None => tracing::warn!("ADMIN_PASSWORD is not set; pricing config updates are disabled"),
        }
        gate
    }

    fn hash(secret: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hasher.finalize().into()
    }

    /// Hex digest of the configured secret, for diagnostics only
    pub fn fingerprint(&self) -> Option<String> {
        self.digest.map(|d| hex::encode(&d[..4]))
    }

    /// Is a secret configured at all?
    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    /// Check a presented credential
    pub fn authorize(&self, credential: Option<&str>) -> Result<()> {
        let expected = self
            .digest
            .ok_or_else(|| AppError::Unauthorized("Admin updates are disabled".to_string()))?;

        let presented = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing admin password".to_string()))?;

        let actual = Self::hash(presented);
        let diff = expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Invalid admin password".to_string()))
        }
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
