//! The built-in system authentication realm type.

use std::sync::Arc;

use rg_model::realm::BUILTIN_SYSTEM;
use rg_model::Realm;

use crate::error::{SpiError, SpiResult};
use crate::plugin::RealmPlugin;

/// Seam to the host's authentication stack (PAM or equivalent); the
/// plugin only routes credential checks to it.
pub trait SystemAuthenticator: Send + Sync {
    /// Verifies a password for `username` against the system.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Authenticator that rejects every credential; stands in where no
/// system authentication stack is wired up (tests, stripped-down
/// tooling).
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAllAuthenticator;

impl SystemAuthenticator for DenyAllAuthenticator {
    fn verify(&self, _username: &str, _password: &str) -> bool {
        false
    }
}

/// Plugin for the built-in `pam` realm. System accounts are managed
/// outside this registry, so only `authenticate` is overridden:
/// password storage keeps the unsupported default and user deletion
/// stays a no-op.
pub struct SystemAuthPlugin {
    system: Arc<dyn SystemAuthenticator>,
}

impl SystemAuthPlugin {
    /// Creates the plugin over a system authenticator.
    #[must_use]
    pub fn new(system: Arc<dyn SystemAuthenticator>) -> Self {
        Self { system }
    }
}

impl RealmPlugin for SystemAuthPlugin {
    fn kind(&self) -> &'static str {
        BUILTIN_SYSTEM
    }

    fn authenticate(&self, realm: &Realm, username: &str, password: &str) -> SpiResult<()> {
        if self.system.verify(username, password) {
            Ok(())
        } else {
            tracing::debug!(realm = %realm.id, user = %username, "system authentication failed");
            Err(SpiError::AuthFailure)
        }
    }
}
