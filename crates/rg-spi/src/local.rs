//! The built-in cluster-local identity store realm type.

use std::sync::Arc;

use dashmap::DashMap;

use rg_model::realm::BUILTIN_LOCAL;
use rg_model::Realm;

use crate::error::{SpiError, SpiResult};
use crate::plugin::RealmPlugin;

/// Seam to the credential store backing the local realm.
///
/// Password hashing and verification mechanics live entirely behind
/// this trait; the plugin only routes operations to it.
pub trait CredentialStore: Send + Sync {
    /// Verifies a password for `username`.
    fn verify(&self, username: &str, password: &str) -> bool;

    /// Stores (replacing) the password for `username`.
    ///
    /// ## Errors
    ///
    /// Fails when the backing store cannot persist the credential.
    fn store(&self, username: &str, password: &str) -> SpiResult<()>;

    /// Removes any stored credential for `username`. Removing an absent
    /// user succeeds.
    ///
    /// ## Errors
    ///
    /// Fails when the backing store cannot persist the removal.
    fn remove(&self, username: &str) -> SpiResult<()>;
}

/// In-memory credential store, a test double for the real cluster-wide
/// store (which hashes; this one deliberately does not).
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: DashMap<String, String>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a credential is stored for `username`.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.entries.contains_key(username)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.entries
            .get(username)
            .is_some_and(|stored| stored.value() == password)
    }

    fn store(&self, username: &str, password: &str) -> SpiResult<()> {
        self.entries
            .insert(username.to_string(), password.to_string());
        Ok(())
    }

    fn remove(&self, username: &str) -> SpiResult<()> {
        self.entries.remove(username);
        Ok(())
    }
}

/// Plugin for the built-in `pve` realm: the only realm type backed by a
/// mutable cluster-local credential store, so it overrides the whole
/// contract.
pub struct LocalStorePlugin {
    credentials: Arc<dyn CredentialStore>,
}

impl LocalStorePlugin {
    /// Creates the plugin over a credential store.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }
}

impl RealmPlugin for LocalStorePlugin {
    fn kind(&self) -> &'static str {
        BUILTIN_LOCAL
    }

    fn authenticate(&self, realm: &Realm, username: &str, password: &str) -> SpiResult<()> {
        if self.credentials.verify(username, password) {
            Ok(())
        } else {
            tracing::debug!(realm = %realm.id, user = %username, "local authentication failed");
            Err(SpiError::AuthFailure)
        }
    }

    fn store_password(&self, _realm: &Realm, username: &str, password: &str) -> SpiResult<()> {
        self.credentials.store(username, password)
    }

    fn delete_user(&self, _realm: &Realm, username: &str) -> SpiResult<()> {
        self.credentials.remove(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rg_model::RealmId;

    fn setup() -> (LocalStorePlugin, Realm) {
        let store = Arc::new(MemoryCredentialStore::new());
        let plugin = LocalStorePlugin::new(store);
        let realm = Realm::new(RealmId::parse("pve").unwrap(), "pve");
        (plugin, realm)
    }

    #[test]
    fn stored_passwords_authenticate() {
        let (plugin, realm) = setup();
        plugin.store_password(&realm, "alice", "secret").unwrap();
        assert!(plugin.authenticate(&realm, "alice", "secret").is_ok());
    }

    #[test]
    fn wrong_password_and_unknown_user_fail_identically() {
        let (plugin, realm) = setup();
        plugin.store_password(&realm, "alice", "secret").unwrap();

        let wrong_password = plugin
            .authenticate(&realm, "alice", "nope")
            .unwrap_err()
            .to_string();
        let unknown_user = plugin
            .authenticate(&realm, "bob", "secret")
            .unwrap_err()
            .to_string();
        assert_eq!(wrong_password, unknown_user);
        assert_eq!(wrong_password, "authentication failed");
    }

    #[test]
    fn delete_user_removes_the_credential() {
        let (plugin, realm) = setup();
        plugin.store_password(&realm, "alice", "secret").unwrap();
        plugin.delete_user(&realm, "alice").unwrap();
        assert!(plugin.authenticate(&realm, "alice", "secret").is_err());

        // Deleting an absent user is fine.
        assert!(plugin.delete_user(&realm, "alice").is_ok());
    }
}
