//! The full realm registry model.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::realm::Realm;
use crate::realm_id::RealmId;

/// SHA-256 digest of the persisted configuration text, used for
/// optimistic concurrency by the external store.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigDigest([u8; 32]);

impl ConfigDigest {
    /// Computes the digest of raw configuration text.
    #[must_use]
    pub fn of(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Renders the digest as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        use fmt::Write;

        let mut out = String::with_capacity(64);
        for b in self.0 {
            let _ = write!(out, "{b:02x}");
        }
        out
    }
}

impl fmt::Debug for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigDigest({})", self.to_hex())
    }
}

impl fmt::Display for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The full registry: an ordered mapping from realm id to [`Realm`].
///
/// The order is the order realms were encountered during parse (or
/// inserted afterwards) and is preserved through serialization. A
/// `DomainConfig` is fully rebuilt on every read and lives for one read
/// or one locked read-modify-write cycle; it is exclusively owned by the
/// caller that requested it.
#[derive(Debug, Clone, Default)]
pub struct DomainConfig {
    realms: Vec<Realm>,
    digest: Option<ConfigDigest>,
}

impl DomainConfig {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the digest of the text this registry was parsed from, if
    /// it was produced by a parse.
    #[must_use]
    pub const fn digest(&self) -> Option<ConfigDigest> {
        self.digest
    }

    /// Records the digest of the source text.
    pub fn set_digest(&mut self, digest: ConfigDigest) {
        self.digest = Some(digest);
    }

    /// Looks up a realm by id.
    #[must_use]
    pub fn realm(&self, id: &str) -> Option<&Realm> {
        self.realms.iter().find(|r| r.id.as_str() == id)
    }

    /// Looks up a realm by id, mutably.
    pub fn realm_mut(&mut self, id: &str) -> Option<&mut Realm> {
        self.realms.iter_mut().find(|r| r.id.as_str() == id)
    }

    /// True when a realm with the given id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.realm(id).is_some()
    }

    /// Inserts a realm, replacing an existing one with the same id in
    /// place (preserving its position) or appending otherwise. Returns
    /// the replaced realm, if any.
    pub fn insert(&mut self, realm: Realm) -> Option<Realm> {
        match self
            .realms
            .iter_mut()
            .find(|r| r.id == realm.id)
        {
            Some(slot) => Some(std::mem::replace(slot, realm)),
            None => {
                self.realms.push(realm);
                None
            }
        }
    }

    /// Removes a realm by id, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Realm> {
        let idx = self.realms.iter().position(|r| r.id.as_str() == id)?;
        Some(self.realms.remove(idx))
    }

    /// Iterates realms in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Realm> {
        self.realms.iter()
    }

    /// Iterates realms in registry order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Realm> {
        self.realms.iter_mut()
    }

    /// Returns the realms as a slice, in registry order.
    #[must_use]
    pub fn realms(&self) -> &[Realm] {
        &self.realms
    }

    /// Number of realms in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.realms.len()
    }

    /// True when the registry holds no realms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.realms.is_empty()
    }

    /// Returns the realm marked as the cluster-wide default, if any.
    #[must_use]
    pub fn default_realm(&self) -> Option<&Realm> {
        self.realms.iter().find(|r| r.default)
    }

    /// Marks the given realm as the single default, clearing the flag
    /// everywhere else. Returns false (changing nothing) when the id is
    /// unknown.
    pub fn set_default(&mut self, id: &RealmId) -> bool {
        if !self.contains(id.as_str()) {
            return false;
        }
        for realm in &mut self.realms {
            realm.default = realm.id == *id;
        }
        true
    }
}

impl<'a> IntoIterator for &'a DomainConfig {
    type Item = &'a Realm;
    type IntoIter = std::slice::Iter<'a, Realm>;

    fn into_iter(self) -> Self::IntoIter {
        self.realms.iter()
    }
}
