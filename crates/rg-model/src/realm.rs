//! Realm definitions and the built-in realms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::realm_id::RealmId;

/// Id (and type) of the built-in cluster-local identity store realm.
pub const BUILTIN_LOCAL: &str = "pve";

/// Id (and type) of the built-in system authentication realm.
pub const BUILTIN_SYSTEM: &str = "pam";

/// Returns the pinned realm type for a built-in realm id, or `None` for
/// ordinary realms. Built-ins keep this type regardless of what the
/// persisted file declares.
#[must_use]
pub fn builtin_kind(id: &str) -> Option<&'static str> {
    match id {
        BUILTIN_LOCAL => Some(BUILTIN_LOCAL),
        BUILTIN_SYSTEM => Some(BUILTIN_SYSTEM),
        _ => None,
    }
}

/// Returns the default comment supplied for a built-in realm when the
/// persisted file carries none.
#[must_use]
pub fn builtin_comment(id: &str) -> Option<&'static str> {
    match id {
        BUILTIN_LOCAL => Some("Cluster-internal authentication server"),
        BUILTIN_SYSTEM => Some("Linux PAM standard authentication"),
        _ => None,
    }
}

/// One configured identity domain.
///
/// The `default` flag and the decoded `comment` are lifted out of the
/// flat property map on parse; `properties` holds only the type-specific
/// fields, already validated against the realm type's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    /// Unique realm identifier.
    pub id: RealmId,
    /// Registered realm type (e.g. `ldap`). Pinned for built-ins.
    pub kind: String,
    /// Whether this realm is the cluster-wide default. At most one realm
    /// in a [`crate::DomainConfig`] carries this flag.
    #[serde(default)]
    pub default: bool,
    /// Optional free-text comment, decoded in memory and text-encoded at
    /// rest.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
    /// Type-specific properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Realm {
    /// Creates a realm of the given type with no properties.
    #[must_use]
    pub fn new(id: RealmId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            default: false,
            comment: None,
            properties: BTreeMap::new(),
        }
    }

    /// True when this realm is one of the built-ins.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        builtin_kind(self.id.as_str()).is_some()
    }

    /// Gets a property value by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Sets a property value, replacing any previous one.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }
}
