//! Directory-sync option descriptors.
//!
//! Realms backed by an external directory carry a `sync-options`
//! descriptor string controlling how users and groups are imported:
//!
//! ```text
//! scope=<users|groups|both>[,full=<bool>][,enable-new=<bool>][,purge=<bool>]
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::descriptor;
use crate::error::{ModelError, ModelResult};

/// What a directory sync covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncScope {
    /// Sync users only.
    Users,
    /// Sync groups only.
    Groups,
    /// Sync both users and groups.
    Both,
}

impl SyncScope {
    /// Returns the scope name used in descriptor strings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Groups => "groups",
            Self::Both => "both",
        }
    }

    /// Parses a scope name from a descriptor string.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::InvalidDescriptor` for unknown scopes.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "users" => Ok(Self::Users),
            "groups" => Ok(Self::Groups),
            "both" => Ok(Self::Both),
            other => Err(ModelError::descriptor(format!(
                "unknown sync scope '{other}'"
            ))),
        }
    }
}

/// Options controlling directory-sync behavior for a realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// What the sync covers.
    pub scope: SyncScope,
    /// Replace locally-known entries wholesale instead of merging.
    pub full: bool,
    /// Enable newly imported users immediately.
    pub enable_new: bool,
    /// Remove local entries that vanished from the directory.
    pub purge: bool,
}

impl SyncOptions {
    /// Creates options for the given scope with default flags
    /// (`full` off, `enable-new` on, `purge` off).
    #[must_use]
    pub const fn new(scope: SyncScope) -> Self {
        Self {
            scope,
            full: false,
            enable_new: true,
            purge: false,
        }
    }

    /// Parses a sync-options descriptor string.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::InvalidDescriptor` if `scope` is missing or
    /// unknown, a flag value is not a boolean, or an unknown key is
    /// present.
    pub fn parse(s: &str) -> ModelResult<Self> {
        let pairs = descriptor::parse_pairs(s)?;
        let mut scope = None;
        let mut options = Self::new(SyncScope::Both);
        for (k, v) in &pairs {
            match k.as_str() {
                "scope" => scope = Some(SyncScope::parse(v)?),
                "full" => options.full = parse_flag(k, v)?,
                "enable-new" => options.enable_new = parse_flag(k, v)?,
                "purge" => options.purge = parse_flag(k, v)?,
                other => {
                    return Err(ModelError::descriptor(format!(
                        "unknown sync option '{other}'"
                    )));
                }
            }
        }
        options.scope = scope.ok_or_else(|| ModelError::descriptor("missing 'scope'"))?;
        Ok(options)
    }
}

fn parse_flag(key: &str, value: &str) -> ModelResult<bool> {
    descriptor::parse_bool(value)
        .ok_or_else(|| ModelError::descriptor(format!("invalid boolean '{value}' for '{key}'")))
}

impl fmt::Display for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scope={},full={},enable-new={},purge={}",
            self.scope.as_str(),
            descriptor::render_bool(self.full),
            descriptor::render_bool(self.enable_new),
            descriptor::render_bool(self.purge),
        )
    }
}

impl FromStr for SyncOptions {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        Self::parse(s)
    }
}
