//! Registry of realm plugin implementations.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{SpiError, SpiResult};
use crate::local::{CredentialStore, LocalStorePlugin};
use crate::plugin::RealmPlugin;
use crate::system::{SystemAuthPlugin, SystemAuthenticator};

/// Registry mapping realm types to their plugin implementations.
///
/// Populated during process initialization and passed by reference to
/// the components that dispatch on realm type; registration is not part
/// of steady-state operation.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: DashMap<&'static str, Arc<dyn RealmPlugin>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the two built-in realm types registered:
    /// the cluster-local store over `credentials` and system
    /// authentication over `system`.
    #[must_use]
    pub fn with_builtins(
        credentials: Arc<dyn CredentialStore>,
        system: Arc<dyn SystemAuthenticator>,
    ) -> Self {
        let registry = Self::new();
        registry.register(Arc::new(LocalStorePlugin::new(credentials)));
        registry.register(Arc::new(SystemAuthPlugin::new(system)));
        registry
    }

    /// Registers a plugin under its realm type, replacing any previous
    /// registration for that type.
    pub fn register(&self, plugin: Arc<dyn RealmPlugin>) {
        self.plugins.insert(plugin.kind(), plugin);
    }

    /// Returns the plugin serving a realm type.
    ///
    /// ## Errors
    ///
    /// Returns `SpiError::UnknownPlugin` when no plugin is registered
    /// for `kind`.
    pub fn get(&self, kind: &str) -> SpiResult<Arc<dyn RealmPlugin>> {
        self.plugins
            .get(kind)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SpiError::UnknownPlugin(kind.to_string()))
    }

    /// True when a plugin is registered for the realm type.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.plugins.contains_key(kind)
    }

    /// Lists the registered realm types, in name order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.plugins.iter().map(|entry| *entry.key()).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
