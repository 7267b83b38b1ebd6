//! # rg-spi
//!
//! The realm plugin contract for Realmgate.
//!
//! Every realm type implements [`RealmPlugin`]; the [`PluginRegistry`]
//! maps realm types to implementations and the [`dispatch`] helpers
//! route `name@realm` operations through the registry so callers never
//! branch on realm type. The two built-in realm types ship here:
//! [`LocalStorePlugin`] for the cluster-local identity store and
//! [`SystemAuthPlugin`] for host system authentication.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod dispatch;
pub mod error;
pub mod local;
pub mod plugin;
pub mod registry;
pub mod system;

pub use dispatch::{authenticate_user, delete_user, store_password};
pub use error::{SpiError, SpiResult};
pub use local::{CredentialStore, LocalStorePlugin, MemoryCredentialStore};
pub use plugin::RealmPlugin;
pub use registry::PluginRegistry;
pub use system::{DenyAllAuthenticator, SystemAuthPlugin, SystemAuthenticator};
