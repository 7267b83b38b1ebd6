//! # rg-model
//!
//! Domain models and identity formats for the Realmgate realm registry.
//!
//! This crate is the leaf of the workspace: it defines the validated
//! identifier types ([`RealmId`], [`UserId`]), the structured descriptor
//! sub-values ([`TwoFactorDescriptor`], [`SyncOptions`]), and the realm
//! registry model ([`Realm`], [`DomainConfig`]) that the configuration
//! store and the realm plugins both operate on.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod realm;
pub mod realm_id;
pub mod sync;
pub mod text;
pub mod tfa;
pub mod userid;

pub use config::{ConfigDigest, DomainConfig};
pub use error::{ModelError, ModelResult};
pub use realm::Realm;
pub use realm_id::RealmId;
pub use sync::{SyncOptions, SyncScope};
pub use tfa::TwoFactorDescriptor;
pub use userid::UserId;
