//! # rg-config
//!
//! The realm configuration subsystem of Realmgate: a typed, validated,
//! lock-protected, section-structured store for the cluster-shared
//! `domains.cfg` registry of authentication realms.
//!
//! ## Structure
//!
//! - [`schema`] - per-realm-type property schemas and the named
//!   standard options shared with surrounding API/CLI layers.
//! - [`section`] - the raw section grammar (header plus indented
//!   property lines), composed by the store rather than extended.
//! - [`store`] - parse/serialize between persisted text and the
//!   [`rg_model::DomainConfig`] registry, with built-in injection and
//!   default-flag normalization.
//! - [`backend`] - the storage and cluster-locking boundary, with
//!   directory-backed and in-memory implementations.
//! - [`lock`] - the locked read-modify-write cycle every mutation of
//!   the shared config goes through.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod backend;
pub mod error;
pub mod lock;
pub mod schema;
pub mod section;
pub mod store;

pub use backend::{ConfigBackend, DirectoryBackend, LockGuard, MemoryBackend, RawConfig};
pub use error::{ConfigError, ConfigResult, SectionError};
pub use lock::with_locked_config;
pub use schema::{FieldKind, FieldSchema, RealmSchema, SchemaRegistry, ValueFormat};
pub use section::{RawSection, SectionCodec};
pub use store::{ConfigStore, ParseOutcome, DOMAINS_CFG};
