//! Parsing and serialization of the realm registry.

use std::collections::BTreeSet;
use std::sync::Arc;

use rg_model::realm::{builtin_comment, builtin_kind, BUILTIN_LOCAL, BUILTIN_SYSTEM};
use rg_model::text::{decode_text, encode_text};
use rg_model::{ConfigDigest, DomainConfig, ModelError, Realm, RealmId};

use crate::error::{ConfigError, ConfigResult, SectionError};
use crate::schema::SchemaRegistry;
use crate::section::{RawSection, SectionCodec};

/// Well-known name of the persisted realm registry file.
pub const DOMAINS_CFG: &str = "domains.cfg";

/// Result of a best-effort load: the usable registry plus the sections
/// that were excluded from it.
#[derive(Debug)]
pub struct ParseOutcome {
    /// The parsed registry, built-ins injected and defaults normalized.
    pub config: DomainConfig,
    /// Sections dropped during the load.
    pub errors: Vec<SectionError>,
}

/// Parses and serializes the realm registry.
///
/// The store composes the section codec (raw grammar) and the schema
/// registry (per-type field shapes) and owns the registry-level
/// normalization: default-flag demotion, comment decoding and built-in
/// injection. A new [`DomainConfig`] is fully rebuilt on every parse.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    codec: SectionCodec,
    schemas: Arc<SchemaRegistry>,
}

impl ConfigStore {
    /// Creates a store over the given schema registry.
    #[must_use]
    pub fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            codec: SectionCodec::new(),
            schemas,
        }
    }

    /// Creates a store over a fresh registry holding the built-in
    /// realm-type schemas and standard options.
    #[must_use]
    pub fn with_builtin_schemas() -> Self {
        Self::new(Arc::new(SchemaRegistry::builtin()))
    }

    /// The schema registry this store validates against.
    #[must_use]
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Parses persisted text into a registry, best-effort: malformed
    /// sections are dropped and reported while the rest load normally.
    #[must_use]
    pub fn parse(&self, raw: &str) -> ParseOutcome {
        let (sections, mut errors) = self.codec.split(raw);
        let mut config = DomainConfig::new();

        for section in &sections {
            if config.contains(&section.id) {
                errors.push(SectionError::new(
                    section.id.clone(),
                    section.line,
                    "duplicate realm id",
                ));
                continue;
            }
            match self.build_realm(section) {
                Ok(realm) => {
                    config.insert(realm);
                }
                Err(err) => {
                    tracing::warn!(
                        section = %section.id,
                        line = section.line,
                        error = %err,
                        "dropping malformed realm section"
                    );
                    errors.push(SectionError::new(
                        section.id.clone(),
                        section.line,
                        err.to_string(),
                    ));
                }
            }
        }

        // At most one realm may be the default; extras are silently
        // demoted in the order they were encountered.
        let mut seen_default = false;
        for realm in config.iter_mut() {
            if realm.default {
                if seen_default {
                    realm.default = false;
                } else {
                    seen_default = true;
                }
            }
        }

        self.inject_builtins(&mut config);
        config.set_digest(ConfigDigest::of(raw));
        ParseOutcome { config, errors }
    }

    /// Serializes a registry back into persisted text. The inverse of
    /// [`ConfigStore::parse`] up to comment text-encoding artifacts.
    #[must_use]
    pub fn serialize(&self, config: &DomainConfig) -> String {
        let sections: Vec<RawSection> = config.iter().map(realm_section).collect();
        self.codec.render(&sections)
    }

    /// Validates a realm a caller intends to insert or update, with the
    /// strictness of a direct validation call (fatal on first problem).
    ///
    /// ## Errors
    ///
    /// Returns `UnknownRealmType` or `SchemaViolation` describing the
    /// first problem found.
    pub fn validate_realm(&self, realm: &Realm) -> ConfigResult<()> {
        if let Some(pinned) = builtin_kind(realm.id.as_str()) {
            if realm.kind != pinned {
                return Err(ConfigError::schema(
                    "type",
                    format!("built-in realm '{}' is always of type '{pinned}'", realm.id),
                ));
            }
        }
        let schema = self.schemas.schema_for(&realm.kind)?;
        for (key, value) in &realm.properties {
            let field = schema
                .get(key)
                .ok_or_else(|| ConfigError::schema(key.as_str(), "unknown field"))?;
            field.validate(key, value)?;
        }
        for name in schema.required_fields() {
            if !realm.properties.contains_key(name) {
                return Err(ConfigError::schema(name, "missing required field"));
            }
        }
        Ok(())
    }

    fn build_realm(&self, section: &RawSection) -> ConfigResult<Realm> {
        // Built-in ids keep their pinned type no matter what the file
        // declares; their sections are also loaded leniently so a stray
        // property cannot make the built-in disappear.
        let pinned = builtin_kind(&section.id);
        let kind = pinned.unwrap_or(&section.kind);
        if let Some(pinned) = pinned {
            if section.kind != pinned {
                tracing::debug!(
                    section = %section.id,
                    declared = %section.kind,
                    "overriding declared type of built-in realm"
                );
            }
        }

        let id = RealmId::parse_lossy(&section.id).ok_or_else(|| {
            ConfigError::Model(ModelError::InvalidRealmFormat(section.id.clone()))
        })?;
        let schema = self.schemas.schema_for(kind)?;

        let mut realm = Realm::new(id, kind);
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for (key, value) in &section.properties {
            let lenient = pinned.is_some();
            if !seen.insert(key.as_str()) {
                if lenient {
                    continue;
                }
                return Err(ConfigError::schema(key.as_str(), "duplicate field"));
            }
            let Some(field) = schema.get(key) else {
                if lenient {
                    tracing::warn!(section = %section.id, field = %key, "ignoring unknown field");
                    continue;
                }
                return Err(ConfigError::schema(key.as_str(), "unknown field"));
            };
            let canonical = match field.validate(key, value) {
                Ok(canonical) => canonical,
                Err(err) => {
                    if lenient {
                        tracing::warn!(section = %section.id, field = %key, error = %err, "ignoring invalid field");
                        continue;
                    }
                    return Err(err);
                }
            };
            match key.as_str() {
                "comment" => realm.comment = Some(decode_text(&canonical)),
                "default" => realm.default = canonical == "1",
                _ => {
                    realm.properties.insert(key.clone(), canonical);
                }
            }
        }

        for name in schema.required_fields() {
            if !realm.properties.contains_key(name) {
                return Err(ConfigError::schema(name, "missing required field"));
            }
        }
        Ok(realm)
    }

    fn inject_builtins(&self, config: &mut DomainConfig) {
        for id in [BUILTIN_LOCAL, BUILTIN_SYSTEM] {
            if let Some(realm) = config.realm_mut(id) {
                realm.kind = id.to_string();
                if realm.comment.is_none() {
                    realm.comment = builtin_comment(id).map(str::to_string);
                }
            } else if let Some(realm_id) = RealmId::parse_lossy(id) {
                let mut realm = Realm::new(realm_id, id);
                realm.comment = builtin_comment(id).map(str::to_string);
                config.insert(realm);
            }
        }
    }
}

fn realm_section(realm: &Realm) -> RawSection {
    let mut section = RawSection::new(realm.kind.clone(), realm.id.as_str());
    if realm.default {
        section.properties.push(("default".to_string(), "1".to_string()));
    }
    if let Some(comment) = &realm.comment {
        if !comment.is_empty() {
            section
                .properties
                .push(("comment".to_string(), encode_text(comment)));
        }
    }
    for (key, value) in &realm.properties {
        section.properties.push((key.clone(), value.clone()));
    }
    section
}
