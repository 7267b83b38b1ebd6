//! Per-realm-type property schemas and the standard-option registry.
//!
//! Every realm type declares which properties its sections may carry,
//! their primitive kinds, numeric bounds and string formats. The
//! registry also exposes named "standard option" schemas that the
//! surrounding API/CLI layers validate against independently; their
//! semantics are a contract boundary and must stay stable.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use rg_model::descriptor;
use rg_model::realm_id::MAX_REALM_ID_LEN;
use rg_model::tfa::MAX_TFA_LEN;
use rg_model::userid::MAX_USER_ID_LEN;
use rg_model::{RealmId, SyncOptions, TwoFactorDescriptor, UserId};

use crate::error::{ConfigError, ConfigResult};

/// Primitive kind of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form or format-checked string.
    String,
    /// Boolean, stored as `1`/`0` (accepting `true`/`false` on input).
    Boolean,
    /// Signed integer, optionally bounds-checked.
    Integer,
}

/// String format delegated to the identity-format validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// A realm identifier.
    RealmId,
    /// A `name@realm` user identifier.
    UserId,
    /// A two-factor descriptor string.
    Tfa,
    /// A directory-sync options descriptor string.
    SyncOptions,
}

impl ValueFormat {
    /// Validates `value` against the format.
    ///
    /// ## Errors
    ///
    /// Returns the format validator's message when the value is rejected.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            Self::RealmId => RealmId::parse(value).map(|_| ()),
            Self::UserId => UserId::parse(value).map(|_| ()),
            Self::Tfa => TwoFactorDescriptor::parse(value).map(|_| ()),
            Self::SyncOptions => SyncOptions::parse(value).map(|_| ()),
        }
        .map_err(|e| e.to_string())
    }
}

/// Declarative schema for one property field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    /// Primitive kind of the value.
    pub kind: FieldKind,
    /// Whether the field must be present in every section of its type.
    pub required: bool,
    /// Inclusive lower bound for integer values.
    pub min: Option<i64>,
    /// Inclusive upper bound for integer values.
    pub max: Option<i64>,
    /// Maximum byte length for string values.
    pub max_len: Option<usize>,
    /// Delegated string format check.
    pub format: Option<ValueFormat>,
    /// Documented default, surfaced to external callers; parsing does
    /// not inject defaults into the property map.
    pub default: Option<&'static str>,
}

impl FieldSchema {
    /// Creates a string field schema.
    #[must_use]
    pub const fn string() -> Self {
        Self {
            kind: FieldKind::String,
            required: false,
            min: None,
            max: None,
            max_len: None,
            format: None,
            default: None,
        }
    }

    /// Creates a boolean field schema.
    #[must_use]
    pub const fn boolean() -> Self {
        let mut schema = Self::string();
        schema.kind = FieldKind::Boolean;
        schema
    }

    /// Creates an integer field schema.
    #[must_use]
    pub const fn integer() -> Self {
        let mut schema = Self::string();
        schema.kind = FieldKind::Integer;
        schema
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets inclusive integer bounds.
    #[must_use]
    pub const fn bounds(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets the maximum byte length for string values.
    #[must_use]
    pub const fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// Delegates string validation to an identity format.
    #[must_use]
    pub const fn format(mut self, format: ValueFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Records the documented default value.
    #[must_use]
    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Validates `value` against this schema and returns its canonical
    /// form (booleans as `1`/`0`, integers re-rendered).
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::SchemaViolation` naming `field` when the
    /// value is rejected.
    pub fn validate(&self, field: &str, value: &str) -> ConfigResult<String> {
        match self.kind {
            FieldKind::Boolean => descriptor::parse_bool(value)
                .map(|b| descriptor::render_bool(b).to_string())
                .ok_or_else(|| ConfigError::schema(field, format!("invalid boolean '{value}'"))),
            FieldKind::Integer => {
                let n: i64 = value
                    .parse()
                    .map_err(|_| ConfigError::schema(field, format!("invalid integer '{value}'")))?;
                if let Some(min) = self.min {
                    if n < min {
                        return Err(ConfigError::schema(field, format!("value {n} below minimum {min}")));
                    }
                }
                if let Some(max) = self.max {
                    if n > max {
                        return Err(ConfigError::schema(field, format!("value {n} above maximum {max}")));
                    }
                }
                Ok(n.to_string())
            }
            FieldKind::String => {
                if let Some(max_len) = self.max_len {
                    if value.len() > max_len {
                        return Err(ConfigError::schema(
                            field,
                            format!("value exceeds {max_len} bytes"),
                        ));
                    }
                }
                if let Some(format) = self.format {
                    format.validate(value).map_err(|reason| ConfigError::schema(field, reason))?;
                }
                Ok(value.to_string())
            }
        }
    }
}

/// Permitted and required properties for one realm type.
#[derive(Debug, Clone)]
pub struct RealmSchema {
    kind: &'static str,
    fields: BTreeMap<&'static str, FieldSchema>,
}

impl RealmSchema {
    /// Creates a schema for the given realm type with the fields every
    /// realm type shares (`default`, `comment`).
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        let mut schema = Self {
            kind,
            fields: BTreeMap::new(),
        };
        schema.fields.insert("default", FieldSchema::boolean());
        schema
            .fields
            .insert("comment", FieldSchema::string().max_len(4096));
        schema
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn field(mut self, name: &'static str, field: FieldSchema) -> Self {
        self.fields.insert(name, field);
        self
    }

    /// The realm type this schema describes.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Looks up a field schema by property name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Iterates `(name, field)` pairs in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldSchema)> {
        self.fields.iter().map(|(name, field)| (*name, field))
    }

    /// Names of the fields that must be present.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|(_, f)| f.required)
            .map(|(name, _)| *name)
    }
}

/// Registry of realm-type schemas and named standard options.
///
/// Constructed once during process initialization and passed by
/// reference to the components that need it; registration happens at
/// startup only, reads thereafter.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    realms: RwLock<BTreeMap<&'static str, RealmSchema>>,
    options: RwLock<BTreeMap<String, FieldSchema>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in realm-type
    /// schemas (`pve`, `pam`, `ldap`, `ad`, `openid`) and the standard
    /// options (`realm`, `userid`, `tfa`, `realm-sync-options`).
    #[must_use]
    pub fn builtin() -> Self {
        let registry = Self::new();

        registry.register_realm(
            RealmSchema::new("pve")
                .field("tfa", FieldSchema::string().max_len(MAX_TFA_LEN).format(ValueFormat::Tfa)),
        );
        registry.register_realm(RealmSchema::new("pam"));
        registry.register_realm(
            RealmSchema::new("ldap")
                .field("server", FieldSchema::string().max_len(256).required())
                .field("port", FieldSchema::integer().bounds(1, 65535))
                .field("secure", FieldSchema::boolean())
                .field("base_dn", FieldSchema::string().max_len(256))
                .field("user_attr", FieldSchema::string().max_len(256))
                .field("tfa", FieldSchema::string().max_len(MAX_TFA_LEN).format(ValueFormat::Tfa))
                .field("sync-options", FieldSchema::string().format(ValueFormat::SyncOptions)),
        );
        registry.register_realm(
            RealmSchema::new("ad")
                .field("server", FieldSchema::string().max_len(256).required())
                .field("port", FieldSchema::integer().bounds(1, 65535))
                .field("secure", FieldSchema::boolean())
                .field("domain", FieldSchema::string().max_len(256).required())
                .field("sync-options", FieldSchema::string().format(ValueFormat::SyncOptions)),
        );
        registry.register_realm(
            RealmSchema::new("openid")
                .field("issuer-url", FieldSchema::string().max_len(256).required())
                .field("client-id", FieldSchema::string().max_len(256).required())
                .field("client-key", FieldSchema::string().max_len(256)),
        );

        registry.register_standard_option(
            "realm",
            FieldSchema::string()
                .max_len(MAX_REALM_ID_LEN)
                .format(ValueFormat::RealmId),
        );
        registry.register_standard_option(
            "userid",
            FieldSchema::string()
                .max_len(MAX_USER_ID_LEN)
                .format(ValueFormat::UserId),
        );
        registry.register_standard_option(
            "tfa",
            FieldSchema::string().max_len(MAX_TFA_LEN).format(ValueFormat::Tfa),
        );
        registry.register_standard_option(
            "realm-sync-options",
            FieldSchema::string().format(ValueFormat::SyncOptions),
        );

        registry
    }

    /// Registers (or replaces) a realm-type schema.
    pub fn register_realm(&self, schema: RealmSchema) {
        self.realms.write().insert(schema.kind(), schema);
    }

    /// Returns the schema for a realm type.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::UnknownRealmType` when no schema is
    /// registered for `kind`.
    pub fn schema_for(&self, kind: &str) -> ConfigResult<RealmSchema> {
        self.realms
            .read()
            .get(kind)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownRealmType(kind.to_string()))
    }

    /// Lists the registered realm types, in name order.
    #[must_use]
    pub fn realm_kinds(&self) -> Vec<&'static str> {
        self.realms.read().keys().copied().collect()
    }

    /// Registers (or replaces) a named standard option.
    pub fn register_standard_option(&self, name: impl Into<String>, schema: FieldSchema) {
        self.options.write().insert(name.into(), schema);
    }

    /// Returns a named standard option schema.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::UnknownStandardOption` when no schema is
    /// registered under `name`.
    pub fn standard_option(&self, name: &str) -> ConfigResult<FieldSchema> {
        self.options
            .read()
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownStandardOption(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_knows_all_realm_types() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(registry.realm_kinds(), ["ad", "ldap", "openid", "pam", "pve"]);
        assert!(registry.schema_for("ldap").is_ok());
        assert!(matches!(
            registry.schema_for("kerberos"),
            Err(ConfigError::UnknownRealmType(_))
        ));
    }

    #[test]
    fn every_schema_carries_the_shared_fields() {
        let registry = SchemaRegistry::builtin();
        for kind in registry.realm_kinds() {
            let schema = registry.schema_for(kind).unwrap();
            assert!(schema.get("default").is_some(), "{kind} lacks 'default'");
            assert!(schema.get("comment").is_some(), "{kind} lacks 'comment'");
        }
    }

    #[test]
    fn boolean_values_are_canonicalized() {
        let field = FieldSchema::boolean();
        assert_eq!(field.validate("secure", "true").unwrap(), "1");
        assert_eq!(field.validate("secure", "0").unwrap(), "0");
        assert!(field.validate("secure", "maybe").is_err());
    }

    #[test]
    fn integer_bounds_are_enforced() {
        let field = FieldSchema::integer().bounds(1, 65535);
        assert_eq!(field.validate("port", "389").unwrap(), "389");
        assert!(field.validate("port", "0").is_err());
        assert!(field.validate("port", "65536").is_err());
        assert!(field.validate("port", "ldap").is_err());
    }

    #[test]
    fn string_formats_delegate_to_the_validators() {
        let field = FieldSchema::string().format(ValueFormat::Tfa);
        assert!(field.validate("tfa", "type=oath").is_ok());
        assert!(field.validate("tfa", "type=sms").is_err());
    }

    #[test]
    fn required_fields_are_reported() {
        let registry = SchemaRegistry::builtin();
        let ldap = registry.schema_for("ldap").unwrap();
        let required: Vec<_> = ldap.required_fields().collect();
        assert_eq!(required, ["server"]);

        let ad = registry.schema_for("ad").unwrap();
        let required: Vec<_> = ad.required_fields().collect();
        assert_eq!(required, ["domain", "server"]);
    }

    #[test]
    fn standard_options_match_the_external_contract() {
        let registry = SchemaRegistry::builtin();
        let realm = registry.standard_option("realm").unwrap();
        assert_eq!(realm.max_len, Some(MAX_REALM_ID_LEN));

        let userid = registry.standard_option("userid").unwrap();
        assert_eq!(userid.max_len, Some(MAX_USER_ID_LEN));

        let tfa = registry.standard_option("tfa").unwrap();
        assert_eq!(tfa.max_len, Some(MAX_TFA_LEN));

        assert!(registry.standard_option("realm-sync-options").is_ok());
        assert!(matches!(
            registry.standard_option("acl"),
            Err(ConfigError::UnknownStandardOption(_))
        ));
    }
}
