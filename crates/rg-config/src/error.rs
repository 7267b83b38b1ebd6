//! Error handling for the configuration store.

use std::time::Duration;

use thiserror::Error;

use rg_model::ModelError;

/// Result type alias using the configuration error type.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors produced by the configuration store and locked mutations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No schema is registered for the requested realm type.
    #[error("unknown realm type '{0}'")]
    UnknownRealmType(String),

    /// No standard option schema is registered under the given name.
    #[error("unknown standard option '{0}'")]
    UnknownStandardOption(String),

    /// A property value violated its field schema.
    #[error("field '{field}': {reason}")]
    SchemaViolation {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An identity-format check failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The cluster-wide config lock could not be acquired in time.
    #[error("config lock not acquired within {0:?}")]
    LockTimeout(Duration),

    /// The persisted text changed between read and write.
    #[error("config changed during mutation")]
    VersionConflict,

    /// The backing store failed.
    #[error("config backend error: {0}")]
    Backend(String),

    /// I/O failure in the backing store.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A failure annotated with the mutation's context message.
    #[error("{context}: {source}")]
    Context {
        /// Caller-supplied description of the mutation.
        context: String,
        /// The underlying failure.
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Creates a schema violation for a named field.
    #[must_use]
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Annotates this error with a context message.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Checks whether this error (or the error it wraps) is a lock
    /// acquisition timeout.
    #[must_use]
    pub fn is_lock_timeout(&self) -> bool {
        match self {
            Self::LockTimeout(_) => true,
            Self::Context { source, .. } => source.is_lock_timeout(),
            _ => false,
        }
    }
}

/// A realm section dropped during a best-effort load.
///
/// Section errors are values carried alongside the parsed config, not
/// failures of the load itself: one malformed section is excluded and
/// reported while the rest of the config loads normally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("section '{section}' (line {line}): {reason}")]
pub struct SectionError {
    /// Realm id of the section as written in the file (or the offending
    /// text when no header was parsed).
    pub section: String,
    /// 1-based line number the problem was detected at.
    pub line: usize,
    /// Why the section was dropped.
    pub reason: String,
}

impl SectionError {
    /// Creates a section error.
    #[must_use]
    pub fn new(section: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            line,
            reason: reason.into(),
        }
    }
}
