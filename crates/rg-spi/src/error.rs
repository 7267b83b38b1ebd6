//! Error types for the realm plugin contract.
//!
//! The plugin-contract errors (`NotImplemented`, `UnsupportedOperation`)
//! are deliberate signals, not bugs: callers branch on them to decide
//! whether to offer password-change or deletion flows for a realm type.

use thiserror::Error;

use rg_model::ModelError;

/// Result type alias using the plugin error type.
pub type SpiResult<T> = std::result::Result<T, SpiError>;

/// Errors surfaced by realm plugin operations.
#[derive(Debug, Error)]
pub enum SpiError {
    /// The credential was rejected.
    ///
    /// The message is deliberately generic: it must not reveal whether
    /// the username or the password was wrong.
    #[error("authentication failed")]
    AuthFailure,

    /// The operation has no implementation for this realm type at all;
    /// the plugin author must override it.
    #[error("'{op}' not implemented for realm type '{kind}'")]
    NotImplemented {
        /// The realm type.
        kind: String,
        /// The operation that was invoked.
        op: &'static str,
    },

    /// The operation is deliberately unsupported for this realm type.
    #[error("realm type '{kind}' does not support {op}")]
    UnsupportedOperation {
        /// The realm type.
        kind: String,
        /// The operation that was invoked.
        op: &'static str,
    },

    /// No plugin is registered for the realm's type.
    #[error("no plugin registered for realm type '{0}'")]
    UnknownPlugin(String),

    /// The realm does not exist in the registry.
    #[error("authentication realm '{0}' does not exist")]
    UnknownRealm(String),

    /// The supplied user id is malformed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl SpiError {
    /// Creates a `NotImplemented` error for an operation.
    #[must_use]
    pub fn not_implemented(kind: impl Into<String>, op: &'static str) -> Self {
        Self::NotImplemented {
            kind: kind.into(),
            op,
        }
    }

    /// Creates an `UnsupportedOperation` error for an operation.
    #[must_use]
    pub fn unsupported(kind: impl Into<String>, op: &'static str) -> Self {
        Self::UnsupportedOperation {
            kind: kind.into(),
            op,
        }
    }

    /// Checks whether this is a rejected credential.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailure)
    }

    /// Checks whether this is a deliberate plugin-contract signal
    /// rather than a failure.
    #[must_use]
    pub const fn is_contract_signal(&self) -> bool {
        matches!(
            self,
            Self::NotImplemented { .. } | Self::UnsupportedOperation { .. }
        )
    }
}
