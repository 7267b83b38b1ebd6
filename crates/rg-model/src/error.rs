//! Error types for identity-format validation.

use thiserror::Error;

/// Result type alias using the model error type.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors produced while validating identifiers and descriptor strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The realm identifier does not match the realm-id grammar.
    #[error("invalid realm format: '{0}'")]
    InvalidRealmFormat(String),

    /// The user identifier is shorter than the minimum length.
    #[error("username too short")]
    UsernameTooShort,

    /// The user identifier exceeds the maximum length.
    #[error("username too long")]
    UsernameTooLong,

    /// The user identifier is not of the form `name@realm`.
    #[error("invalid username format: '{0}'")]
    InvalidUsernameFormat(String),

    /// A structured descriptor string could not be parsed.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

impl ModelError {
    /// Creates an invalid-descriptor error.
    #[must_use]
    pub fn descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    /// Checks whether this error concerns the user-id length bounds.
    #[must_use]
    pub const fn is_length_error(&self) -> bool {
        matches!(self, Self::UsernameTooShort | Self::UsernameTooLong)
    }
}
