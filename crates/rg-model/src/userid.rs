//! User identifier parsing.
//!
//! A user id has the form `name@realm`. The name part must not contain
//! whitespace, `:` (the on-disk list separator used for multi-value user
//! lists) or `/` (the path delimiter of the management API); violating
//! either would corrupt unrelated subsystems, so validation is strict
//! and centralized here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::realm_id::RealmId;

/// Minimum length of a full user id in bytes.
pub const MIN_USER_ID_LEN: usize = 3;

/// Maximum length of a full user id in bytes.
pub const MAX_USER_ID_LEN: usize = 64;

/// A parsed `name@realm` user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId {
    full: String,
    name: String,
    realm: RealmId,
}

impl UserId {
    /// Parses a `name@realm` string into its three-way split.
    ///
    /// ## Errors
    ///
    /// - `UsernameTooShort` if the input is shorter than
    ///   [`MIN_USER_ID_LEN`] (empty input is treated as zero-length).
    /// - `UsernameTooLong` if it exceeds [`MAX_USER_ID_LEN`].
    /// - `InvalidUsernameFormat` if it is not `name@realm` with a name
    ///   free of whitespace, `:` and `/`, and a valid realm part.
    pub fn parse(s: &str) -> ModelResult<Self> {
        if s.len() < MIN_USER_ID_LEN {
            return Err(ModelError::UsernameTooShort);
        }
        if s.len() > MAX_USER_ID_LEN {
            return Err(ModelError::UsernameTooLong);
        }
        // The name part may itself contain '@', so split at the last one.
        let (name, realm) = s
            .rsplit_once('@')
            .ok_or_else(|| ModelError::InvalidUsernameFormat(s.to_owned()))?;
        if name.is_empty() || !name.chars().all(valid_name_char) {
            return Err(ModelError::InvalidUsernameFormat(s.to_owned()));
        }
        let realm = RealmId::parse(realm)
            .map_err(|_| ModelError::InvalidUsernameFormat(s.to_owned()))?;
        Ok(Self {
            full: s.to_owned(),
            name: name.to_owned(),
            realm,
        })
    }

    /// Returns the full `name@realm` form.
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Returns the name part.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the realm part.
    #[must_use]
    pub fn realm(&self) -> &RealmId {
        &self.realm
    }
}

fn valid_name_char(c: char) -> bool {
    !c.is_whitespace() && c != ':' && c != '/'
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for UserId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = ModelError;

    fn try_from(s: String) -> ModelResult<Self> {
        Self::parse(&s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.full
    }
}
