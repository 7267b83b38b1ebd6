//! Realm identifier validation.
//!
//! A realm id starts with an ASCII letter followed by at least one more
//! character from letters, digits, `.`, `-` or `_`, and is at most
//! [`MAX_REALM_ID_LEN`] bytes long.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Maximum length of a realm identifier in bytes.
pub const MAX_REALM_ID_LEN: usize = 32;

/// A validated realm identifier.
///
/// The inner string is guaranteed to match the realm-id grammar, so the
/// type can be embedded in user ids and section headers without
/// re-validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RealmId(String);

impl RealmId {
    /// Validates `s` against the realm-id grammar.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::InvalidRealmFormat` if `s` violates the
    /// grammar or exceeds [`MAX_REALM_ID_LEN`].
    pub fn parse(s: &str) -> ModelResult<Self> {
        if Self::is_valid(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ModelError::InvalidRealmFormat(s.to_owned()))
        }
    }

    /// Non-failing variant of [`RealmId::parse`] for best-effort contexts
    /// such as section parsing, where an invalid id drops the section
    /// instead of aborting the load.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Option<Self> {
        Self::is_valid(s).then(|| Self(s.to_owned()))
    }

    /// Checks `s` against the realm-id grammar without allocating.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        if s.len() < 2 || s.len() > MAX_REALM_ID_LEN {
            return false;
        }
        let mut chars = s.chars();
        // Length was checked above, so the first char exists.
        let Some(first) = chars.next() else {
            return false;
        };
        first.is_ascii_alphabetic()
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RealmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RealmId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for RealmId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RealmId {
    type Error = ModelError;

    fn try_from(s: String) -> ModelResult<Self> {
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(ModelError::InvalidRealmFormat(s))
        }
    }
}

impl From<RealmId> for String {
    fn from(id: RealmId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_ids() {
        for id in ["pve", "pam", "ldap-main", "Office.EU", "a_1", "ab"] {
            assert!(RealmId::parse(id).is_ok(), "{id} should be accepted");
        }
    }

    #[test]
    fn rejects_grammar_violations() {
        for id in ["", "a", "9realm", "-realm", "rea lm", "realm:x", "re/alm", "rëalm"] {
            assert_eq!(
                RealmId::parse(id),
                Err(ModelError::InvalidRealmFormat(id.to_string())),
                "{id:?} should be rejected"
            );
        }
    }

    #[test]
    fn enforces_maximum_length() {
        let max = format!("a{}", "b".repeat(MAX_REALM_ID_LEN - 1));
        assert!(RealmId::parse(&max).is_ok());

        let too_long = format!("a{}", "b".repeat(MAX_REALM_ID_LEN));
        assert!(RealmId::parse(&too_long).is_err());
    }

    #[test]
    fn lossy_parse_returns_none_instead_of_failing() {
        assert!(RealmId::parse_lossy("9bad").is_none());
        assert_eq!(
            RealmId::parse_lossy("good").map(|r| r.as_str().to_string()),
            Some("good".to_string())
        );
    }

    #[test]
    fn serde_round_trip_preserves_the_id() {
        let id = RealmId::parse("office").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"office\"");
        let back: RealmId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn serde_rejects_invalid_ids() {
        assert!(serde_json::from_str::<RealmId>("\"9bad\"").is_err());
    }
}
