//! Two-factor descriptor parsing.
//!
//! A two-factor descriptor is a structured sub-value attached to a realm
//! (or user), stored as a descriptor string:
//!
//! ```text
//! type=yubico[,id=...][,key=...][,url=...]
//! type=oath[,digits=6..8][,step=>=10]
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::descriptor;
use crate::error::{ModelError, ModelResult};

/// Maximum length of a TFA descriptor string in bytes.
pub const MAX_TFA_LEN: usize = 128;

/// Default number of OTP digits for oath descriptors.
pub const DEFAULT_OATH_DIGITS: u8 = 6;

/// Smallest permitted number of OTP digits.
pub const MIN_OATH_DIGITS: u8 = 6;

/// Largest permitted number of OTP digits.
pub const MAX_OATH_DIGITS: u8 = 8;

/// Default oath time step in seconds.
pub const DEFAULT_OATH_STEP: u32 = 30;

/// Smallest permitted oath time step in seconds.
pub const MIN_OATH_STEP: u32 = 10;

/// A second authentication factor required by a realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TwoFactorDescriptor {
    /// Yubico OTP validation against a YubiCloud-compatible server.
    Yubico {
        /// API id used to talk to the validation server.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        id: Option<String>,
        /// API key used to talk to the validation server.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        key: Option<String>,
        /// Validation server URL override.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        url: Option<String>,
    },
    /// Time-based OTP (RFC 6238) verification.
    Oath {
        /// Number of OTP digits (6 to 8).
        digits: u8,
        /// Time step in seconds (at least 10).
        step: u32,
    },
}

impl TwoFactorDescriptor {
    /// Parses a TFA descriptor string.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::InvalidDescriptor` if the string exceeds
    /// [`MAX_TFA_LEN`], the `type` key is missing or unrecognized, an
    /// unknown key is present, or a numeric field is out of bounds.
    pub fn parse(s: &str) -> ModelResult<Self> {
        if s.len() > MAX_TFA_LEN {
            return Err(ModelError::descriptor("tfa descriptor too long"));
        }
        let pairs = descriptor::parse_pairs(s)?;
        let kind = pairs
            .iter()
            .find(|(k, _)| k == "type")
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| ModelError::descriptor("missing 'type'"))?;
        match kind {
            "yubico" => Self::parse_yubico(&pairs),
            "oath" => Self::parse_oath(&pairs),
            other => Err(ModelError::descriptor(format!(
                "unrecognized tfa type '{other}'"
            ))),
        }
    }

    fn parse_yubico(pairs: &[(String, String)]) -> ModelResult<Self> {
        let mut id = None;
        let mut key = None;
        let mut url = None;
        for (k, v) in pairs {
            match k.as_str() {
                "type" => {}
                "id" => id = Some(v.clone()),
                "key" => key = Some(v.clone()),
                "url" => url = Some(v.clone()),
                other => {
                    return Err(ModelError::descriptor(format!(
                        "unknown yubico key '{other}'"
                    )));
                }
            }
        }
        Ok(Self::Yubico { id, key, url })
    }

    fn parse_oath(pairs: &[(String, String)]) -> ModelResult<Self> {
        let mut digits = DEFAULT_OATH_DIGITS;
        let mut step = DEFAULT_OATH_STEP;
        for (k, v) in pairs {
            match k.as_str() {
                "type" => {}
                "digits" => {
                    digits = v.parse().map_err(|_| {
                        ModelError::descriptor(format!("invalid digits '{v}'"))
                    })?;
                    if !(MIN_OATH_DIGITS..=MAX_OATH_DIGITS).contains(&digits) {
                        return Err(ModelError::descriptor(format!(
                            "digits must be between {MIN_OATH_DIGITS} and {MAX_OATH_DIGITS}"
                        )));
                    }
                }
                "step" => {
                    step = v.parse().map_err(|_| {
                        ModelError::descriptor(format!("invalid step '{v}'"))
                    })?;
                    if step < MIN_OATH_STEP {
                        return Err(ModelError::descriptor(format!(
                            "step must be at least {MIN_OATH_STEP} seconds"
                        )));
                    }
                }
                other => {
                    return Err(ModelError::descriptor(format!(
                        "unknown oath key '{other}'"
                    )));
                }
            }
        }
        Ok(Self::Oath { digits, step })
    }
}

impl fmt::Display for TwoFactorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yubico { id, key, url } => {
                let mut pairs = vec![("type", "yubico".to_string())];
                if let Some(id) = id {
                    pairs.push(("id", id.clone()));
                }
                if let Some(key) = key {
                    pairs.push(("key", key.clone()));
                }
                if let Some(url) = url {
                    pairs.push(("url", url.clone()));
                }
                f.write_str(&descriptor::render_pairs(&pairs))
            }
            Self::Oath { digits, step } => {
                write!(f, "type=oath,digits={digits},step={step}")
            }
        }
    }
}

impl FromStr for TwoFactorDescriptor {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        Self::parse(s)
    }
}
