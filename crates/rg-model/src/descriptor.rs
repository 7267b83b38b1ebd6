//! Generic handling of `key=value[,key=value]` descriptor strings.
//!
//! Structured sub-values (two-factor descriptors, sync options) are
//! stored as single-line descriptor strings inside section property
//! values. This module owns the pair-level grammar; the typed parsers
//! in [`crate::tfa`] and [`crate::sync`] interpret the pairs.

use crate::error::{ModelError, ModelResult};

/// Splits a descriptor string into its key/value pairs, in input order.
///
/// Keys must be non-empty and unique; every pair must contain `=` with a
/// non-empty value.
///
/// ## Errors
///
/// Returns `ModelError::InvalidDescriptor` on empty input, a missing
/// `=`, an empty key or value, or a duplicate key.
pub fn parse_pairs(s: &str) -> ModelResult<Vec<(String, String)>> {
    if s.is_empty() {
        return Err(ModelError::descriptor("empty descriptor"));
    }
    let mut pairs: Vec<(String, String)> = Vec::new();
    for part in s.split(',') {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| ModelError::descriptor(format!("missing '=' in '{part}'")))?;
        if key.is_empty() {
            return Err(ModelError::descriptor(format!("empty key in '{part}'")));
        }
        if value.is_empty() {
            return Err(ModelError::descriptor(format!("empty value for key '{key}'")));
        }
        if pairs.iter().any(|(k, _)| k == key) {
            return Err(ModelError::descriptor(format!("duplicate key '{key}'")));
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

/// Renders key/value pairs back into the canonical descriptor form.
#[must_use]
pub fn render_pairs(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a descriptor boolean (`1`/`0`/`true`/`false`).
#[must_use]
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Renders a boolean in the canonical on-disk form (`1`/`0`).
#[must_use]
pub const fn render_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
