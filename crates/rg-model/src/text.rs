//! Text encoding for single-line storage of free-text values.
//!
//! Comments are stored inside `key value` property lines, so they must
//! not contain newlines or other control bytes. The encoding escapes
//! `%`, ASCII control characters and DEL as `%XX`; everything else,
//! including non-ASCII text, passes through untouched. The pair
//! `decode_text(encode_text(s))` is byte-for-byte lossless.

use std::fmt::Write;

/// Encodes `s` for single-line storage.
#[must_use]
pub fn encode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' | '\u{00}'..='\u{1f}' | '\u{7f}' => {
                let _ = write!(out, "%{:02X}", c as u32);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Decodes a string produced by [`encode_text`].
///
/// Malformed escape sequences are kept literally; escape sequences that
/// would produce invalid UTF-8 are replaced rather than failing, since
/// decoding runs on best-effort loaded data.
#[must_use]
pub fn decode_text(s: &str) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(b) = decode_escape(bytes.get(i + 1).copied(), bytes.get(i + 2).copied()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn decode_escape(hi: Option<u8>, lo: Option<u8>) -> Option<u8> {
    let hi = hex_value(hi?)?;
    let lo = hex_value(lo?)?;
    Some(hi << 4 | lo)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
