//! Raw section grammar.
//!
//! The persisted file is a sequence of sections, each a header line
//! `<type>: <id>` followed by indented `key value` property lines,
//! terminated by a blank line or end of file. This module owns that
//! low-level shape only; it performs no id or schema validation. The
//! store composes a codec rather than extending it.

use crate::error::SectionError;

/// One raw `(type, id, properties)` record split out of the persisted
/// text, in file order. All fields are unvalidated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    /// Declared section type.
    pub kind: String,
    /// Declared realm id.
    pub id: String,
    /// Property lines in file order.
    pub properties: Vec<(String, String)>,
    /// 1-based line number of the section header.
    pub line: usize,
}

impl RawSection {
    /// Creates a section with no properties.
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            properties: Vec::new(),
            line: 0,
        }
    }
}

/// Splits raw text into sections and renders sections back to text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionCodec;

impl SectionCodec {
    /// Creates a codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Splits `raw` into sections, best-effort: a malformed header or
    /// property line drops that section (recording why) and the scan
    /// resumes at the next blank-line boundary.
    #[must_use]
    pub fn split(&self, raw: &str) -> (Vec<RawSection>, Vec<SectionError>) {
        let mut sections = Vec::new();
        let mut errors = Vec::new();
        let mut current: Option<RawSection> = None;
        // After dropping a section, swallow its remaining lines.
        let mut skipping = false;

        for (idx, line) in raw.lines().enumerate() {
            let lineno = idx + 1;

            if line.trim().is_empty() {
                if let Some(section) = current.take() {
                    sections.push(section);
                }
                skipping = false;
                continue;
            }

            if line.starts_with('\t') || line.starts_with(' ') {
                if skipping {
                    continue;
                }
                let Some(section) = current.as_mut() else {
                    errors.push(SectionError::new(
                        line.trim(),
                        lineno,
                        "property line outside of a section",
                    ));
                    skipping = true;
                    continue;
                };
                let body = line.trim_start_matches(['\t', ' ']);
                match split_property(body) {
                    Some((key, value)) => section.properties.push((key, value)),
                    None => {
                        errors.push(SectionError::new(
                            section.id.clone(),
                            lineno,
                            format!("malformed property line '{body}'"),
                        ));
                        current = None;
                        skipping = true;
                    }
                }
                continue;
            }

            // Header line; an unterminated previous section ends here.
            if let Some(section) = current.take() {
                sections.push(section);
            }
            skipping = false;
            match split_header(line) {
                Some((kind, id)) => {
                    current = Some(RawSection {
                        kind,
                        id,
                        properties: Vec::new(),
                        line: lineno,
                    });
                }
                None => {
                    errors.push(SectionError::new(
                        line.trim(),
                        lineno,
                        "malformed section header",
                    ));
                    skipping = true;
                }
            }
        }

        if let Some(section) = current.take() {
            sections.push(section);
        }

        (sections, errors)
    }

    /// Renders sections back into the persisted text shape, one header
    /// per section followed by tab-indented property lines and a
    /// separating blank line.
    #[must_use]
    pub fn render(&self, sections: &[RawSection]) -> String {
        let mut out = String::new();
        for section in sections {
            out.push_str(&section.kind);
            out.push_str(": ");
            out.push_str(&section.id);
            out.push('\n');
            for (key, value) in &section.properties {
                out.push('\t');
                out.push_str(key);
                out.push(' ');
                out.push_str(value);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

fn split_header(line: &str) -> Option<(String, String)> {
    let (kind, id) = line.split_once(':')?;
    let kind = kind.trim();
    let id = id.trim();
    if kind.is_empty() || id.is_empty() || kind.contains(char::is_whitespace) {
        return None;
    }
    Some((kind.to_string(), id.to_string()))
}

fn split_property(body: &str) -> Option<(String, String)> {
    let (key, value) = body.split_once(char::is_whitespace)?;
    let value = value.trim_start();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}
