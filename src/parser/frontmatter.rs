// Front-matter extraction
//
// A block starts on the first non-empty line with `---` and ends at the next
// `---` line. Inside, each `key: value` line becomes a field; values are read
// as YAML scalars.

use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

const MARKER: &str = "---";

/// A scalar front-matter value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// Number kept exactly as written (`1.0` stays `1.0`)
    Number(String),
    Bool(bool),
    Null,
}

impl FieldValue {
    /// Interpret the raw text after `key:` as a YAML scalar
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return FieldValue::Text(String::new());
        }

        match serde_yaml::from_str::<serde_yaml::Value>(raw) {
            Ok(serde_yaml::Value::Null) => FieldValue::Null,
            Ok(serde_yaml::Value::Bool(b)) => FieldValue::Bool(b),
            Ok(serde_yaml::Value::Number(_)) => FieldValue::Number(strip_comment(raw).to_string()),
            Ok(serde_yaml::Value::String(s)) => FieldValue::Text(s),
            // sequences, mappings and anything YAML rejects stay verbatim
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    /// Null and blank text do not satisfy a required field
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Number(s) => f.write_str(s),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => f.write_str("null"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(s) => {
                if let Ok(i) = s.parse::<i64>() {
                    serializer.serialize_i64(i)
                } else if let Ok(f) = s.parse::<f64>() {
                    serializer.serialize_f64(f)
                } else {
                    serializer.serialize_str(s)
                }
            }
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Null => serializer.serialize_none(),
        }
    }
}

/// One parsed `key: value` line
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatterField {
    pub key: String,
    pub value: FieldValue,
    /// 1-based line number of the occurrence that won
    pub line: usize,
}

/// Parsed front-matter block, fields in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: Vec<FrontMatterField>,
    /// Skipped lines and duplicate keys
    pub warnings: Vec<String>,
}

impl FrontMatter {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Value as display text, `None` when missing or empty
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    pub fn fields(&self) -> &[FrontMatterField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Insert a field; a repeated key overwrites the value in place
    fn insert(&mut self, key: String, value: FieldValue, line: usize) {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.key == key) {
            self.warnings.push(format!(
                "line {}: duplicate key '{}' overrides line {}",
                line, key, existing.line
            ));
            existing.value = value;
            existing.line = line;
        } else {
            self.fields.push(FrontMatterField { key, value, line });
        }
    }
}

impl Serialize for FrontMatter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

/// Where a document stands with respect to front matter
#[derive(Debug, Clone, PartialEq)]
pub enum FrontMatterState {
    Absent,
    Present(FrontMatter),
}

impl FrontMatterState {
    pub fn front_matter(&self) -> Option<&FrontMatter> {
        match self {
            FrontMatterState::Present(fm) => Some(fm),
            FrontMatterState::Absent => None,
        }
    }

    pub fn into_front_matter(self) -> Option<FrontMatter> {
        match self {
            FrontMatterState::Present(fm) => Some(fm),
            FrontMatterState::Absent => None,
        }
    }
}

/// Parse the leading front-matter block of a markdown document.
///
/// Returns [`FrontMatterState::Absent`] when the first non-empty line is not
/// the opening marker, and [`Error::MalformedFrontMatter`] when the block is
/// opened but never closed.
pub fn parse_front_matter(content: &str) -> Result<FrontMatterState> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines().enumerate().map(|(i, l)| (i + 1, l));

    let opening = lines.by_ref().find(|(_, l)| !l.trim().is_empty());
    let open_line = match opening {
        Some((n, line)) if is_marker(line) => n,
        _ => return Ok(FrontMatterState::Absent),
    };

    let mut front_matter = FrontMatter::default();
    for (n, line) in lines {
        if is_marker(line) {
            return Ok(FrontMatterState::Present(front_matter));
        }
        parse_line(&mut front_matter, n, line);
    }

    Err(Error::MalformedFrontMatter { line: open_line })
}

fn is_marker(line: &str) -> bool {
    line.trim_end() == MARKER
}

fn parse_line(front_matter: &mut FrontMatter, n: usize, line: &str) {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return;
    }

    if line.starts_with(char::is_whitespace) || trimmed.starts_with("- ") {
        front_matter
            .warnings
            .push(format!("line {}: nested value not supported, skipped", n));
        return;
    }

    match line.split_once(':') {
        Some((key, value)) if is_key(key) => {
            front_matter.insert(key.to_string(), FieldValue::parse(value), n);
        }
        _ => front_matter
            .warnings
            .push(format!("line {}: expected 'key: value', skipped '{}'", n, trimmed)),
    }
}

fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Drop a trailing ` # comment` from a scalar
fn strip_comment(raw: &str) -> &str {
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end(),
        None => raw,
    }
}
