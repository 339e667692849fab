//! Line-based reader for MAP text.
//!
//! A map is a sequence of entities. Each entity is a `{ }` block holding
//! `"key" "value"` property lines and nested `{ }` brush blocks, whose lines
//! are face records:
//!
//! ```text
//! {
//! "classname" "worldspawn"
//! {
//! ( 128 -32 0 ) ( 96 -16 0 ) ( 224 112 0 ) wswamp2_1 0 0 0 1 1
//! ...
//! }
//! }
//! ```
//!
//! Braces must sit on their own line. Brush text is kept verbatim, one face
//! per line, so it can be handed to the assembler and quoted back in failure
//! reports.

use crate::error::MapError;

/// A brush block and its position in the entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrushRecord {
    /// Zero-based index within the owning entity.
    pub index: usize,
    /// One-based line of the opening brace.
    pub line: usize,
    /// Face lines, newline separated, comments stripped.
    pub text: String,
}

/// An entity block: its properties in file order and its brushes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapEntity {
    pub index: usize,
    pub line: usize,
    pub properties: Vec<(String, String)>,
    pub brushes: Vec<BrushRecord>,
}

impl MapEntity {
    /// Returns the value of the first property named `key`.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the entity's classname, or `""` if it has none.
    pub fn classname(&self) -> &str {
        self.property("classname").unwrap_or("")
    }
}

/// Splits MAP text into entities.
pub fn parse_map(text: &str) -> Result<Vec<MapEntity>, MapError> {
    let mut entities = Vec::new();
    let mut entity: Option<MapEntity> = None;
    let mut brush: Option<BrushRecord> = None;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let content = strip_comment(raw).trim();
        if content.is_empty() {
            continue;
        }

        match (content, entity.as_mut(), brush.is_some()) {
            ("{", None, _) => {
                entity = Some(MapEntity {
                    index: entities.len(),
                    line,
                    ..MapEntity::default()
                });
            }
            ("{", Some(current), false) => {
                brush = Some(BrushRecord {
                    index: current.brushes.len(),
                    line,
                    text: String::new(),
                });
            }
            ("{", Some(_), true) => return Err(MapError::UnexpectedBrace { line }),
            ("}", Some(current), true) => current.brushes.extend(brush.take()),
            ("}", Some(_), false) => entities.extend(entity.take()),
            ("}", None, _) => return Err(MapError::UnbalancedClose { line }),
            (_, None, _) => return Err(MapError::UnexpectedContent { line }),
            (face, Some(_), true) => {
                if let Some(current) = brush.as_mut() {
                    if !current.text.is_empty() {
                        current.text.push('\n');
                    }
                    current.text.push_str(face);
                }
            }
            (property, Some(current), false) => {
                let pair = parse_property(property).ok_or(MapError::MalformedProperty { line })?;
                current.properties.push(pair);
            }
        }
    }

    if let Some(open) = brush {
        return Err(MapError::Unterminated { line: open.line });
    }
    if let Some(open) = entity {
        return Err(MapError::Unterminated { line: open.line });
    }

    Ok(entities)
}

/// Cuts a `//` comment off a line, ignoring `//` inside quoted strings.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => quoted = !quoted,
            b'/' if !quoted && bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parses `"key" "value"`.
fn parse_property(line: &str) -> Option<(String, String)> {
    let (key, rest) = quoted(line)?;
    let (value, rest) = quoted(rest)?;
    rest.trim().is_empty().then(|| (key.to_owned(), value.to_owned()))
}

fn quoted(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start().strip_prefix('"')?;
    let end = s.find('"')?;
    Some((&s[..end], &s[end + 1..]))
}
