//! Provenance metadata attached to rendered elements.
//!
//! The three attribute names are the contract between the build-time tagger
//! and the runtime picker. Renaming any of them breaks every tagged bundle.

use serde::Deserialize;
use serde::Serialize;

pub const SOURCE_FILE_ATTR: &str = "data-source-file";
pub const SOURCE_LINE_ATTR: &str = "data-source-line";
pub const SOURCE_COLUMN_ATTR: &str = "data-source-column";

/// All provenance attribute names, in emission order.
pub const PROVENANCE_ATTRS: [&str; 3] = [SOURCE_FILE_ATTR, SOURCE_LINE_ATTR, SOURCE_COLUMN_ATTR];

/// Source location of one rendered element. Line is 1-based, column 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceTag {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceTag {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Reads a tag from an element's attributes.
    ///
    /// Returns `None` unless the file attribute is present and both numeric
    /// attributes parse; a partially tagged element is not selectable.
    pub fn from_attributes<'a, F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let file = lookup(SOURCE_FILE_ATTR)?;
        if file.is_empty() {
            return None;
        }
        let line = lookup(SOURCE_LINE_ATTR)?.trim().parse().ok()?;
        let column = lookup(SOURCE_COLUMN_ATTR)?.trim().parse().ok()?;
        Some(Self::new(file, line, column))
    }

    /// Attribute pairs in the order the tagger emits them.
    pub fn to_attributes(&self) -> [(&'static str, String); 3] {
        [
            (SOURCE_FILE_ATTR, self.file.clone()),
            (SOURCE_LINE_ATTR, self.line.to_string()),
            (SOURCE_COLUMN_ATTR, self.column.to_string()),
        ]
    }

    /// Final path component, splitting on either separator.
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file.as_str())
    }

    /// Short `name:line` label for display.
    pub fn location_label(&self) -> String {
        format!("{}:{}", self.file_name(), self.line)
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_from_attributes_complete() {
        let map = attrs(&[
            (SOURCE_FILE_ATTR, "/app/src/Button.tsx"),
            (SOURCE_LINE_ATTR, "12"),
            (SOURCE_COLUMN_ATTR, "4"),
        ]);
        let tag = SourceTag::from_attributes(|name| map.get(name).copied()).unwrap();
        assert_eq!(tag, SourceTag::new("/app/src/Button.tsx", 12, 4));
    }

    #[test]
    fn test_from_attributes_missing_file() {
        let map = attrs(&[(SOURCE_LINE_ATTR, "12"), (SOURCE_COLUMN_ATTR, "4")]);
        assert!(SourceTag::from_attributes(|name| map.get(name).copied()).is_none());
    }

    #[test]
    fn test_from_attributes_unparsable_line() {
        let map = attrs(&[
            (SOURCE_FILE_ATTR, "/app/src/Button.tsx"),
            (SOURCE_LINE_ATTR, "twelve"),
            (SOURCE_COLUMN_ATTR, "4"),
        ]);
        assert!(SourceTag::from_attributes(|name| map.get(name).copied()).is_none());
    }

    #[test]
    fn test_attributes_roundtrip() {
        let tag = SourceTag::new("src/App.tsx", 3, 0);
        let pairs = tag.to_attributes();
        let map: HashMap<&str, &str> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        assert_eq!(SourceTag::from_attributes(|n| map.get(n).copied()), Some(tag));
    }

    #[test]
    fn test_location_label_handles_windows_paths() {
        let tag = SourceTag::new(r"C:\work\app\src\Card.tsx", 40, 2);
        assert_eq!(tag.file_name(), "Card.tsx");
        assert_eq!(tag.location_label(), "Card.tsx:40");
    }
}
