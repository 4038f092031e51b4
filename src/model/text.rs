use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-based line/column position inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct LinePosition {
    pub line: u32,
    pub offset: u32,
}

impl LinePosition {
    pub fn new(line: u32, offset: u32) -> Self {
        Self { line, offset }
    }

    /// The first character of a file.
    pub fn start() -> Self {
        Self::default()
    }
}

impl fmt::Display for LinePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.offset)
    }
}

/// A span of source text, optionally tagged with the file it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRange {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    pub start_line: LinePosition,
    pub end_line: LinePosition,
}

impl LineRange {
    pub fn new(file_name: impl Into<String>, start: LinePosition, end: LinePosition) -> Self {
        Self {
            file_name: file_name.into(),
            start_line: start,
            end_line: end,
        }
    }

    /// An empty range at `position`, used for insertions.
    pub fn at(position: LinePosition) -> Self {
        Self {
            file_name: String::new(),
            start_line: position,
            end_line: position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_line == self.end_line
    }

    /// Drops the file tag; edits address files through their map key.
    pub fn without_file(&self) -> Self {
        Self {
            file_name: String::new(),
            ..self.clone()
        }
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file_name.is_empty() {
            write!(f, "({})-({})", self.start_line, self.end_line)
        } else {
            write!(f, "{}:({})-({})", self.file_name, self.start_line, self.end_line)
        }
    }
}

/// A single replacement of `range` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: LineRange,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: LineRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    /// An edit that removes `range`.
    pub fn delete(range: LineRange) -> Self {
        Self::new(range, String::new())
    }
}
