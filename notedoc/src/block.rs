use std::collections::BTreeMap;
use std::ops::Range;

use serde::Serialize;

use crate::classify::SectionType;
use crate::patient::PatientFields;

/// A 0-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Heading,
    Text,
    KeyValue,
}

/// One segment of a note: a heading, a run of plain text, or a run of
/// `key: value` lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Number of `#` markers; headings only.
    pub level: Option<u8>,
    /// Plain heading text with inline markup removed; headings only.
    pub title: Option<String>,
    /// For headings, every line up to the next heading (outer blank lines
    /// dropped). For other blocks, the block's own lines. Always an exact
    /// slice of the source.
    pub content: String,
    pub range: SourceRange,
    /// Character offsets of the whole block in the source.
    pub span: Range<usize>,
    /// Character offsets of `content` in the source.
    pub content_span: Range<usize>,
    pub metadata: BlockMetadata,
}

impl Block {
    pub fn is_heading(&self) -> bool {
        self.kind == BlockKind::Heading
    }

    pub fn section_type(&self) -> Option<SectionType> {
        self.metadata.section_type
    }

    /// Whether `offset` (a character offset into the source) lies inside the block.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.span.contains(&offset)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockMetadata {
    /// Classified from the title; headings only.
    pub section_type: Option<SectionType>,
    /// Pairs extracted from a key-value block.
    pub fields: BTreeMap<String, String>,
    /// Structured demographics; patient-info headings only.
    pub patient: Option<PatientFields>,
}
