use std::collections::BTreeMap;
use std::ops::Range;

use crate::block::{Block, BlockKind, BlockMetadata, Position, SourceRange};
use crate::classify::{SectionType, classify_section};
use crate::parser::heading::parse_heading;
use crate::parser::lines::Line;
use crate::patient::PatientFieldsParser;

#[derive(Debug, Clone, PartialEq)]
enum LineKind {
    Blank,
    Heading { level: u8, title: String },
    /// `<!-- ... -->`, `// ...`, or a `#` line that is not a heading.
    Comment,
    /// A non-comment line containing `:`.
    Field,
    Plain,
}

fn classify_line(text: &str) -> LineKind {
    if text.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some((level, title)) = parse_heading(text) {
        return LineKind::Heading { level, title };
    }
    let trimmed = text.trim_start();
    if trimmed.starts_with("<!--") || trimmed.starts_with("//") || trimmed.starts_with('#') {
        LineKind::Comment
    } else if text.contains(':') {
        LineKind::Field
    } else {
        LineKind::Plain
    }
}

/// Split a `key: value` line at its first colon. A leading `- ` or `* `
/// list marker is not part of the key; an empty key is not a field.
pub(crate) fn parse_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    let key = key
        .strip_prefix("- ")
        .or_else(|| key.strip_prefix("* "))
        .unwrap_or(key)
        .trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

/// Segment lines into blocks in one forward pass.
///
/// A heading's content looks ahead to the next heading; the body lines are
/// then segmented into text and key-value blocks in their own right, so they
/// follow their heading in the flat list.
pub(crate) fn segment(
    source: &str,
    lines: &[Line<'_>],
    patients: &dyn PatientFieldsParser,
) -> Vec<Block> {
    let kinds: Vec<LineKind> = lines.iter().map(|l| classify_line(l.text)).collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        match &kinds[i] {
            LineKind::Blank => {
                i += 1;
            }
            LineKind::Heading { level, title } => {
                let next = next_heading(&kinds, i + 1);
                blocks.push(heading_block(
                    source,
                    lines,
                    i,
                    next,
                    *level,
                    title.clone(),
                    patients,
                ));
                i += 1;
            }
            LineKind::Field => {
                // Runs to the next heading regardless of blank or plain lines.
                let next = next_heading(&kinds, i);
                let last = last_non_blank(lines, i, next).unwrap_or(i);
                let fields = lines[i..=last]
                    .iter()
                    .zip(&kinds[i..=last])
                    .filter(|(_, kind)| **kind == LineKind::Field)
                    .filter_map(|(line, _)| parse_field(line.text))
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                blocks.push(body_block(source, lines, i, last, BlockKind::KeyValue, fields));
                i = next;
            }
            LineKind::Comment | LineKind::Plain => {
                let mut end = i + 1;
                while end < lines.len() && matches!(kinds[end], LineKind::Comment | LineKind::Plain)
                {
                    end += 1;
                }
                blocks.push(body_block(
                    source,
                    lines,
                    i,
                    end - 1,
                    BlockKind::Text,
                    BTreeMap::new(),
                ));
                i = end;
            }
        }
    }

    blocks
}

fn next_heading(kinds: &[LineKind], from: usize) -> usize {
    kinds[from.min(kinds.len())..]
        .iter()
        .position(|k| matches!(k, LineKind::Heading { .. }))
        .map_or(kinds.len(), |offset| from + offset)
}

fn first_non_blank(lines: &[Line<'_>], from: usize, to: usize) -> Option<usize> {
    (from..to).find(|&i| !lines[i].is_blank())
}

fn last_non_blank(lines: &[Line<'_>], from: usize, to: usize) -> Option<usize> {
    (from..to).rev().find(|&i| !lines[i].is_blank())
}

/// Exact source text, character span and line range of lines `first..=last`.
fn extent(
    source: &str,
    lines: &[Line<'_>],
    first: usize,
    last: usize,
) -> (String, Range<usize>, SourceRange) {
    let content = source[lines[first].byte_start..lines[last].byte_end()].to_string();
    let span = lines[first].char_start..lines[last].char_end();
    let range = SourceRange {
        start: Position {
            line: first,
            column: 0,
        },
        end: Position {
            line: last,
            column: lines[last].char_len,
        },
    };
    (content, span, range)
}

fn heading_block(
    source: &str,
    lines: &[Line<'_>],
    line: usize,
    next: usize,
    level: u8,
    title: String,
    patients: &dyn PatientFieldsParser,
) -> Block {
    let (_, heading_span, heading_range) = extent(source, lines, line, line);

    let body = first_non_blank(lines, line + 1, next)
        .zip(last_non_blank(lines, line + 1, next));
    let (content, content_span, range) = match body {
        Some((first, last)) => {
            let (content, content_span, body_range) = extent(source, lines, first, last);
            let range = SourceRange {
                start: heading_range.start,
                end: body_range.end,
            };
            (content, content_span, range)
        }
        None => (
            String::new(),
            heading_span.end..heading_span.end,
            heading_range,
        ),
    };

    let section_type = classify_section(&title);
    let patient = match section_type {
        Some(SectionType::PatientInfo) => Some(patients.parse(&content)),
        _ => None,
    };

    Block {
        kind: BlockKind::Heading,
        level: Some(level),
        title: Some(title),
        span: heading_span.start..content_span.end.max(heading_span.end),
        content,
        content_span,
        range,
        metadata: BlockMetadata {
            section_type,
            fields: BTreeMap::new(),
            patient,
        },
    }
}

fn body_block(
    source: &str,
    lines: &[Line<'_>],
    first: usize,
    last: usize,
    kind: BlockKind,
    fields: BTreeMap<String, String>,
) -> Block {
    let (content, span, range) = extent(source, lines, first, last);
    Block {
        kind,
        level: None,
        title: None,
        content,
        content_span: span.clone(),
        span,
        range,
        metadata: BlockMetadata {
            fields,
            ..BlockMetadata::default()
        },
    }
}
