use std::ops::Range;
use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

/// What made a dictionary structurally invalid.
#[derive(Debug, Error)]
pub enum DictionaryErrorKind {
    #[error("entry {index} has an empty canonical term")]
    EmptyCanonicalTerm { index: usize },
    #[error("term `{term}` has no codes")]
    MissingCodes { term: String },
    #[error("term `{term}` has a code with an empty code string")]
    EmptyCode { term: String },
    #[error("term `{term}` has an empty alias")]
    EmptyAlias { term: String },
    #[error("key `{key}` is claimed by both `{first}` and `{second}`")]
    AmbiguousKey {
        key: String,
        first: String,
        second: String,
    },
    #[error("code `{code}` is assigned to both `{first}` and `{second}`")]
    DuplicateCode {
        code: String,
        first: String,
        second: String,
    },
    #[error("cannot build a matcher for `{surface}`: {message}")]
    Pattern { surface: String, message: String },
    #[error("invalid dictionary file: {0}")]
    Toml(String),
    #[error("cannot read dictionary `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A dictionary load failure, optionally pointing into the dictionary source.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct DictionaryError {
    pub kind: DictionaryErrorKind,
    /// Byte span in the dictionary source, when it came from a file.
    pub span: Option<Range<usize>>,
}

impl DictionaryError {
    pub fn new(kind: DictionaryErrorKind) -> Self {
        DictionaryError { kind, span: None }
    }

    pub fn with_span(mut self, span: Option<Range<usize>>) -> Self {
        self.span = span;
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        let labels = match &self.span {
            Some(span) => vec![Label::primary(file_id, span.clone())],
            None => Vec::new(),
        };
        let notes = match &self.kind {
            DictionaryErrorKind::AmbiguousKey { .. } => {
                vec!["every term and alias must resolve to exactly one entry".to_string()]
            }
            DictionaryErrorKind::DuplicateCode { .. } => {
                vec!["a code may belong to only one entry".to_string()]
            }
            _ => Vec::new(),
        };
        Diagnostic::error()
            .with_message(self.kind.to_string())
            .with_labels(labels)
            .with_notes(notes)
    }
}

impl From<DictionaryErrorKind> for DictionaryError {
    fn from(kind: DictionaryErrorKind) -> Self {
        DictionaryError::new(kind)
    }
}
