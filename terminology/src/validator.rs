use serde::Serialize;

use crate::code::Vocabulary;
use crate::dictionary::TermEntry;
use crate::index::TermIndex;

/// The vocabulary an unknown code looks like it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeShape {
    /// One uppercase letter, two digits, optional `.d` or `.dd`.
    Icd10,
    /// Digits only.
    RxNorm,
    Unrecognized,
}

impl CodeShape {
    pub fn expected_vocabulary(&self) -> Option<Vocabulary> {
        match self {
            CodeShape::Icd10 => Some(Vocabulary::Icd10),
            CodeShape::RxNorm => Some(Vocabulary::RxNorm),
            CodeShape::Unrecognized => None,
        }
    }
}

/// Outcome of [`TermIndex::validate_code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeValidation<'a> {
    Valid { term: &'a TermEntry },
    Invalid { reason: CodeShape },
}

impl<'a> CodeValidation<'a> {
    pub fn is_valid(&self) -> bool {
        matches!(self, CodeValidation::Valid { .. })
    }

    pub fn term(&self) -> Option<&'a TermEntry> {
        match self {
            CodeValidation::Valid { term } => Some(term),
            CodeValidation::Invalid { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<CodeShape> {
        match self {
            CodeValidation::Valid { .. } => None,
            CodeValidation::Invalid { reason } => Some(*reason),
        }
    }
}

impl TermIndex {
    /// Report whether `code` is in the index; if not, classify its shape so
    /// the caller can say what kind of code was probably intended.
    pub fn validate_code(&self, code: &str) -> CodeValidation<'_> {
        match self.lookup_by_code(code) {
            Some(term) => CodeValidation::Valid { term },
            None => CodeValidation::Invalid {
                reason: classify_code_shape(code),
            },
        }
    }
}

pub fn classify_code_shape(code: &str) -> CodeShape {
    let bytes = code.as_bytes();
    match bytes {
        [letter, d1, d2, rest @ ..]
            if letter.is_ascii_uppercase() && d1.is_ascii_digit() && d2.is_ascii_digit() =>
        {
            match rest {
                [] => CodeShape::Icd10,
                [b'.', decimals @ ..]
                    if (1..=2).contains(&decimals.len())
                        && decimals.iter().all(u8::is_ascii_digit) =>
                {
                    CodeShape::Icd10
                }
                _ => CodeShape::Unrecognized,
            }
        }
        [] => CodeShape::Unrecognized,
        _ if bytes.iter().all(u8::is_ascii_digit) => CodeShape::RxNorm,
        _ => CodeShape::Unrecognized,
    }
}
