use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};
use toml::Spanned;
use tracing::debug;

use crate::code::{Code, Vocabulary};
use crate::error::{DictionaryError, DictionaryErrorKind};
use crate::normalize::normalize;

/// Source of the dictionary used when none is configured.
pub const BUILTIN_DICTIONARY: &str = include_str!("../data/terms.toml");

/// A known clinical concept: its preferred name, codes and surface forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermEntry {
    pub canonical_term: String,
    /// Never empty once the entry is part of a [`TermDictionary`].
    pub codes: Vec<Code>,
    pub aliases: BTreeSet<String>,
    pub context_hints: BTreeSet<String>,
}

impl TermEntry {
    pub fn new(canonical_term: impl Into<String>, codes: Vec<Code>) -> Self {
        TermEntry {
            canonical_term: canonical_term.into(),
            codes,
            aliases: BTreeSet::new(),
            context_hints: BTreeSet::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.insert(alias.into());
        self
    }

    pub fn with_context_hint(mut self, hint: impl Into<String>) -> Self {
        self.context_hints.insert(hint.into());
        self
    }

    pub fn primary_code(&self) -> Option<&Code> {
        self.codes.first()
    }

    /// The canonical term followed by every alias.
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_term.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether two entries name the same concept: identical canonical names
    /// after normalization, or either one lists the other's canonical name
    /// among its aliases.
    pub fn is_equivalent_to(&self, other: &TermEntry) -> bool {
        let own = normalize(&self.canonical_term);
        let theirs = normalize(&other.canonical_term);
        own == theirs
            || self.aliases.iter().any(|a| normalize(a) == theirs)
            || other.aliases.iter().any(|a| normalize(a) == own)
    }
}

/// The immutable, validated collection of term entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDictionary {
    entries: Vec<TermEntry>,
}

impl TermDictionary {
    /// Validate and wrap a list of entries.
    pub fn new(entries: Vec<TermEntry>) -> Result<Self, DictionaryError> {
        validate(&entries, &[])?;
        Ok(TermDictionary { entries })
    }

    /// Parse the TOML dictionary format (an array of `[[term]]` tables).
    pub fn from_toml_str(source: &str) -> Result<Self, DictionaryError> {
        let raw: RawDictionary = toml::from_str(source).map_err(|e| {
            DictionaryError::new(DictionaryErrorKind::Toml(e.message().to_string()))
                .with_span(e.span())
        })?;

        let mut spans = Vec::with_capacity(raw.terms.len());
        let mut entries = Vec::with_capacity(raw.terms.len());
        for term in raw.terms {
            spans.push(Some(term.term.span()));
            entries.push(term.into_entry());
        }

        validate(&entries, &spans)?;
        debug!(entries = entries.len(), "loaded term dictionary");
        Ok(TermDictionary { entries })
    }

    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let source = std::fs::read_to_string(path).map_err(|source| {
            DictionaryError::new(DictionaryErrorKind::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;
        Self::from_toml_str(&source)
    }

    /// The sample dictionary shipped with the crate.
    pub fn builtin() -> Result<Self, DictionaryError> {
        Self::from_toml_str(BUILTIN_DICTIONARY)
    }

    pub fn entries(&self) -> &[TermEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject entries that would silently corrupt the index. `spans[i]`, when
/// present, locates entry `i` in its source file.
fn validate(entries: &[TermEntry], spans: &[Option<Range<usize>>]) -> Result<(), DictionaryError> {
    let span_of = |i: usize| spans.get(i).cloned().flatten();
    let mut key_owner: HashMap<String, usize> = HashMap::new();
    let mut code_owner: HashMap<&str, usize> = HashMap::new();

    for (i, entry) in entries.iter().enumerate() {
        let fail = |kind: DictionaryErrorKind| Err(DictionaryError::new(kind).with_span(span_of(i)));

        let canonical_key = normalize(&entry.canonical_term);
        if canonical_key.is_empty() {
            return fail(DictionaryErrorKind::EmptyCanonicalTerm { index: i });
        }
        if entry.codes.is_empty() {
            return fail(DictionaryErrorKind::MissingCodes {
                term: entry.canonical_term.clone(),
            });
        }
        if entry.codes.iter().any(|c| c.code.trim().is_empty()) {
            return fail(DictionaryErrorKind::EmptyCode {
                term: entry.canonical_term.clone(),
            });
        }

        let mut keys = vec![canonical_key];
        for alias in &entry.aliases {
            let key = normalize(alias);
            if key.is_empty() {
                return fail(DictionaryErrorKind::EmptyAlias {
                    term: entry.canonical_term.clone(),
                });
            }
            keys.push(key);
        }

        for key in keys {
            match key_owner.get(&key) {
                Some(&owner) if owner != i => {
                    return fail(DictionaryErrorKind::AmbiguousKey {
                        key,
                        first: entries[owner].canonical_term.clone(),
                        second: entry.canonical_term.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    key_owner.insert(key, i);
                }
            }
        }

        for code in &entry.codes {
            match code_owner.get(code.code.as_str()) {
                Some(&owner) if owner != i => {
                    return fail(DictionaryErrorKind::DuplicateCode {
                        code: code.code.clone(),
                        first: entries[owner].canonical_term.clone(),
                        second: entry.canonical_term.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    code_owner.insert(&code.code, i);
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TOML shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDictionary {
    #[serde(default, rename = "term")]
    terms: Vec<RawTerm>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTerm {
    term: Spanned<String>,
    #[serde(default)]
    codes: Vec<RawCode>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    context_hints: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCode {
    code: String,
    #[serde(default)]
    description: String,
    vocabulary: Vocabulary,
    #[serde(default)]
    category: Option<String>,
}

impl RawTerm {
    fn into_entry(self) -> TermEntry {
        TermEntry {
            canonical_term: self.term.into_inner(),
            codes: self
                .codes
                .into_iter()
                .map(|c| Code {
                    code: c.code,
                    description: c.description,
                    vocabulary: c.vocabulary,
                    category: c.category,
                })
                .collect(),
            aliases: self.aliases.into_iter().collect(),
            context_hints: self.context_hints.into_iter().collect(),
        }
    }
}
