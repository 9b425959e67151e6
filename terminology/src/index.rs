use std::collections::{BTreeMap, HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::dictionary::{TermDictionary, TermEntry};
use crate::error::{DictionaryError, DictionaryErrorKind};
use crate::normalize::{fold_surface, normalize};

/// A precompiled, case-insensitive matcher for one surface form.
#[derive(Debug)]
pub(crate) struct KeyMatcher {
    pub(crate) entry: usize,
    pub(crate) regex: Regex,
}

/// Lookup structures derived from a [`TermDictionary`].
///
/// Built once and shared read-only; every recognition call borrows it.
#[derive(Debug)]
pub struct TermIndex {
    dictionary: TermDictionary,
    canonical_keyed: HashMap<String, usize>,
    alias_keyed: HashMap<String, usize>,
    code_keyed: HashMap<String, usize>,
    /// Every canonical and alias key in ascending order, for prefix queries.
    sorted_keys: Vec<(String, usize)>,
    /// Ordered by folded surface so candidate generation is deterministic.
    matchers: Vec<KeyMatcher>,
}

impl TermIndex {
    pub fn new(dictionary: TermDictionary) -> Result<Self, DictionaryError> {
        let mut canonical_keyed = HashMap::new();
        let mut alias_keyed = HashMap::new();
        let mut code_keyed = HashMap::new();
        let mut all_keys: BTreeMap<String, usize> = BTreeMap::new();
        let mut surfaces: BTreeMap<String, usize> = BTreeMap::new();

        for (idx, entry) in dictionary.entries().iter().enumerate() {
            let key = normalize(&entry.canonical_term);
            all_keys.insert(key.clone(), idx);
            canonical_keyed.insert(key, idx);

            for alias in &entry.aliases {
                let key = normalize(alias);
                all_keys.insert(key.clone(), idx);
                alias_keyed.insert(key, idx);
            }
            for code in &entry.codes {
                code_keyed.insert(code.code.clone(), idx);
            }
            for surface in entry.surface_forms() {
                surfaces.entry(fold_surface(surface)).or_insert(idx);
            }
        }

        let matchers = surfaces
            .into_iter()
            .map(|(surface, entry)| compile_matcher(surface, entry))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            terms = dictionary.len(),
            keys = all_keys.len(),
            matchers = matchers.len(),
            "built term index"
        );

        Ok(TermIndex {
            dictionary,
            canonical_keyed,
            alias_keyed,
            code_keyed,
            sorted_keys: all_keys.into_iter().collect(),
            matchers,
        })
    }

    /// Find the entry whose canonical term or alias normalizes to the same
    /// key as `text`. Canonical keys are checked first.
    pub fn lookup_by_text(&self, text: &str) -> Option<&TermEntry> {
        let key = normalize(text);
        self.canonical_keyed
            .get(&key)
            .or_else(|| self.alias_keyed.get(&key))
            .map(|&idx| &self.dictionary.entries()[idx])
    }

    /// Exact, case-sensitive code lookup.
    pub fn lookup_by_code(&self, code: &str) -> Option<&TermEntry> {
        self.code_keyed
            .get(code)
            .map(|&idx| &self.dictionary.entries()[idx])
    }

    /// Entries whose canonical or alias key starts with the normalized
    /// `prefix`, in key order, each entry at most once.
    pub fn complete(&self, prefix: &str, limit: usize) -> Vec<&TermEntry> {
        let prefix = normalize(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }
        let first = self
            .sorted_keys
            .partition_point(|(key, _)| key.as_str() < prefix.as_str());

        let mut seen = HashSet::new();
        self.sorted_keys[first..]
            .iter()
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(_, idx)| seen.insert(*idx))
            .take(limit)
            .map(|&(_, idx)| &self.dictionary.entries()[idx])
            .collect()
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    /// All entries in dictionary order.
    pub fn terms(&self) -> &[TermEntry] {
        self.dictionary.entries()
    }

    pub(crate) fn entry_at(&self, idx: usize) -> &TermEntry {
        &self.dictionary.entries()[idx]
    }

    pub(crate) fn matchers(&self) -> &[KeyMatcher] {
        &self.matchers
    }
}

/// Escape the folded surface; internal whitespace matches any whitespace run.
fn compile_matcher(surface: String, entry: usize) -> Result<KeyMatcher, DictionaryError> {
    let pattern = surface
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| {
            DictionaryError::new(DictionaryErrorKind::Pattern {
                surface,
                message: e.to_string(),
            })
        })?;
    Ok(KeyMatcher { entry, regex })
}
