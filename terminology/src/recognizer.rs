use tracing::debug;

use crate::index::TermIndex;
use crate::matcher::{Annotation, Candidate, SpanMatcher};
use crate::resolver::{self, ResolverConfig};
use crate::text::CharIndexed;

/// Runs the matcher and the resolver against one shared index.
#[derive(Debug, Clone)]
pub struct Recognizer<'a> {
    index: &'a TermIndex,
    config: ResolverConfig,
}

impl<'a> Recognizer<'a> {
    pub fn new(index: &'a TermIndex) -> Self {
        Recognizer {
            index,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn index(&self) -> &'a TermIndex {
        self.index
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Every candidate occurrence, unresolved and in matcher order.
    pub fn candidates(&self, text: &str) -> Vec<Candidate<'a>> {
        SpanMatcher::new(self.index).find_candidates(text)
    }

    /// The final annotation set: non-overlapping, ordered by start offset.
    pub fn recognize(&self, text: &str) -> Vec<Annotation<'a>> {
        let chars = CharIndexed::new(text);
        let candidates = SpanMatcher::new(self.index).find_in(&chars);
        let found = candidates.len();
        let annotations = resolver::resolve_in(candidates, &chars, &self.config);
        debug!(
            chars = chars.len(),
            candidates = found,
            annotations = annotations.len(),
            "recognized terms"
        );
        annotations
    }
}

/// Recognize terms with the default resolver settings.
pub fn recognize_terms<'a>(index: &'a TermIndex, text: &str) -> Vec<Annotation<'a>> {
    Recognizer::new(index).recognize(text)
}
