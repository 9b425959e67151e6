use crate::code::Code;
use crate::dictionary::TermEntry;
use crate::index::TermIndex;
use crate::normalize::is_word_char;
use crate::text::CharIndexed;

/// An occurrence of a term in a text buffer, as a half-open character range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<'a> {
    pub term: &'a TermEntry,
    /// The exact source slice, in its original case.
    pub matched_text: String,
    pub start: usize,
    pub end: usize,
}

/// Raw matcher output, before conflict resolution.
pub type Candidate<'a> = Span<'a>;

/// A span selected by the resolver.
pub type Annotation<'a> = Span<'a>;

impl<'a> Span<'a> {
    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &Span<'_>) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn codes(&self) -> &'a [Code] {
        &self.term.codes
    }

    pub fn primary_code(&self) -> Option<&'a Code> {
        self.term.codes.first()
    }
}

/// Finds every word-bounded occurrence of every indexed surface form.
pub struct SpanMatcher<'a> {
    index: &'a TermIndex,
}

impl<'a> SpanMatcher<'a> {
    pub fn new(index: &'a TermIndex) -> Self {
        SpanMatcher { index }
    }

    pub fn find_candidates(&self, text: &str) -> Vec<Candidate<'a>> {
        self.find_in(&CharIndexed::new(text))
    }

    pub(crate) fn find_in(&self, text: &CharIndexed<'_>) -> Vec<Candidate<'a>> {
        let source = text.as_str();
        let mut candidates = Vec::new();

        for matcher in self.index.matchers() {
            let term = self.index.entry_at(matcher.entry);
            let mut at = 0;

            while at <= source.len() {
                let Some(found) = matcher.regex.find_at(source, at) else {
                    break;
                };
                if found.start() == found.end() {
                    break;
                }

                if has_word_boundaries(source, found.start(), found.end()) {
                    candidates.push(Span {
                        term,
                        matched_text: found.as_str().to_string(),
                        start: text.char_offset(found.start()),
                        end: text.char_offset(found.end()),
                    });
                    at = found.end();
                } else {
                    // Retry one character later; a shorter hit may start inside.
                    let width = source[found.start()..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                    at = found.start() + width;
                }
            }
        }

        tracing::trace!(count = candidates.len(), "collected candidate spans");
        candidates
    }
}

/// No word character may touch either end of the byte range.
fn has_word_boundaries(source: &str, start: usize, end: usize) -> bool {
    let before_ok = source[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !is_word_char(c));
    let after_ok = source[end..].chars().next().is_none_or(|c| !is_word_char(c));
    before_ok && after_ok
}
