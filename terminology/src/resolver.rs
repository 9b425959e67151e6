use std::cmp::Reverse;

use serde::Deserialize;
use tracing::trace;

use crate::matcher::{Annotation, Candidate};
use crate::text::CharIndexed;

pub const DEFAULT_PROXIMITY_WINDOW: usize = 10;

pub const DEFAULT_JOINERS: [char; 7] = ['-', '–', '—', ',', ';', ':', '.'];

/// Tuning for the contextual conflict rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Largest character gap between an accepted annotation and a candidate
    /// for the candidate to count as a restatement of it.
    pub proximity_window: usize,
    /// Punctuation allowed (next to whitespace) inside that gap.
    pub joiners: Vec<char>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            proximity_window: DEFAULT_PROXIMITY_WINDOW,
            joiners: DEFAULT_JOINERS.to_vec(),
        }
    }
}

/// Why a candidate lost to an accepted annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conflict {
    Overlap,
    /// An equivalent term sits just before it, separated only by joiners,
    /// as in `CHF - congestive heart failure`.
    Contextual,
}

/// Reduce candidates to a non-overlapping annotation set ordered by start.
///
/// Candidates are sorted by start, longer first at equal starts, then scanned
/// once; each one is kept unless it conflicts with an already kept
/// annotation. Rejections are final.
pub fn resolve<'a>(
    candidates: Vec<Candidate<'a>>,
    text: &str,
    config: &ResolverConfig,
) -> Vec<Annotation<'a>> {
    resolve_in(candidates, &CharIndexed::new(text), config)
}

pub(crate) fn resolve_in<'a>(
    mut candidates: Vec<Candidate<'a>>,
    text: &CharIndexed<'_>,
    config: &ResolverConfig,
) -> Vec<Annotation<'a>> {
    sort_candidates(&mut candidates);

    let mut accepted: Vec<Annotation<'a>> = Vec::new();
    for candidate in candidates {
        match find_conflict(&candidate, &accepted, text, config) {
            Some(conflict) => {
                trace!(
                    term = %candidate.term.canonical_term,
                    start = candidate.start,
                    end = candidate.end,
                    ?conflict,
                    "rejected candidate"
                );
            }
            None => accepted.push(candidate),
        }
    }
    accepted
}

/// Start ascending, length descending; the remaining keys only make the
/// order total.
fn sort_candidates(candidates: &mut [Candidate<'_>]) {
    candidates.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| Reverse(a.len()).cmp(&Reverse(b.len())))
            .then_with(|| a.term.canonical_term.cmp(&b.term.canonical_term))
            .then_with(|| a.matched_text.cmp(&b.matched_text))
    });
}

fn find_conflict(
    candidate: &Candidate<'_>,
    accepted: &[Annotation<'_>],
    text: &CharIndexed<'_>,
    config: &ResolverConfig,
) -> Option<Conflict> {
    // Accepted spans are disjoint and start-ordered, so their ends ascend too:
    // once one ends beyond the window, every earlier one does as well.
    for kept in accepted.iter().rev() {
        if kept.end + config.proximity_window < candidate.start {
            break;
        }
        if candidate.overlaps(kept) {
            return Some(Conflict::Overlap);
        }
        if restates(kept, candidate, text, config) {
            return Some(Conflict::Contextual);
        }
    }
    None
}

fn restates(
    kept: &Annotation<'_>,
    candidate: &Candidate<'_>,
    text: &CharIndexed<'_>,
    config: &ResolverConfig,
) -> bool {
    if candidate.start < kept.end || candidate.start - kept.end > config.proximity_window {
        return false;
    }
    let gap = text.slice(kept.end, candidate.start);
    gap.chars()
        .all(|c| c.is_whitespace() || config.joiners.contains(&c))
        && candidate.term.is_equivalent_to(kept.term)
}
