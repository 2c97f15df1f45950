//! Per-cell filter predicates

use std::cell::RefCell;

use nucleo::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo::{Matcher, Utf32Str};
use serde::Serialize;

use super::types::RangeFilter;

thread_local! {
    // Scratch space only; scoring depends on the two inputs alone.
    static MATCHER: RefCell<Matcher> = RefCell::new(Matcher::default());
}

/// Outcome of a fuzzy text match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextMatch {
    pub passed: bool,
    /// Closeness score, higher is closer. `0` for an empty query or a miss.
    pub rank: u32,
}

impl TextMatch {
    const MISS: Self = Self {
        passed: false,
        rank: 0,
    };

    const TRIVIAL: Self = Self {
        passed: true,
        rank: 0,
    };
}

/// True when `value` lies within the inclusive range.
///
/// An absent or NaN bound does not constrain its side.
pub fn range_matches(value: f64, range: &RangeFilter) -> bool {
    let above_min = range.min.is_none_or(|min| min.is_nan() || value >= min);
    let below_max = range.max.is_none_or(|max| max.is_nan() || value <= max);
    above_min && below_max
}

/// Case-insensitive fuzzy match of `query` against `value`.
///
/// Whitespace separates words that must each match. Characters of a word
/// must appear in order but need not be contiguous.
pub fn text_matches(value: &str, query: &str) -> TextMatch {
    if query.trim().is_empty() {
        return TextMatch::TRIVIAL;
    }

    let pattern = Pattern::new(
        query,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
    );

    let mut buf = Vec::new();
    let haystack = Utf32Str::new(value, &mut buf);

    let score = MATCHER.with(|matcher| pattern.score(haystack, &mut matcher.borrow_mut()));

    match score {
        Some(rank) => TextMatch { passed: true, rank },
        None => TextMatch::MISS,
    }
}
