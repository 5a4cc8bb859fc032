//! Pluggable similarity strategies for fuzzy dictionary lookup.
//!
//! A strategy only scores a (query, candidate) pair; ranking and tie
//! breaking happen in the dictionary, which keeps strategies small and
//! easy to test on their own.

use std::fmt::Debug;

use crate::config::FuzzyConfig;

/// Scores how far a candidate entry is from a query.
///
/// Both strings arrive normalized. `None` means "not similar"; otherwise
/// lower scores rank first.
pub trait SimilarityStrategy: Debug + Send + Sync {
    fn distance(&self, query: &str, candidate: &str) -> Option<usize>;
}

/// Never matches anything; only exact lookups succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactOnly;

impl SimilarityStrategy for ExactOnly {
    fn distance(&self, _query: &str, _candidate: &str) -> Option<usize> {
        None
    }
}

/// Levenshtein distance bounded by `max_distance`.
#[derive(Debug, Clone, Copy)]
pub struct EditDistance {
    pub max_distance: usize,
    pub min_length: usize,
}

impl EditDistance {
    pub fn new(max_distance: usize, min_length: usize) -> Self {
        EditDistance {
            max_distance,
            min_length,
        }
    }
}

impl From<&FuzzyConfig> for EditDistance {
    fn from(config: &FuzzyConfig) -> Self {
        EditDistance::new(config.max_distance, config.min_length)
    }
}

impl SimilarityStrategy for EditDistance {
    fn distance(&self, query: &str, candidate: &str) -> Option<usize> {
        let query_len = query.chars().count();
        if query_len < self.min_length {
            return None;
        }
        let candidate_len = candidate.chars().count();
        if query_len.abs_diff(candidate_len) > self.max_distance {
            return None;
        }

        let distance = levenshtein(query, candidate);
        (distance <= self.max_distance).then_some(distance)
    }
}

/// Classic two-row Levenshtein distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        current[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("hello", "helo"), 1);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn edit_distance_respects_bounds() {
        let strategy = EditDistance::new(1, 4);
        assert_eq!(strategy.distance("helo", "hello"), Some(1));
        assert_eq!(strategy.distance("hello", "hello"), Some(0));
        assert_eq!(strategy.distance("hlo", "hello"), None);
        // Too short to be considered at all.
        assert_eq!(strategy.distance("hu", "hi"), None);
    }

    #[test]
    fn exact_only_never_matches() {
        assert_eq!(ExactOnly.distance("hello", "hello"), None);
    }
}
