//! Character n-gram similarity.

use std::collections::HashSet;

/// Distinct contiguous `n`-character substrings of `s`.
///
/// Characters are Unicode scalar values. Strings shorter than `n` (and any
/// string when `n` is zero) have no n-grams.
///
/// # Examples
///
/// ```
/// use stackpulse_identity::ngram::ngrams;
///
/// let grams = ngrams("abcd", 3);
/// assert_eq!(grams.len(), 2);
/// assert!(grams.contains("abc") && grams.contains("bcd"));
/// assert!(ngrams("ab", 3).is_empty());
/// ```
pub fn ngrams(s: &str, n: usize) -> HashSet<String> {
    let chars: Vec<char> = s.chars().collect();
    if n == 0 || chars.len() < n {
        return HashSet::new();
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Jaccard similarity of two n-gram sets; 0.0 when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Jaccard similarity of the `n`-grams of two strings.
///
/// # Examples
///
/// ```
/// use stackpulse_identity::ngram::similarity;
///
/// assert_eq!(similarity("smith", "smith", 3), 1.0);
/// assert_eq!(similarity("ab", "ab", 3), 0.0);
/// ```
pub fn similarity(a: &str, b: &str, n: usize) -> f64 {
    jaccard(&ngrams(a, n), &ngrams(b, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_ngrams_are_counted_once() {
        assert_eq!(ngrams("aaaa", 3).len(), 1);
    }

    #[test]
    fn unicode_scalars_not_bytes() {
        let grams = ngrams("émile", 3);
        assert!(grams.contains("émi"));
        assert_eq!(grams.len(), 3);
    }

    #[test]
    fn similarity_is_symmetric() {
        let pairs = [("John Smith", "Jon Smith"), ("alice", "alicia"), ("x", "xyz")];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b, 3), similarity(b, a, 3));
        }
    }

    #[test]
    fn close_names_clear_threshold() {
        assert!(similarity("John Smith", "Jon Smith", 3) >= 0.30);
        assert!(similarity("John Smith", "Maria Garcia", 3) < 0.30);
    }

    #[test]
    fn disjoint_sets_score_zero() {
        assert_eq!(similarity("abc", "xyz", 3), 0.0);
    }

    #[test]
    fn zero_length_ngrams_are_empty() {
        assert!(ngrams("abc", 0).is_empty());
        assert_eq!(similarity("abc", "abc", 0), 0.0);
    }
}
