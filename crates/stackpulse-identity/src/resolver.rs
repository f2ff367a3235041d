//! Team size from a set of commit authors.

use std::collections::HashSet;

use stackpulse_core::{Author, IdentityConfig};

use crate::ngram;

/// Groups author spellings that likely belong to the same person.
///
/// Two authors are the same identity when their display names or their
/// email local parts are fuzzy-equal: the Jaccard similarity of their
/// character n-grams reaches the configured threshold.
///
/// # Examples
///
/// ```
/// use stackpulse_core::{Author, IdentityConfig};
/// use stackpulse_identity::IdentityResolver;
///
/// let resolver = IdentityResolver::new(&IdentityConfig::default());
/// let authors = vec![
///     Author::new("John Smith", "j@x.com"),
///     Author::new("Jon Smith", "jon@x.com"),
///     Author::new("Maria Garcia", "maria@x.com"),
/// ];
/// assert_eq!(resolver.team_size(&authors), 2);
/// ```
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    ngram_size: usize,
    threshold: f64,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(&IdentityConfig::default())
    }
}

impl IdentityResolver {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            ngram_size: config.ngram_size,
            threshold: config.similarity_threshold,
        }
    }

    /// Whether two strings are close enough to name the same person.
    pub fn fuzzy_equal(&self, a: &str, b: &str) -> bool {
        ngram::similarity(a, b, self.ngram_size) >= self.threshold
    }

    /// Whether two authors are the same identity.
    pub fn same_identity(&self, a: &Author, b: &Author) -> bool {
        self.fuzzy_equal(&a.name, &b.name)
            || self.fuzzy_equal(a.email_local_part(), b.email_local_part())
    }

    /// Number of distinct people behind `authors`.
    ///
    /// Exact duplicates collapse first. An author counts unless an earlier
    /// one in the list is the same identity; comparison is over every pair.
    pub fn team_size(&self, authors: &[Author]) -> usize {
        let mut seen = HashSet::new();
        let unique: Vec<&Author> = authors.iter().filter(|a| seen.insert(*a)).collect();

        let mut matched = vec![false; unique.len()];
        for i in 0..unique.len() {
            for j in (i + 1)..unique.len() {
                if !matched[j] && self.same_identity(unique[i], unique[j]) {
                    matched[j] = true;
                }
            }
        }

        let size = matched.iter().filter(|m| !**m).count();
        tracing::debug!(authors = authors.len(), unique = unique.len(), size, "resolved team size");
        size
    }
}
