//! Reserved-word usage counting.

use stackpulse_core::{CommitStats, StatType};

/// Count, per keyword, the added and deleted lines containing it.
///
/// Containment is a plain substring test, so a keyword inside a longer
/// identifier counts too, and several occurrences on one line count once.
/// Keywords found on no line are left out. Records follow `keywords` order.
///
/// # Examples
///
/// ```
/// use stackpulse_extractors::keywords::keyword_stats;
///
/// let stats = keyword_stats("java", &["new", "for"], &["x = new Y(new Z());"], &[]);
/// assert_eq!(stats.len(), 1);
/// assert_eq!(stats[0].tech, "java:new");
/// assert_eq!(stats[0].num_lines_added, 1);
/// ```
pub fn keyword_stats(
    language: &str,
    keywords: &[&str],
    added: &[&str],
    deleted: &[&str],
) -> Vec<CommitStats> {
    keywords
        .iter()
        .filter_map(|keyword| {
            let total_added = count_lines_containing(added, keyword);
            let total_deleted = count_lines_containing(deleted, keyword);
            (total_added > 0 || total_deleted > 0).then(|| {
                CommitStats::new(
                    StatType::Keyword,
                    language,
                    keyword,
                    total_added,
                    total_deleted,
                )
            })
        })
        .collect()
}

fn count_lines_containing(lines: &[&str], keyword: &str) -> u32 {
    lines.iter().filter(|line| line.contains(keyword)).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_added_and_deleted_separately() {
        let stats = keyword_stats(
            "java",
            &["if", "while"],
            &["if (a) {", "if (b) {"],
            &["while (true) {", "if (c) {"],
        );
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].tech, "java:if");
        assert_eq!(stats[0].num_lines_added, 2);
        assert_eq!(stats[0].num_lines_deleted, 1);
        assert_eq!(stats[1].tech, "java:while");
        assert_eq!(stats[1].num_lines_added, 0);
        assert_eq!(stats[1].num_lines_deleted, 1);
        assert!(stats.iter().all(|s| s.stat_type == StatType::Keyword));
    }

    #[test]
    fn identifier_substrings_count() {
        let stats = keyword_stats("java", &["int"], &["String printed = hint;"], &[]);
        assert_eq!(stats[0].num_lines_added, 1);
    }

    #[test]
    fn zero_count_keywords_omitted() {
        assert!(keyword_stats("java", &["goto"], &["x = 1;"], &["y = 2;"]).is_empty());
    }

    #[test]
    fn empty_vocabulary_yields_nothing() {
        assert!(keyword_stats("javascript", &[], &["new Foo()"], &[]).is_empty());
    }

    #[test]
    fn added_count_equals_lines_containing_keyword() {
        let added = [
            "for (int i = 0; i < n; i++) { for (;;) {} }",
            "before",
            "x",
            "format(y)",
        ];
        let stats = keyword_stats("java", &["for"], &added, &[]);
        let expected = added.iter().filter(|l| l.contains("for")).count() as u32;
        assert_eq!(stats[0].num_lines_added, expected);
        assert_eq!(expected, 3);
    }
}
