//! Library attribution shared by every extractor.

use std::collections::{BTreeMap, BTreeSet};

use stackpulse_core::{CommitStats, DiffFile, StatType};

use crate::classifier::LibraryClassifier;
use crate::extractor::Extractor;

/// Libraries from `file_libraries` that the classifier sees on a line.
///
/// The classifier's most probable category wins (the first one on ties).
/// When that category is the language label itself, or a library the file
/// does not import, the line uses no library.
pub fn line_libraries(
    classifier: &dyn LibraryClassifier,
    language: &str,
    tokens: &[String],
    file_libraries: &BTreeSet<String>,
) -> Vec<String> {
    if tokens.is_empty() || file_libraries.is_empty() {
        return Vec::new();
    }

    let probabilities = classifier.evaluate(tokens);
    let mut best: Option<(usize, f64)> = None;
    for (idx, &p) in probabilities.iter().enumerate() {
        if best.map_or(true, |(_, top)| p > top) {
            best = Some((idx, p));
        }
    }

    let Some(label) = best.and_then(|(idx, _)| classifier.categories().get(idx)) else {
        return Vec::new();
    };
    if label == language || !file_libraries.contains(label) {
        return Vec::new();
    }
    vec![label.clone()]
}

/// Per-library added/deleted line counts over a batch of files.
///
/// Added lines are checked against the imports of each file's new side,
/// deleted lines against its old side. One `LIBRARY` record is emitted per
/// library with a nonzero count, ordered by library id.
pub fn library_stats<E: Extractor + ?Sized>(extractor: &E, files: &[DiffFile]) -> Vec<CommitStats> {
    let mut counts: BTreeMap<String, (u32, u32)> = BTreeMap::new();

    for file in files {
        let new_libraries = extractor.extract_imports(&file.new_side());
        let old_libraries = extractor.extract_imports(&file.old_side());
        tracing::debug!(
            path = %file.path.display(),
            new = new_libraries.len(),
            old = old_libraries.len(),
            "resolved file imports"
        );

        for line in file.all_added() {
            for library in extractor.line_libraries(line, &new_libraries) {
                counts.entry(library).or_default().0 += 1;
            }
        }
        for line in file.all_deleted() {
            for library in extractor.line_libraries(line, &old_libraries) {
                counts.entry(library).or_default().1 += 1;
            }
        }
    }

    counts
        .into_iter()
        .filter(|(_, (added, deleted))| *added > 0 || *deleted > 0)
        .map(|(library, (added, deleted))| {
            CommitStats::new(StatType::Library, extractor.language(), &library, added, deleted)
        })
        .collect()
}
