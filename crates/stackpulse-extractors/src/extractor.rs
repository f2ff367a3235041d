use std::collections::BTreeSet;

use stackpulse_core::{CommitStats, DiffFile};

use crate::classifier::LibraryClassifier;
use crate::{keywords, library, tokenizer};

/// Result of running an extractor over a batch of changed files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Copies of the input files tagged with the extractor's language.
    pub files: Vec<DiffFile>,
    /// Library records first, then keyword records.
    pub stats: Vec<CommitStats>,
}

impl Extraction {
    /// Append another extraction's files and stats.
    pub fn append(&mut self, other: Extraction) {
        self.files.extend(other.files);
        self.stats.extend(other.stats);
    }
}

/// Per-language contract for turning diff lines into usage statistics.
///
/// Implementations supply the language identity, its import syntax, and
/// optionally a tokenizer override and a keyword vocabulary. The shared
/// library and keyword algorithms come from the provided methods.
pub trait Extractor: Send + Sync {
    /// Language name used in tech identifiers, e.g. `java`.
    fn language(&self) -> &str;

    /// Lowercase file extensions handled by this extractor, without the dot.
    fn file_extensions(&self) -> &[&str];

    /// Classifier judging which library a line uses.
    fn classifier(&self) -> &dyn LibraryClassifier;

    /// Reserved words counted by the keyword stage; empty skips the stage.
    fn keywords(&self) -> &[&str] {
        &[]
    }

    /// Known libraries referenced by the imports in `content`.
    ///
    /// Only identifiers from the language's vocabulary are returned;
    /// unrecognized imports are dropped.
    fn extract_imports(&self, content: &[&str]) -> BTreeSet<String>;

    /// Tokens of `line` after language-specific stripping.
    fn tokenize(&self, line: &str) -> Vec<String> {
        tokenizer::split_tokens(line)
    }

    /// Subset of `file_libraries` the classifier judges used on `line`.
    fn line_libraries(&self, line: &str, file_libraries: &BTreeSet<String>) -> Vec<String> {
        if file_libraries.is_empty() {
            return Vec::new();
        }
        library::line_libraries(
            self.classifier(),
            self.language(),
            &self.tokenize(line),
            file_libraries,
        )
    }

    /// Tag `files` with this language and compute library and keyword stats.
    fn extract(&self, files: &[DiffFile]) -> Extraction {
        let files: Vec<DiffFile> = files
            .iter()
            .map(|file| file.with_language(self.language()))
            .collect();

        let mut stats = library::library_stats(self, &files);

        let added: Vec<&str> = files.iter().flat_map(|f| f.all_added()).collect();
        let deleted: Vec<&str> = files.iter().flat_map(|f| f.all_deleted()).collect();
        stats.extend(keywords::keyword_stats(
            self.language(),
            self.keywords(),
            &added,
            &deleted,
        ));

        Extraction { files, stats }
    }
}
