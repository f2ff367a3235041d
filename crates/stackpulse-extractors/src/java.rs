//! Java extractor.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::classifier::LibraryClassifier;
use crate::extractor::Extractor;
use crate::tokenizer::{keep_after_marker, split_tokens};

/// Language name used in tech identifiers.
pub const LANGUAGE: &str = "java";

const EXTENSIONS: &[&str] = &["java"];

/// The Java reserved words counted by the keyword stage.
pub const KEYWORDS: &[&str] = &[
    "abstract", "continue", "for", "new", "switch", "assert", "default", "goto", "package",
    "synchronized", "boolean", "do", "if", "private", "this", "break", "double", "implements",
    "protected", "throw", "byte", "else", "import", "public", "throws", "case", "enum",
    "instanceof", "return", "transient", "catch", "extends", "int", "short", "try", "char",
    "final", "interface", "static", "void", "class", "finally", "long", "strictfp", "volatile",
    "const", "float", "native", "super", "while",
];

fn import_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.*import\s").expect("valid regex"))
}

fn comment_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.*//").expect("valid regex"))
}

fn package_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.*package\s").expect("valid regex"))
}

fn import_statement() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"import\s+(?:static\s+)?(\w+(?:\.\w+)*)").expect("valid regex")
    })
}

/// Extracts library and keyword usage from Java sources.
pub struct JavaExtractor {
    libraries: Vec<String>,
    classifier: Arc<dyn LibraryClassifier>,
}

impl JavaExtractor {
    /// Create an extractor over a library vocabulary and its classifier.
    pub fn new(libraries: Vec<String>, classifier: Arc<dyn LibraryClassifier>) -> Self {
        Self {
            libraries,
            classifier,
        }
    }
}

impl Extractor for JavaExtractor {
    fn language(&self) -> &str {
        LANGUAGE
    }

    fn file_extensions(&self) -> &[&str] {
        EXTENSIONS
    }

    fn classifier(&self) -> &dyn LibraryClassifier {
        self.classifier.as_ref()
    }

    fn keywords(&self) -> &[&str] {
        KEYWORDS
    }

    /// Vocabulary entries that prefix the name after `import`.
    ///
    /// `import java.util.concurrent.Future;` yields both `java.util` and
    /// `java.util.concurrent` when the vocabulary has them.
    fn extract_imports(&self, content: &[&str]) -> BTreeSet<String> {
        let mut imports = BTreeSet::new();
        for line in content {
            let Some(caps) = import_statement().captures(line) else {
                continue;
            };
            let imported = &caps[1];
            for library in &self.libraries {
                if imported.starts_with(library.as_str()) {
                    imports.insert(library.clone());
                }
            }
        }
        imports
    }

    fn tokenize(&self, line: &str) -> Vec<String> {
        let line = keep_after_marker(import_marker(), line);
        let line = keep_after_marker(comment_marker(), line);
        let line = keep_after_marker(package_marker(), line);
        split_tokens(line)
    }
}

#[cfg(test)]
mod tests {
    use stackpulse_core::{DiffFile, DiffHunk, StatType};

    use super::*;

    /// Picks `java.util` whenever `arraylist` is on the line.
    struct ArrayListClassifier {
        categories: Vec<String>,
    }

    impl LibraryClassifier for ArrayListClassifier {
        fn categories(&self) -> &[String] {
            &self.categories
        }

        fn evaluate(&self, tokens: &[String]) -> Vec<f64> {
            if tokens.iter().any(|t| t == "arraylist") {
                vec![0.1, 0.9]
            } else {
                vec![0.9, 0.1]
            }
        }
    }

    fn extractor() -> JavaExtractor {
        let classifier = ArrayListClassifier {
            categories: vec!["java".into(), "java.util".into()],
        };
        JavaExtractor::new(
            vec![
                "java.util".into(),
                "java.util.concurrent".into(),
                "org.junit".into(),
            ],
            Arc::new(classifier),
        )
    }

    fn added(lines: &[&str]) -> DiffFile {
        let mut file = DiffFile::new("src/Main.java");
        file.hunks.push(DiffHunk {
            added: lines.iter().map(|s| s.to_string()).collect(),
            ..DiffHunk::default()
        });
        file
    }

    #[test]
    fn import_and_usage_lines() {
        let file = added(&["import java.util.List;", "List x = new ArrayList();"]);
        let extraction = extractor().extract(&[file]);

        let techs: Vec<(&str, StatType, u32)> = extraction
            .stats
            .iter()
            .map(|s| (s.tech.as_str(), s.stat_type, s.num_lines_added))
            .collect();
        assert_eq!(
            techs,
            vec![
                ("java:java.util", StatType::Library, 1),
                ("java:new", StatType::Keyword, 1),
                ("java:import", StatType::Keyword, 1),
            ]
        );
        assert_eq!(extraction.files[0].language.as_deref(), Some("java"));
    }

    #[test]
    fn imports_match_by_prefix() {
        let ex = extractor();
        let imports = ex.extract_imports(&[
            "import java.util.concurrent.Future;",
            "import static org.junit.Assert.assertEquals;",
            "import com.example.Unknown;",
            "int x = 1;",
        ]);
        let imports: Vec<&str> = imports.iter().map(String::as_str).collect();
        assert_eq!(imports, vec!["java.util", "java.util.concurrent", "org.junit"]);
    }

    #[test]
    fn imports_stay_within_vocabulary() {
        let ex = extractor();
        let imports = ex.extract_imports(&["import javax.swing.JFrame;", "import foo;"]);
        assert!(imports.is_empty());
    }

    #[test]
    fn tokenize_keeps_text_after_last_marker() {
        let ex = extractor();
        assert_eq!(ex.tokenize("import java.util.List;"), vec!["java", "util", "list"]);
        assert_eq!(ex.tokenize("int x = 1; // Count ITEMS"), vec!["count", "items"]);
        assert_eq!(ex.tokenize("package com.example;"), vec!["com", "example"]);
        assert_eq!(ex.tokenize("import foo.import bar;"), vec!["bar"]);
    }

    #[test]
    fn marker_free_line_matches_base_split() {
        let ex = extractor();
        let line = "Map<String, Integer> counts = new HashMap<>();";
        assert_eq!(ex.tokenize(line), split_tokens(line));
    }

    #[test]
    fn tokenize_is_idempotent_on_stripped_text() {
        let ex = extractor();
        let once = ex.tokenize("import org.junit.Test;").join(" ");
        assert_eq!(ex.tokenize(&once).join(" "), once);
    }

    #[test]
    fn extraction_is_repeatable() {
        let ex = extractor();
        let files = vec![added(&["import java.util.List;", "List x = new ArrayList();"])];
        assert_eq!(ex.extract(&files), ex.extract(&files));
    }

    #[test]
    fn no_imports_means_no_library_stats() {
        let extraction = extractor().extract(&[added(&["List x = new ArrayList();"])]);
        assert!(extraction
            .stats
            .iter()
            .all(|s| s.stat_type == StatType::Keyword));
    }
}
