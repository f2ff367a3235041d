//! JavaScript extractor.
//!
//! JavaScript imports are too varied (`import`, `require`, dynamic loaders)
//! to parse reliably line by line, so import extraction works on the whole
//! file: every bare token that exactly names a known library counts.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use regex::{Captures, Regex};

use crate::classifier::LibraryClassifier;
use crate::extractor::Extractor;
use crate::tokenizer::{keep_after_marker, split_tokens};

/// Language name used in tech identifiers.
pub const LANGUAGE: &str = "javascript";

const EXTENSIONS: &[&str] = &["js", "jsx"];

fn quoted_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""[^"]*"|'[^']*'|`[^`]*`"#).expect("valid regex"))
}

// Keeps `-` so names like `react-dom` stay whole.
fn import_split() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[\s,;:*()\[\]{}+=.><#@$'"`/\\]+"#).expect("valid regex")
    })
}

fn import_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.*import\s").expect("valid regex"))
}

fn require_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.*require\s*\(").expect("valid regex"))
}

fn comment_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.*//").expect("valid regex"))
}

/// Extracts library usage from JavaScript sources.
pub struct JavascriptExtractor {
    libraries: BTreeSet<String>,
    classifier: Arc<dyn LibraryClassifier>,
}

impl JavascriptExtractor {
    /// Create an extractor over a library vocabulary and its classifier.
    pub fn new(libraries: Vec<String>, classifier: Arc<dyn LibraryClassifier>) -> Self {
        Self {
            libraries: libraries.into_iter().collect(),
            classifier,
        }
    }
}

impl Extractor for JavascriptExtractor {
    fn language(&self) -> &str {
        LANGUAGE
    }

    fn file_extensions(&self) -> &[&str] {
        EXTENSIONS
    }

    fn classifier(&self) -> &dyn LibraryClassifier {
        self.classifier.as_ref()
    }

    fn extract_imports(&self, content: &[&str]) -> BTreeSet<String> {
        // Literals holding two or more words are prose, not module names.
        // Quotes never pair across lines, so a stray apostrophe stays local.
        let stripped: Vec<String> = content
            .iter()
            .map(|line| {
                quoted_literal()
                    .replace_all(&line.to_lowercase(), |caps: &Captures<'_>| {
                        let literal = &caps[0];
                        if literal.chars().any(char::is_whitespace) {
                            " ".to_string()
                        } else {
                            literal.to_string()
                        }
                    })
                    .into_owned()
            })
            .collect();
        let joined = stripped.join(" ");

        import_split()
            .split(&joined)
            .filter(|token| self.libraries.contains(*token))
            .map(str::to_string)
            .collect()
    }

    fn tokenize(&self, line: &str) -> Vec<String> {
        let line = keep_after_marker(import_marker(), line);
        let line = keep_after_marker(require_marker(), line);
        let line = keep_after_marker(comment_marker(), line);
        split_tokens(line)
    }
}
