//! Path filtering ahead of extraction.
//!
//! Vendored dependencies and minified bundles would attribute third-party
//! code to the repository's authors, so they are dropped together with
//! anything matching the configured skip patterns.

use std::path::{Path, PathBuf};

use stackpulse_core::{DiffFile, ExtractConfig};

/// Files and patterns to leave out of extraction.
///
/// # Examples
///
/// ```
/// use stackpulse_difflens::filter::DiffFilter;
///
/// let filter = DiffFilter::default_filter();
/// assert!(filter.should_skip("node_modules/react/index.js"));
/// assert!(!filter.should_skip("src/App.java"));
/// ```
pub struct DiffFilter {
    skip_patterns: Vec<glob::Pattern>,
}

impl DiffFilter {
    /// Create a filter with only the built-in rules.
    pub fn default_filter() -> Self {
        Self {
            skip_patterns: Vec::new(),
        }
    }

    /// Create a filter from extraction configuration.
    ///
    /// Invalid glob patterns are ignored with a warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackpulse_core::ExtractConfig;
    /// use stackpulse_difflens::filter::DiffFilter;
    ///
    /// let config = ExtractConfig {
    ///     skip_patterns: vec!["generated/**".into()],
    ///     ..ExtractConfig::default()
    /// };
    /// let filter = DiffFilter::from_config(&config);
    /// assert!(filter.should_skip("generated/Api.java"));
    /// ```
    pub fn from_config(config: &ExtractConfig) -> Self {
        let mut skip_patterns = Vec::new();
        for pat in &config.skip_patterns {
            match glob::Pattern::new(pat) {
                Ok(p) => skip_patterns.push(p),
                Err(e) => tracing::warn!(pattern = %pat, error = %e, "ignoring invalid skip pattern"),
            }
        }
        Self { skip_patterns }
    }

    /// Check if a single file path should be skipped.
    pub fn should_skip(&self, path: &str) -> bool {
        self.check_skip(Path::new(path)).is_some()
    }

    /// Split `files` into those to extract and those to skip.
    pub fn filter(&self, files: Vec<DiffFile>) -> FilterResult {
        let mut kept = Vec::new();
        let mut skipped = Vec::new();

        for file in files {
            match self.check_skip(&file.path) {
                Some(reason) => {
                    tracing::debug!(path = %file.path.display(), %reason, "skipping file");
                    skipped.push(SkippedFile {
                        path: file.path,
                        reason,
                    });
                }
                None => kept.push(file),
            }
        }

        FilterResult { kept, skipped }
    }

    fn check_skip(&self, path: &Path) -> Option<SkipReason> {
        let path_str = path.to_string_lossy();
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();

        if is_vendored(&path_str) {
            return Some(SkipReason::VendoredCode);
        }

        if is_minified(&file_name) {
            return Some(SkipReason::MinifiedFile);
        }

        self.skip_patterns
            .iter()
            .find(|pat| pat.matches(&path_str))
            .map(|pat| SkipReason::PatternMatch(pat.to_string()))
    }
}

/// Result of filtering diff files.
pub struct FilterResult {
    /// Files that passed the filter.
    pub kept: Vec<DiffFile>,
    /// Files that were skipped with reasons.
    pub skipped: Vec<SkippedFile>,
}

/// A file that was skipped during filtering.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Path of the skipped file.
    pub path: PathBuf,
    /// Why the file was skipped.
    pub reason: SkipReason,
}

/// Reason a file was skipped.
///
/// # Examples
///
/// ```
/// use stackpulse_difflens::filter::SkipReason;
///
/// assert_eq!(SkipReason::VendoredCode.to_string(), "vendored code");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Third-party vendored code.
    VendoredCode,
    /// Minified or bundled file.
    MinifiedFile,
    /// Matched a custom skip pattern.
    PatternMatch(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::VendoredCode => write!(f, "vendored code"),
            SkipReason::MinifiedFile => write!(f, "minified file"),
            SkipReason::PatternMatch(pat) => write!(f, "pattern: {pat}"),
        }
    }
}

fn is_vendored(path: &str) -> bool {
    path.split('/')
        .any(|part| matches!(part, "vendor" | "third_party" | "node_modules" | "bower_components"))
}

fn is_minified(file_name: &str) -> bool {
    file_name.ends_with(".min.js") || file_name.ends_with(".bundle.js")
}
