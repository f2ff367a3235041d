//! Dispatch from languages and file extensions to extractors.

use std::collections::BTreeMap;
use std::path::Path;

use stackpulse_core::{DiffFile, StackpulseError};

use crate::classifier::ClassifierSet;
use crate::extractor::{Extraction, Extractor};
use crate::java::{self, JavaExtractor};
use crate::javascript::{self, JavascriptExtractor};
use crate::vocabulary::LibraryVocabulary;

/// Extractors keyed by language name.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use stackpulse_extractors::{ClassifierSet, ExtractorRegistry, LibraryCatalog};
///
/// let catalog = LibraryCatalog::builtin();
/// let classifiers = ClassifierSet::load(&catalog, None).unwrap();
/// let registry = ExtractorRegistry::with_defaults(&catalog, &classifiers).unwrap();
///
/// assert_eq!(registry.for_path(Path::new("src/App.jsx")).unwrap().language(), "javascript");
/// assert!(registry.for_path(Path::new("main.rs")).is_none());
/// ```
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: BTreeMap<String, Box<dyn Extractor>>,
    extensions: BTreeMap<String, String>,
}

impl ExtractorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Java and JavaScript extractors.
    ///
    /// # Errors
    ///
    /// Returns [`StackpulseError::Classifier`] if `classifiers` has no
    /// classifier for one of the built-in languages.
    pub fn with_defaults(
        catalog: &impl LibraryVocabulary,
        classifiers: &ClassifierSet,
    ) -> Result<Self, StackpulseError> {
        let classifier_for = |language: &str| {
            classifiers.get(language).ok_or_else(|| {
                StackpulseError::Classifier(format!("no classifier loaded for {language}"))
            })
        };

        let mut registry = Self::new();
        registry.register(Box::new(JavaExtractor::new(
            catalog.libraries(java::LANGUAGE).to_vec(),
            classifier_for(java::LANGUAGE)?,
        )));
        registry.register(Box::new(JavascriptExtractor::new(
            catalog.libraries(javascript::LANGUAGE).to_vec(),
            classifier_for(javascript::LANGUAGE)?,
        )));
        Ok(registry)
    }

    /// Add an extractor, replacing any previous one for the same language.
    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        let language = extractor.language().to_string();
        self.extensions.retain(|_, lang| *lang != language);
        for ext in extractor.file_extensions() {
            self.extensions.insert(ext.to_lowercase(), language.clone());
        }
        self.extractors.insert(language, extractor);
    }

    /// Extractor for a language name.
    pub fn get(&self, language: &str) -> Option<&dyn Extractor> {
        self.extractors.get(language).map(|e| e.as_ref())
    }

    /// Extractor for a file, chosen by its extension.
    pub fn for_path(&self, path: &Path) -> Option<&dyn Extractor> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        let language = self.extensions.get(&ext)?;
        self.get(language)
    }

    /// Registered language names, sorted.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.extractors.keys().map(String::as_str)
    }

    /// Run every file through the extractor for its extension.
    ///
    /// Files in unsupported languages are skipped. Results are grouped by
    /// language in name order.
    pub fn extract_all(&self, files: Vec<DiffFile>) -> Extraction {
        let mut by_language: BTreeMap<&str, Vec<DiffFile>> = BTreeMap::new();
        for file in files {
            match self.for_path(&file.path) {
                Some(extractor) => by_language
                    .entry(extractor.language())
                    .or_default()
                    .push(file),
                None => {
                    tracing::debug!(path = %file.path.display(), "no extractor for file, skipping");
                }
            }
        }

        let mut extraction = Extraction::default();
        for (language, files) in by_language {
            if let Some(extractor) = self.get(language) {
                tracing::debug!(language, files = files.len(), "extracting");
                extraction.append(extractor.extract(&files));
            }
        }
        extraction
    }
}
