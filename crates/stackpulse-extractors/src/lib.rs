//! Per-language classification of changed source lines.
//!
//! Each supported language implements the [`Extractor`] contract: it reads
//! the imports of a changed file, tokenizes each added or deleted line, asks
//! the language's [`LibraryClassifier`] which imported library the line uses,
//! and counts reserved-word usage. The output is a list of
//! [`stackpulse_core::CommitStats`] records keyed by `language:name`.
//!
//! Classifiers and vocabularies are built once at startup and injected into
//! the extractors through an [`ExtractorRegistry`].

pub mod classifier;
pub mod extractor;
pub mod java;
pub mod javascript;
pub mod keywords;
pub mod library;
pub mod registry;
pub mod tokenizer;
pub mod vocabulary;

pub use classifier::{ClassifierSet, LibraryClassifier, TokenWeightModel};
pub use extractor::{Extraction, Extractor};
pub use java::JavaExtractor;
pub use javascript::JavascriptExtractor;
pub use registry::ExtractorRegistry;
pub use vocabulary::{LibraryCatalog, LibraryVocabulary};
