//! Known-library vocabularies per language.

use std::collections::BTreeMap;
use std::path::Path;

use stackpulse_core::StackpulseError;

const JAVA_LIBRARIES: &[&str] = &[
    "android.support",
    "androidx",
    "ch.qos.logback",
    "com.amazonaws",
    "com.fasterxml.jackson",
    "com.google.common",
    "com.google.gson",
    "com.google.inject",
    "com.google.protobuf",
    "com.squareup.okhttp",
    "dagger",
    "io.netty",
    "io.reactivex",
    "io.vertx",
    "java.io",
    "java.net",
    "java.nio",
    "java.sql",
    "java.time",
    "java.util",
    "java.util.concurrent",
    "javax.inject",
    "javax.persistence",
    "javax.servlet",
    "junit",
    "lombok",
    "okhttp3",
    "org.apache.commons",
    "org.apache.http",
    "org.apache.kafka",
    "org.apache.log4j",
    "org.apache.spark",
    "org.assertj",
    "org.eclipse.jetty",
    "org.hamcrest",
    "org.hibernate",
    "org.jsoup",
    "org.junit",
    "org.mockito",
    "org.slf4j",
    "org.springframework",
    "reactor.core",
    "retrofit2",
    "software.amazon.awssdk",
];

const JAVASCRIPT_LIBRARIES: &[&str] = &[
    "angular",
    "axios",
    "backbone",
    "bcrypt",
    "bluebird",
    "body-parser",
    "bootstrap",
    "chai",
    "chalk",
    "cheerio",
    "commander",
    "d3",
    "dotenv",
    "electron",
    "ember",
    "enzyme",
    "express",
    "graphql",
    "gulp",
    "handlebars",
    "jasmine",
    "jest",
    "jquery",
    "jsonwebtoken",
    "knockout",
    "koa",
    "lodash",
    "mocha",
    "moment",
    "mongoose",
    "nodemailer",
    "passport",
    "puppeteer",
    "ramda",
    "react",
    "react-dom",
    "react-redux",
    "redux",
    "rxjs",
    "sequelize",
    "sinon",
    "underscore",
    "vue",
    "vuex",
    "webpack",
    "yargs",
];

/// Source of the fixed library vocabulary for each language.
pub trait LibraryVocabulary {
    /// Libraries recognized for `language`; empty for unknown languages.
    fn libraries(&self, language: &str) -> &[String];
}

/// Per-language sets of recognized library identifiers.
///
/// # Examples
///
/// ```
/// use stackpulse_extractors::{LibraryCatalog, LibraryVocabulary};
///
/// let catalog = LibraryCatalog::builtin();
/// assert!(catalog.libraries("java").iter().any(|l| l == "org.junit"));
/// assert!(catalog.libraries("cobol").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LibraryCatalog {
    by_language: BTreeMap<String, Vec<String>>,
}

impl LibraryCatalog {
    /// The vocabularies shipped with stackpulse.
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        catalog.set("java", JAVA_LIBRARIES.iter().map(|s| s.to_string()).collect());
        catalog.set(
            "javascript",
            JAVASCRIPT_LIBRARIES.iter().map(|s| s.to_string()).collect(),
        );
        catalog
    }

    /// Parse a JSON object mapping language names to library lists.
    ///
    /// # Errors
    ///
    /// Returns [`StackpulseError::Serialization`] if the JSON is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackpulse_extractors::{LibraryCatalog, LibraryVocabulary};
    ///
    /// let catalog = LibraryCatalog::from_json(r#"{"java": ["org.junit"]}"#).unwrap();
    /// assert_eq!(catalog.libraries("java"), ["org.junit".to_string()]);
    /// ```
    pub fn from_json(content: &str) -> Result<Self, StackpulseError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(content)?;
        let mut catalog = Self::default();
        for (language, libraries) in raw {
            catalog.set(&language, libraries);
        }
        Ok(catalog)
    }

    /// Load a JSON vocabulary file.
    ///
    /// # Errors
    ///
    /// Returns [`StackpulseError::FileNotFound`] if `path` does not exist.
    pub fn from_file(path: &Path) -> Result<Self, StackpulseError> {
        if !path.exists() {
            return Err(StackpulseError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Replace vocabularies with those present in `other`.
    pub fn merge(mut self, other: LibraryCatalog) -> Self {
        for (language, libraries) in other.by_language {
            self.by_language.insert(language, libraries);
        }
        self
    }

    /// Set the vocabulary for `language`, sorted and deduplicated.
    pub fn set(&mut self, language: &str, mut libraries: Vec<String>) {
        libraries.sort();
        libraries.dedup();
        self.by_language.insert(language.to_string(), libraries);
    }

    /// Languages with a vocabulary.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.by_language.keys().map(String::as_str)
    }
}

impl LibraryVocabulary for LibraryCatalog {
    fn libraries(&self, language: &str) -> &[String] {
        self.by_language
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
