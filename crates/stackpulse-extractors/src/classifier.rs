//! Library classifiers: which library, if any, a line of code is using.
//!
//! The trained model is a black box to the extractors. They hand it the
//! tokens of a line and get back one probability per category, where the
//! categories are the language's libraries plus the bare language label
//! meaning "no library".

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stackpulse_core::StackpulseError;

use crate::vocabulary::{LibraryCatalog, LibraryVocabulary};

/// A per-language oracle judging library usage from line tokens.
pub trait LibraryClassifier: Send + Sync {
    /// Labels the classifier can predict, in probability order.
    fn categories(&self) -> &[String];

    /// One probability per entry of [`categories`](Self::categories).
    fn evaluate(&self, tokens: &[String]) -> Vec<f64>;
}

/// Linear token-weight model evaluated with a softmax.
///
/// Each known token contributes a weight row (one weight per category); the
/// scores are the bias plus the rows of every token on the line.
///
/// # Examples
///
/// ```
/// use stackpulse_extractors::{LibraryClassifier, TokenWeightModel};
///
/// let model = TokenWeightModel::seed("java", &["org.junit".to_string()]);
/// let probs = model.evaluate(&["junit".to_string(), "assert".to_string()]);
/// assert_eq!(model.categories(), ["java".to_string(), "org.junit".to_string()]);
/// assert!(probs[1] > probs[0]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenWeightModel {
    categories: Vec<String>,
    bias: Vec<f64>,
    weights: HashMap<String, Vec<f64>>,
}

/// Bias of the language label in seed models; a library needs more evidence than this to win.
const SEED_LANGUAGE_BIAS: f64 = 0.5;

impl TokenWeightModel {
    /// Build a model from explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`StackpulseError::Classifier`] if the bias or any weight row
    /// does not have one entry per category.
    pub fn new(
        categories: Vec<String>,
        bias: Vec<f64>,
        weights: HashMap<String, Vec<f64>>,
    ) -> Result<Self, StackpulseError> {
        let model = Self {
            categories,
            bias,
            weights,
        };
        model.validate()?;
        Ok(model)
    }

    /// Parse a model serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StackpulseError::Serialization`] for malformed JSON and
    /// [`StackpulseError::Classifier`] for inconsistent dimensions.
    pub fn from_json(content: &str) -> Result<Self, StackpulseError> {
        let model: Self = serde_json::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model from a JSON file.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json); I/O failures are [`StackpulseError::Io`].
    pub fn from_file(path: &Path) -> Result<Self, StackpulseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| match e {
            StackpulseError::Serialization(inner) => {
                StackpulseError::Classifier(format!("{}: {inner}", path.display()))
            }
            other => other,
        })
    }

    /// Untrained model derived from the vocabulary alone.
    ///
    /// A token equal to a library's full name votes 1.0 for it. A token equal
    /// to one segment of a dotted or dashed name splits a vote of 1.0 between
    /// every library containing that segment, so shared prefixes such as
    /// `java` or `org` stay below the language bias. A segment that is itself
    /// a library name (`junit` in `org.junit`) votes 1.0 for each owner, so
    /// the longer name wins once its other segments appear too.
    ///
    /// Libraries are ordered by segment count, keeping vocabulary order
    /// otherwise, so equal evidence resolves to the shorter name.
    pub fn seed(language: &str, libraries: &[String]) -> Self {
        let mut ordered: Vec<(&String, Vec<&str>)> = libraries
            .iter()
            .map(|library| (library, name_segments(library)))
            .collect();
        ordered.sort_by_key(|(_, segments)| segments.len());

        let mut categories = Vec::with_capacity(ordered.len() + 1);
        categories.push(language.to_string());
        categories.extend(ordered.iter().map(|(library, _)| (*library).clone()));
        let width = categories.len();

        let mut bias = vec![0.0; width];
        bias[0] = SEED_LANGUAGE_BIAS;

        let mut segment_owners: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, (_, segments)) in ordered.iter().enumerate() {
            if segments.len() < 2 {
                continue;
            }
            for segment in segments {
                let owners = segment_owners.entry(segment.to_lowercase()).or_default();
                if !owners.contains(&(i + 1)) {
                    owners.push(i + 1);
                }
            }
        }

        let full_names: HashSet<String> = libraries.iter().map(|l| l.to_lowercase()).collect();
        let mut weights: HashMap<String, Vec<f64>> = HashMap::new();
        for (segment, owners) in segment_owners {
            let share = if full_names.contains(&segment) {
                1.0
            } else {
                1.0 / owners.len() as f64
            };
            let row = weights.entry(segment).or_insert_with(|| vec![0.0; width]);
            for idx in owners {
                row[idx] += share;
            }
        }
        for (i, (library, _)) in ordered.iter().enumerate() {
            let row = weights
                .entry(library.to_lowercase())
                .or_insert_with(|| vec![0.0; width]);
            row[i + 1] += 1.0;
        }

        Self {
            categories,
            bias,
            weights,
        }
    }

    fn validate(&self) -> Result<(), StackpulseError> {
        let width = self.categories.len();
        if width == 0 {
            return Err(StackpulseError::Classifier("model has no categories".into()));
        }
        if self.bias.len() != width {
            return Err(StackpulseError::Classifier(format!(
                "bias has {} entries, expected {width}",
                self.bias.len()
            )));
        }
        if let Some((token, row)) = self.weights.iter().find(|(_, row)| row.len() != width) {
            return Err(StackpulseError::Classifier(format!(
                "weights for '{token}' have {} entries, expected {width}",
                row.len()
            )));
        }
        Ok(())
    }
}

impl LibraryClassifier for TokenWeightModel {
    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn evaluate(&self, tokens: &[String]) -> Vec<f64> {
        let mut scores = self.bias.clone();
        for token in tokens {
            if let Some(row) = self.weights.get(token) {
                for (score, weight) in scores.iter_mut().zip(row) {
                    *score += weight;
                }
            }
        }
        softmax(&scores)
    }
}

fn name_segments(library: &str) -> Vec<&str> {
    library
        .split(['.', '-', '/'])
        .filter(|s| !s.is_empty())
        .collect()
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Classifier handles keyed by language, built once at startup.
#[derive(Clone, Default)]
pub struct ClassifierSet {
    by_language: BTreeMap<String, Arc<dyn LibraryClassifier>>,
}

impl ClassifierSet {
    /// Build a classifier for every language in `catalog`.
    ///
    /// A trained model at `<models_dir>/<language>.json` is used when present;
    /// otherwise the language gets a [`TokenWeightModel::seed`] model.
    ///
    /// # Errors
    ///
    /// Returns an error if a model file exists but cannot be loaded.
    pub fn load(catalog: &LibraryCatalog, models_dir: Option<&Path>) -> Result<Self, StackpulseError> {
        let mut set = Self::default();
        for language in catalog.languages() {
            let trained = models_dir
                .map(|dir| dir.join(format!("{language}.json")))
                .filter(|path| path.exists());
            let model = match trained {
                Some(path) => {
                    tracing::debug!(language, path = %path.display(), "loading trained classifier");
                    TokenWeightModel::from_file(&path)?
                }
                None => {
                    tracing::debug!(language, "no trained classifier, using vocabulary seed");
                    TokenWeightModel::seed(language, catalog.libraries(language))
                }
            };
            set.insert(language, Arc::new(model));
        }
        Ok(set)
    }

    /// Register or replace the classifier for `language`.
    pub fn insert(&mut self, language: &str, classifier: Arc<dyn LibraryClassifier>) {
        self.by_language.insert(language.to_string(), classifier);
    }

    /// Shared handle to the classifier for `language`.
    pub fn get(&self, language: &str) -> Option<Arc<dyn LibraryClassifier>> {
        self.by_language.get(language).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn libs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn argmax(model: &TokenWeightModel, tokens: &[&str]) -> String {
        let tokens: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
        let probs = model.evaluate(&tokens);
        let (idx, _) = probs
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, p)| if *p > best.1 { (i, *p) } else { best });
        model.categories()[idx].clone()
    }

    #[test]
    fn probabilities_sum_to_one() {
        let model = TokenWeightModel::seed("java", &libs(&["java.util", "org.junit"]));
        let probs = model.evaluate(&["util".to_string()]);
        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn seed_prefers_language_without_evidence() {
        let model = TokenWeightModel::seed("java", &libs(&["java.util", "java.io"]));
        assert_eq!(argmax(&model, &[]), "java");
        assert_eq!(argmax(&model, &["x", "y"]), "java");
    }

    #[test]
    fn shared_segment_stays_below_language_bias() {
        let model = TokenWeightModel::seed("java", &libs(&["java.util", "java.io"]));
        assert_eq!(argmax(&model, &["java"]), "java");
        assert_eq!(argmax(&model, &["java", "util"]), "java.util");
        assert_eq!(argmax(&model, &["io"]), "java.io");
    }

    #[test]
    fn seed_matches_full_name() {
        let model = TokenWeightModel::seed("javascript", &libs(&["react", "react-dom", "redux"]));
        assert_eq!(argmax(&model, &["react", "render"]), "react");
        assert_eq!(argmax(&model, &["react-dom"]), "react-dom");
        assert_eq!(argmax(&model, &["redux"]), "redux");
    }

    #[test]
    fn dotted_name_beats_bare_segment_library() {
        let model = TokenWeightModel::seed(
            "java",
            &libs(&["java.util", "junit", "org.hamcrest", "org.junit", "org.mockito"]),
        );
        let tokens = crate::tokenizer::split_tokens("org.junit.Assert.fail(\"x\");");
        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
        assert_eq!(argmax(&model, &tokens), "org.junit");

        // Without the other segment, the bare library keeps the line.
        assert_eq!(argmax(&model, &["junit", "framework", "testcase"]), "junit");
    }

    #[test]
    fn seed_orders_shorter_names_first() {
        let model = TokenWeightModel::seed(
            "java",
            &libs(&["org.junit", "junit", "java.util.concurrent", "java.util"]),
        );
        assert_eq!(
            model.categories(),
            libs(&["java", "junit", "org.junit", "java.util", "java.util.concurrent"])
        );
        assert_eq!(argmax(&model, &["java", "util", "list"]), "java.util");
        assert_eq!(argmax(&model, &["java", "util", "concurrent"]), "java.util.concurrent");
    }

    #[test]
    fn json_roundtrip_and_validation() {
        let json = r#"{
            "categories": ["java", "org.junit"],
            "bias": [0.5, 0.0],
            "weights": { "assert": [0.0, 2.0] }
        }"#;
        let model = TokenWeightModel::from_json(json).unwrap();
        assert_eq!(argmax(&model, &["assert"]), "org.junit");

        let bad = r#"{"categories": ["java"], "bias": [0.1, 0.2], "weights": {}}"#;
        assert!(matches!(
            TokenWeightModel::from_json(bad),
            Err(StackpulseError::Classifier(_))
        ));
    }

    #[test]
    fn new_rejects_short_rows() {
        let mut weights = HashMap::new();
        weights.insert("x".to_string(), vec![1.0]);
        let result = TokenWeightModel::new(libs(&["java", "junit"]), vec![0.0, 0.0], weights);
        assert!(result.is_err());
    }

    #[test]
    fn set_loads_trained_model_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("java.json"),
            r#"{"categories": ["java", "lombok"], "bias": [0.0, 0.0], "weights": {"data": [0.0, 3.0]}}"#,
        )
        .unwrap();

        let set = ClassifierSet::load(&LibraryCatalog::builtin(), Some(dir.path())).unwrap();
        let java = set.get("java").unwrap();
        assert_eq!(java.categories(), ["java".to_string(), "lombok".to_string()]);

        // No javascript.json in the directory, so the seed model is used.
        let js = set.get("javascript").unwrap();
        assert_eq!(js.categories()[0], "javascript");
        assert!(js.categories().len() > 2);
        assert!(set.get("cobol").is_none());
    }

    #[test]
    fn set_reports_corrupt_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("java.json"), "not json").unwrap();
        let result = ClassifierSet::load(&LibraryCatalog::builtin(), Some(dir.path()));
        assert!(matches!(result, Err(StackpulseError::Classifier(_))));
    }
}
