use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StackpulseError;

/// Top-level configuration loaded from `.stackpulse.toml`.
///
/// # Examples
///
/// ```
/// use stackpulse_core::StackpulseConfig;
///
/// let config = StackpulseConfig::default();
/// assert_eq!(config.identity.ngram_size, 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackpulseConfig {
    /// Reporting service settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Author identity resolution settings.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Diff extraction settings.
    #[serde(default)]
    pub extract: ExtractConfig,
}

impl StackpulseConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StackpulseError::Io`] if the file cannot be read, or
    /// [`StackpulseError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, StackpulseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`StackpulseError::Toml`] if parsing fails, or
    /// [`StackpulseError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackpulse_core::StackpulseConfig;
    ///
    /// let toml = r#"
    /// [identity]
    /// similarity_threshold = 0.5
    /// "#;
    /// let config = StackpulseConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.identity.similarity_threshold, 0.5);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, StackpulseError> {
        let config: Self = toml::from_str(content)?;
        config.identity.validate()?;
        Ok(config)
    }
}

/// Reporting service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the reporting service.
    pub base_url: Option<String>,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Author identity resolution configuration.
///
/// # Examples
///
/// ```
/// use stackpulse_core::IdentityConfig;
///
/// let config = IdentityConfig::default();
/// assert_eq!(config.similarity_threshold, 0.30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Length of the character n-grams compared (default: 3).
    #[serde(default = "default_ngram_size")]
    pub ngram_size: usize,
    /// Minimum Jaccard similarity for two strings to be the same identity (default: 0.30).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_ngram_size() -> usize {
    3
}

fn default_similarity_threshold() -> f64 {
    0.30
}

impl IdentityConfig {
    fn validate(&self) -> Result<(), StackpulseError> {
        if self.ngram_size == 0 {
            return Err(StackpulseError::Config(
                "identity.ngram_size must be at least 1".into(),
            ));
        }
        // At 0 every pair matches, including strings with no n-grams at all.
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(StackpulseError::Config(format!(
                "identity.similarity_threshold must be within (0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            ngram_size: default_ngram_size(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

/// Diff extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Glob patterns of paths to leave out of extraction.
    #[serde(default)]
    pub skip_patterns: Vec<String>,
    /// JSON file replacing the built-in library vocabularies.
    pub libraries_file: Option<PathBuf>,
    /// Directory holding trained classifier models named `<language>.json`.
    pub models_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = StackpulseConfig::default();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.identity.ngram_size, 3);
        assert_eq!(config.identity.similarity_threshold, 0.30);
        assert!(config.extract.skip_patterns.is_empty());
        assert!(config.extract.models_dir.is_none());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[api]
base_url = "https://stats.example.com/api"
token = "secret"
timeout_secs = 10

[identity]
ngram_size = 2
similarity_threshold = 0.4

[extract]
skip_patterns = ["vendor/**", "*.min.js"]
libraries_file = "libs.json"
models_dir = "models"
"#;
        let config = StackpulseConfig::from_toml(toml).unwrap();
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://stats.example.com/api")
        );
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.identity.ngram_size, 2);
        assert_eq!(config.identity.similarity_threshold, 0.4);
        assert_eq!(config.extract.skip_patterns, vec!["vendor/**", "*.min.js"]);
        assert_eq!(
            config.extract.libraries_file,
            Some(PathBuf::from("libs.json"))
        );
        assert_eq!(config.extract.models_dir, Some(PathBuf::from("models")));
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = StackpulseConfig::from_toml("").unwrap();
        assert_eq!(config.identity.ngram_size, 3);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(StackpulseConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let toml = "[identity]\nsimilarity_threshold = 1.5\n";
        let err = StackpulseConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, StackpulseError::Config(_)));
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let toml = "[identity]\nsimilarity_threshold = 0.0\n";
        let err = StackpulseConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("(0, 1]"));

        let toml = "[identity]\nsimilarity_threshold = 1.0\n";
        assert!(StackpulseConfig::from_toml(toml).is_ok());
    }

    #[test]
    fn zero_ngram_size_is_rejected() {
        let toml = "[identity]\nngram_size = 0\n";
        assert!(StackpulseConfig::from_toml(toml).is_err());
    }
}
