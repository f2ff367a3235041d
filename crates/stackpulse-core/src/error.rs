use std::path::PathBuf;

/// Errors that can occur across stackpulse.
///
/// Library crates use this type directly; the binary reports it through
/// `miette`, so variants may carry a diagnostic code and help text.
///
/// # Examples
///
/// ```
/// use stackpulse_core::StackpulseError;
///
/// let err = StackpulseError::Api("503 Service Unavailable".into());
/// assert!(err.to_string().contains("503"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum StackpulseError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(stackpulse::config),
        help("run `stackpulse init` for a commented .stackpulse.toml template")
    )]
    Config(String),

    /// Malformed diff or input document.
    #[error("parse error: {0}")]
    Parse(String),

    /// The reporting service rejected or failed a request.
    #[error("reporting API error: {0}")]
    #[diagnostic(code(stackpulse::api))]
    Api(String),

    /// A library classifier model could not be loaded.
    #[error("classifier error: {0}")]
    #[diagnostic(code(stackpulse::classifier))]
    Classifier(String),

    /// Git operation failure.
    #[error("git error: {0}")]
    Git(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
