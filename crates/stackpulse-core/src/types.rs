use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between language and name in a [`CommitStats::tech`] identifier.
pub const TECH_SEPARATOR: &str = ":";

/// One changed file in a commit.
///
/// Hunks keep the added and deleted lines in diff order. The old/new content
/// holds whatever the producer saw of each side: the diff parser fills it with
/// context plus changed lines. When a side is empty the changed lines stand
/// in for it.
///
/// # Examples
///
/// ```
/// use stackpulse_core::{DiffFile, DiffHunk};
///
/// let mut file = DiffFile::new("src/App.java");
/// file.hunks.push(DiffHunk {
///     added: vec!["int x = 1;".into()],
///     deleted: vec!["int x = 0;".into()],
///     ..DiffHunk::default()
/// });
/// assert_eq!(file.all_added().collect::<Vec<_>>(), vec!["int x = 1;"]);
/// assert!(file.language.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFile {
    /// Path relative to the repository root (new path, or old path for deletions).
    pub path: PathBuf,
    /// Language assigned by the extractor that processed this file.
    #[serde(default)]
    pub language: Option<String>,
    /// Changed regions in diff order.
    #[serde(default)]
    pub hunks: Vec<DiffHunk>,
    /// File content before the commit, as far as it is known.
    #[serde(default)]
    pub old_content: Vec<String>,
    /// File content after the commit, as far as it is known.
    #[serde(default)]
    pub new_content: Vec<String>,
}

impl DiffFile {
    /// Create an empty diff file for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// All added lines, flattened across hunks.
    pub fn all_added(&self) -> impl Iterator<Item = &str> + '_ {
        self.hunks
            .iter()
            .flat_map(|h| h.added.iter().map(String::as_str))
    }

    /// All deleted lines, flattened across hunks.
    pub fn all_deleted(&self) -> impl Iterator<Item = &str> + '_ {
        self.hunks
            .iter()
            .flat_map(|h| h.deleted.iter().map(String::as_str))
    }

    /// Content that import extraction should see for the new side.
    ///
    /// Falls back to the added lines when the full content was not loaded.
    pub fn new_side(&self) -> Vec<&str> {
        if self.new_content.is_empty() {
            self.all_added().collect()
        } else {
            self.new_content.iter().map(String::as_str).collect()
        }
    }

    /// Content that import extraction should see for the old side.
    ///
    /// Falls back to the deleted lines when the full content was not loaded.
    pub fn old_side(&self) -> Vec<&str> {
        if self.old_content.is_empty() {
            self.all_deleted().collect()
        } else {
            self.old_content.iter().map(String::as_str).collect()
        }
    }

    /// Return a copy of this file tagged with `language`.
    pub fn with_language(&self, language: &str) -> Self {
        Self {
            language: Some(language.to_string()),
            ..self.clone()
        }
    }
}

/// A single hunk of a [`DiffFile`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    /// Starting line in the old version.
    pub old_start: u32,
    /// Number of lines in the old version.
    pub old_lines: u32,
    /// Starting line in the new version.
    pub new_start: u32,
    /// Number of lines in the new version.
    pub new_lines: u32,
    /// Added lines without the leading `+`.
    #[serde(default)]
    pub added: Vec<String>,
    /// Deleted lines without the leading `-`.
    #[serde(default)]
    pub deleted: Vec<String>,
}

/// Kind of technology a [`CommitStats`] record measures.
///
/// # Examples
///
/// ```
/// use stackpulse_core::StatType;
///
/// assert_eq!(StatType::Library.to_string(), "LIBRARY");
/// assert_eq!(serde_json::to_string(&StatType::Keyword).unwrap(), "\"KEYWORD\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatType {
    /// Usage of a third-party library.
    Library,
    /// Usage of a language keyword.
    Keyword,
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatType::Library => write!(f, "LIBRARY"),
            StatType::Keyword => write!(f, "KEYWORD"),
        }
    }
}

/// One measured fact about a commit: lines added/deleted that use a technology.
///
/// # Examples
///
/// ```
/// use stackpulse_core::{CommitStats, StatType};
///
/// let stat = CommitStats::new(StatType::Keyword, "java", "new", 3, 1);
/// assert_eq!(stat.tech, "java:new");
/// assert_eq!(stat.name(), "new");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStats {
    /// Lines added that use the technology.
    pub num_lines_added: u32,
    /// Lines deleted that used the technology.
    pub num_lines_deleted: u32,
    /// What kind of technology this is.
    #[serde(rename = "type")]
    pub stat_type: StatType,
    /// `language:name` identifier.
    pub tech: String,
}

impl CommitStats {
    /// Build a record, composing the tech identifier from `language` and `name`.
    pub fn new(
        stat_type: StatType,
        language: &str,
        name: &str,
        num_lines_added: u32,
        num_lines_deleted: u32,
    ) -> Self {
        Self {
            num_lines_added,
            num_lines_deleted,
            stat_type,
            tech: format!("{language}{TECH_SEPARATOR}{name}"),
        }
    }

    /// Language part of the tech identifier.
    pub fn language(&self) -> &str {
        self.tech
            .split_once(TECH_SEPARATOR)
            .map_or(self.tech.as_str(), |(lang, _)| lang)
    }

    /// Library or keyword part of the tech identifier.
    pub fn name(&self) -> &str {
        self.tech
            .split_once(TECH_SEPARATOR)
            .map_or("", |(_, name)| name)
    }
}

/// Opaque reference to the repository being analyzed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Repo {
    /// Identifier the reporting service knows the repository by.
    pub id: String,
}

impl Repo {
    /// Create a repository reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Repository-level fact codes understood by the reporting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactCode {
    /// Estimated number of distinct humans committing to the repository.
    TeamSize,
}

impl fmt::Display for FactCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactCode::TeamSize => write!(f, "TEAM_SIZE"),
        }
    }
}

/// A reporting-ready statement about a repository.
///
/// # Examples
///
/// ```
/// use stackpulse_core::{Fact, FactCode, Repo};
///
/// let fact = Fact::new(Repo::new("r1"), FactCode::TeamSize, 0, "4");
/// assert_eq!(fact.value, "4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    /// Repository the fact is about.
    pub repo: Repo,
    /// What the fact measures.
    pub code: FactCode,
    /// Numeric sub-key; 0 for repository-wide facts.
    pub weight: u32,
    /// Measured value.
    pub value: String,
}

impl Fact {
    pub fn new(repo: Repo, code: FactCode, weight: u32, value: impl Into<String>) -> Self {
        Self {
            repo,
            code,
            weight,
            value: value.into(),
        }
    }
}

/// A commit identity.
///
/// Two authors are equal only when both name and email match exactly.
///
/// # Examples
///
/// ```
/// use stackpulse_core::Author;
///
/// let a = Author::new("Jon Smith", "jon@example.com");
/// assert_eq!(a.email_local_part(), "jon");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Text before the first `@`, or the whole email when there is none.
    pub fn email_local_part(&self) -> &str {
        self.email
            .split_once('@')
            .map_or(self.email.as_str(), |(local, _)| local)
    }
}

/// Output format for CLI subcommands.
///
/// # Examples
///
/// ```
/// use stackpulse_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> DiffFile {
        DiffFile {
            path: PathBuf::from("web/app.JSX"),
            language: None,
            hunks: vec![
                DiffHunk {
                    added: vec!["a1".into(), "a2".into()],
                    deleted: vec!["d1".into()],
                    ..DiffHunk::default()
                },
                DiffHunk {
                    added: vec!["a3".into()],
                    deleted: vec![],
                    ..DiffHunk::default()
                },
            ],
            old_content: vec![],
            new_content: vec![],
        }
    }

    #[test]
    fn added_and_deleted_flatten_across_hunks() {
        let file = sample_file();
        assert_eq!(file.all_added().collect::<Vec<_>>(), vec!["a1", "a2", "a3"]);
        assert_eq!(file.all_deleted().collect::<Vec<_>>(), vec!["d1"]);
    }

    #[test]
    fn sides_fall_back_to_changed_lines() {
        let mut file = sample_file();
        assert_eq!(file.new_side(), vec!["a1", "a2", "a3"]);
        assert_eq!(file.old_side(), vec!["d1"]);

        file.new_content = vec!["full".into()];
        assert_eq!(file.new_side(), vec!["full"]);
    }

    #[test]
    fn with_language_leaves_original_untouched() {
        let file = sample_file();
        let tagged = file.with_language("javascript");
        assert_eq!(tagged.language.as_deref(), Some("javascript"));
        assert!(file.language.is_none());
        assert_eq!(tagged.hunks, file.hunks);
    }

    #[test]
    fn commit_stats_tech_parts() {
        let stat = CommitStats::new(StatType::Library, "java", "org.junit", 2, 0);
        assert_eq!(stat.tech, "java:org.junit");
        assert_eq!(stat.language(), "java");
        assert_eq!(stat.name(), "org.junit");
    }

    #[test]
    fn commit_stats_serializes_type_field() {
        let stat = CommitStats::new(StatType::Keyword, "java", "for", 1, 2);
        let json = serde_json::to_value(&stat).unwrap();
        assert_eq!(json["type"], "KEYWORD");
        assert_eq!(json["numLinesAdded"], 1);
        assert_eq!(json["numLinesDeleted"], 2);
        assert_eq!(json["tech"], "java:for");
    }

    #[test]
    fn fact_code_serializes_screaming_snake() {
        let fact = Fact::new(Repo::new("abc"), FactCode::TeamSize, 0, "3");
        let json = serde_json::to_value(&fact).unwrap();
        assert_eq!(json["code"], "TEAM_SIZE");
        assert_eq!(json["repo"]["id"], "abc");
        assert_eq!(FactCode::TeamSize.to_string(), "TEAM_SIZE");
    }

    #[test]
    fn author_local_part() {
        assert_eq!(Author::new("a", "j@x.com").email_local_part(), "j");
        assert_eq!(Author::new("a", "no-at-sign").email_local_part(), "no-at-sign");
        assert_eq!(Author::new("a", "").email_local_part(), "");
    }

    #[test]
    fn authors_compare_on_both_fields() {
        let a = Author::new("Ann", "ann@x.com");
        assert_eq!(a, Author::new("Ann", "ann@x.com"));
        assert_ne!(a, Author::new("Ann", "ann@y.com"));
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
