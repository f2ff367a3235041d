use std::path::PathBuf;

use stackpulse_core::{DiffFile, DiffHunk, StackpulseError};

/// Parse a unified diff string (as produced by `git diff`) into [`DiffFile`] entries.
///
/// Handles new, deleted, and renamed files. Binary files are skipped. Hunks
/// keep the added and deleted lines in diff order. Each file's old and new
/// content is the part of that side the diff shows: context plus deleted
/// lines for the old side, context plus added lines for the new side.
///
/// # Errors
///
/// Returns [`StackpulseError::Parse`] if a hunk header is malformed.
///
/// # Examples
///
/// ```
/// use stackpulse_difflens::parser::parse_unified_diff;
///
/// let diff = "diff --git a/App.java b/App.java\n\
///             --- a/App.java\n\
///             +++ b/App.java\n\
///             @@ -1 +1 @@\n\
///             -int x = 0;\n\
///             +int x = 1;\n";
/// let files = parse_unified_diff(diff).unwrap();
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].all_added().collect::<Vec<_>>(), vec!["int x = 1;"]);
/// assert_eq!(files[0].all_deleted().collect::<Vec<_>>(), vec!["int x = 0;"]);
/// assert_eq!(files[0].new_content, vec!["int x = 1;"]);
/// ```
pub fn parse_unified_diff(input: &str) -> Result<Vec<DiffFile>, StackpulseError> {
    let mut files: Vec<DiffFile> = Vec::new();
    let mut current: Option<PendingFile> = None;
    let mut current_hunk: Option<OpenHunk> = None;

    for line in input.lines() {
        if let Some(open) = current_hunk.as_mut() {
            if line == "\\ No newline at end of file" {
                continue;
            }
            if open.consume(line) {
                if open.is_complete() {
                    flush_hunk(&mut current, &mut current_hunk);
                }
                continue;
            }
            // Anything else ends the hunk body early.
            flush_hunk(&mut current, &mut current_hunk);
        }

        if line.starts_with("diff --git ") {
            if let Some(file) = current.take() {
                file.finish_into(&mut files);
            }
            current = Some(PendingFile::default());
            continue;
        }

        // Plain patches have no "diff --git" line; the old-path header starts the file.
        if line.starts_with("--- ") {
            let starts_new = current
                .as_ref()
                .map_or(true, |f| f.new_path.is_some() || !f.hunks.is_empty());
            if starts_new {
                if let Some(file) = current.take() {
                    file.finish_into(&mut files);
                }
                current = Some(PendingFile::default());
            }
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        if line.starts_with("Binary files ") && line.ends_with(" differ") {
            file.is_binary = true;
            continue;
        }

        if line.starts_with("@@ ") {
            let (old_start, old_lines, new_start, new_lines) = parse_hunk_header(line)?;
            current_hunk = Some(OpenHunk {
                hunk: DiffHunk {
                    old_start,
                    old_lines,
                    new_start,
                    new_lines,
                    added: Vec::new(),
                    deleted: Vec::new(),
                },
                old_remaining: old_lines,
                new_remaining: new_lines,
                old_text: Vec::new(),
                new_text: Vec::new(),
            });
            continue;
        }

        file.header_line(line);
    }

    flush_hunk(&mut current, &mut current_hunk);
    if let Some(file) = current.take() {
        file.finish_into(&mut files);
    }

    Ok(files)
}

/// A hunk whose body is still being read, with the line budget from its header.
struct OpenHunk {
    hunk: DiffHunk,
    old_remaining: u32,
    new_remaining: u32,
    /// Old-side lines seen so far, context included.
    old_text: Vec<String>,
    new_text: Vec<String>,
}

impl OpenHunk {
    /// Record a body line; returns `false` if `line` is not part of the hunk.
    fn consume(&mut self, line: &str) -> bool {
        if let Some(deleted) = line.strip_prefix('-') {
            if self.old_remaining == 0 {
                return false;
            }
            self.old_remaining -= 1;
            self.hunk.deleted.push(deleted.to_string());
            self.old_text.push(deleted.to_string());
        } else if let Some(added) = line.strip_prefix('+') {
            if self.new_remaining == 0 {
                return false;
            }
            self.new_remaining -= 1;
            self.hunk.added.push(added.to_string());
            self.new_text.push(added.to_string());
        } else if line.starts_with(' ') || line.is_empty() {
            let context = line.strip_prefix(' ').unwrap_or(line);
            self.old_remaining = self.old_remaining.saturating_sub(1);
            self.new_remaining = self.new_remaining.saturating_sub(1);
            self.old_text.push(context.to_string());
            self.new_text.push(context.to_string());
        } else {
            return false;
        }
        true
    }

    fn is_complete(&self) -> bool {
        self.old_remaining == 0 && self.new_remaining == 0
    }
}

#[derive(Default)]
struct PendingFile {
    old_path: Option<PathBuf>,
    new_path: Option<PathBuf>,
    hunks: Vec<DiffHunk>,
    old_content: Vec<String>,
    new_content: Vec<String>,
    is_binary: bool,
}

impl PendingFile {
    fn header_line(&mut self, line: &str) {
        if let Some(path) = line.strip_prefix("--- ") {
            self.old_path = parse_path(path);
        } else if let Some(path) = line.strip_prefix("+++ ") {
            self.new_path = parse_path(path);
        } else if let Some(path) = line.strip_prefix("rename from ") {
            self.old_path = Some(PathBuf::from(path));
        } else if let Some(path) = line.strip_prefix("rename to ") {
            self.new_path = Some(PathBuf::from(path));
        }
    }

    fn finish_into(self, files: &mut Vec<DiffFile>) {
        if self.is_binary {
            return;
        }
        // Deleted files only have an old path.
        let Some(path) = self.new_path.or(self.old_path) else {
            return;
        };
        let mut file = DiffFile::new(path);
        file.hunks = self.hunks;
        file.old_content = self.old_content;
        file.new_content = self.new_content;
        files.push(file);
    }
}

fn flush_hunk(current: &mut Option<PendingFile>, hunk: &mut Option<OpenHunk>) {
    if let Some(open) = hunk.take() {
        if let Some(file) = current.as_mut() {
            file.old_content.extend(open.old_text);
            file.new_content.extend(open.new_text);
            file.hunks.push(open.hunk);
        }
    }
}

fn parse_path(raw: &str) -> Option<PathBuf> {
    // Some producers append a tab and timestamp after the path.
    let raw = raw.split('\t').next().unwrap_or(raw);
    let normalized = raw.trim_matches('"');

    if normalized == "/dev/null" {
        return None;
    }

    let stripped = normalized
        .strip_prefix("a/")
        .or_else(|| normalized.strip_prefix("b/"))
        .unwrap_or(normalized);

    Some(PathBuf::from(stripped))
}

fn parse_hunk_header(line: &str) -> Result<(u32, u32, u32, u32), StackpulseError> {
    let inner = line
        .strip_prefix("@@ ")
        .and_then(|s| {
            let end = s.find(" @@")?;
            Some(&s[..end])
        })
        .ok_or_else(|| StackpulseError::Parse(format!("invalid hunk header: {line}")))?;

    let parts: Vec<&str> = inner.split(' ').collect();
    if parts.len() != 2 {
        return Err(StackpulseError::Parse(format!("invalid hunk header: {line}")));
    }

    let old = parts[0]
        .strip_prefix('-')
        .ok_or_else(|| StackpulseError::Parse(format!("invalid old range in hunk: {line}")))?;
    let new = parts[1]
        .strip_prefix('+')
        .ok_or_else(|| StackpulseError::Parse(format!("invalid new range in hunk: {line}")))?;

    let (old_start, old_lines) = parse_range(old, line)?;
    let (new_start, new_lines) = parse_range(new, line)?;

    Ok((old_start, old_lines, new_start, new_lines))
}

fn parse_range(range: &str, context: &str) -> Result<(u32, u32), StackpulseError> {
    let invalid = || StackpulseError::Parse(format!("invalid range in: {context}"));
    match range.split_once(',') {
        Some((start, count)) => Ok((
            start.parse().map_err(|_| invalid())?,
            count.parse().map_err(|_| invalid())?,
        )),
        None => Ok((range.parse().map_err(|_| invalid())?, 1)),
    }
}
