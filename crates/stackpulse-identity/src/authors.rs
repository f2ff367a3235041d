//! Commit authors from git history via git2.

use std::collections::BTreeSet;
use std::path::Path;

use git2::{Repository, Sort};
use stackpulse_core::{Author, StackpulseError};

/// Distinct commit authors reachable from `HEAD`, sorted by name then email.
///
/// Authors whose name or email is not valid UTF-8 are converted lossily.
///
/// # Errors
///
/// Returns [`StackpulseError::Git`] if the repository cannot be opened or walked.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use stackpulse_identity::collect_authors;
///
/// let authors = collect_authors(Path::new(".")).unwrap();
/// for a in &authors {
///     println!("{} <{}>", a.name, a.email);
/// }
/// ```
pub fn collect_authors(repo_path: &Path) -> Result<Vec<Author>, StackpulseError> {
    let repo = Repository::open(repo_path)
        .map_err(|e| StackpulseError::Git(format!("failed to open repository: {e}")))?;

    let mut revwalk = repo
        .revwalk()
        .map_err(|e| StackpulseError::Git(format!("failed to create revwalk: {e}")))?;
    revwalk.set_sorting(Sort::TIME).ok();
    revwalk
        .push_head()
        .map_err(|e| StackpulseError::Git(format!("failed to push HEAD: {e}")))?;

    let mut authors = BTreeSet::new();
    let mut commits = 0usize;
    for oid_result in revwalk {
        let oid = oid_result.map_err(|e| StackpulseError::Git(format!("revwalk error: {e}")))?;
        let commit = repo
            .find_commit(oid)
            .map_err(|e| StackpulseError::Git(format!("failed to find commit: {e}")))?;

        let signature = commit.author();
        let name = String::from_utf8_lossy(signature.name_bytes()).into_owned();
        let email = String::from_utf8_lossy(signature.email_bytes()).into_owned();
        authors.insert(Author::new(name, email));
        commits += 1;
    }

    tracing::debug!(
        repo = %repo_path.display(),
        commits,
        authors = authors.len(),
        "collected commit authors"
    );
    Ok(authors.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_repository_is_git_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = collect_authors(&dir.path().join("nope"));
        assert!(matches!(result, Err(StackpulseError::Git(_))));
    }

    #[test]
    fn empty_repository_has_no_head() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let result = collect_authors(dir.path());
        assert!(matches!(result, Err(StackpulseError::Git(_))));
    }
}
