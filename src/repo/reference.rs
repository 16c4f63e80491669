//! Repository reference parsing.

use std::fmt;

/// Owner and name extracted from a repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoPath {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parse a repository reference into owner and name.
///
/// Accepts anything whose last two path segments are `owner/name`:
/// `https://github.com/owner/name`, `owner/name`, `git@github.com:owner/name.git`.
/// Returns `None` for references with fewer than two non-empty segments.
pub fn parse_repo_reference(reference: &str) -> Option<RepoPath> {
    let mut path = reference.trim();

    if let Some(rest) = path.strip_prefix("git@") {
        path = rest.split_once(':').map(|(_, p)| p).unwrap_or(rest);
    }

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let mut segments = path.rsplit('/');
    let name = segments.next()?;
    let owner = segments.next()?;

    if owner.is_empty() || name.is_empty() {
        return None;
    }

    Some(RepoPath {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}
