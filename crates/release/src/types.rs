//! Data transfer types exchanged with the remote repository service.
//!
//! Everything here is a transient value built per call; nothing is cached
//! between invocations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a remote repository and, optionally, a ref within it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repo {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Branch to operate on; `None` means the repository's default branch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Repo {
    /// Creates a repository reference without a branch.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch: None,
        }
    }

    /// Sets the branch.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// The configured branch, treating an empty string as unset.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref().filter(|b| !b.is_empty())
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Name and email recorded as the committer of published files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    /// Committer name
    pub name: String,
    /// Committer email
    pub email: String,
}

impl CommitAuthor {
    /// Creates a committer identity.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Repository metadata needed by the publishing workflows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoInfo {
    /// Name of the default branch
    pub default_branch: String,
}

/// A commit as listed by the compare endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareCommit {
    /// Full commit SHA
    pub sha: String,
    /// Full commit message
    pub message: String,
    /// Login of the linked account, empty when the author has none
    pub author_login: String,
}

impl CompareCommit {
    /// Formats the commit as a single changelog line.
    ///
    /// Only the first line of the message is kept.
    #[must_use]
    pub fn changelog_line(&self) -> String {
        let subject = self.message.lines().next().unwrap_or_default();
        format!("{}: {} (@{})", self.sha, subject, self.author_login)
    }
}

/// Milestone state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    /// Accepting issues (default)
    #[default]
    Open,
    /// Closed
    Closed,
}

/// A milestone, round-tripped in full when edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Milestone number within the repository
    pub number: u64,
    /// Milestone title
    pub title: String,
    /// Current state
    #[serde(default)]
    pub state: MilestoneState,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date as reported by the remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
}

/// A file as stored in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    /// Content hash the remote requires to update the file
    pub sha: String,
    /// Decoded file content
    pub content: Vec<u8>,
}

/// A git reference and the object it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRef {
    /// Fully qualified name, e.g. `refs/heads/main`
    pub name: String,
    /// SHA of the commit the ref points at
    pub sha: String,
}

/// A create-or-update request for a single file.
///
/// `prior_sha` must carry the current content hash when the file exists;
/// its absence tells the remote to create the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    /// Path of the file inside the repository
    pub path: String,
    /// Raw file content
    pub content: Vec<u8>,
    /// Commit message
    pub message: String,
    /// Branch receiving the commit
    pub branch: String,
    /// Committer identity
    pub committer: CommitAuthor,
    /// Content hash of the file being replaced
    pub prior_sha: Option<String>,
}

/// A pull request to be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    /// Pull request title
    pub title: String,
    /// Head ref in `owner:name:branch` form
    pub head: String,
    /// Branch the changes are merged into
    pub base: String,
    /// Pull request body
    pub body: String,
    /// Whether the pull request is opened as a draft
    pub draft: bool,
}

/// A pull request as returned by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    /// Pull request number
    pub number: u64,
    /// Web URL of the pull request
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Release payload for create and edit calls.
///
/// Optional fields are omitted from the request when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Tag the release is attached to
    pub tag_name: String,
    /// Release title
    pub name: String,
    /// Release notes
    pub body: String,
    /// Whether the release is a draft
    pub draft: bool,
    /// Whether the release is a prerelease
    pub prerelease: bool,
    /// Commitish the tag is created from when it does not exist yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
    /// Discussion category to open a release discussion in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discussion_category_name: Option<String>,
}

/// A release as returned by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRelease {
    /// Remote-assigned identifier
    pub id: u64,
    /// Tag name
    pub tag_name: String,
    /// Release title
    #[serde(default)]
    pub name: Option<String>,
    /// Release notes
    #[serde(default)]
    pub body: Option<String>,
    /// Whether the release is a draft
    #[serde(default)]
    pub draft: bool,
    /// Whether the release is a prerelease
    #[serde(default)]
    pub prerelease: bool,
    /// Commitish the release targets
    #[serde(default)]
    pub target_commitish: Option<String>,
}

/// An uploaded release asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    /// Remote-assigned identifier
    pub id: u64,
    /// Asset file name
    pub name: String,
    /// Public download URL
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

/// An artifact to attach to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Display name the asset is uploaded under
    pub name: String,
    /// Local path, used for diagnostics
    pub path: Option<std::path::PathBuf>,
}

impl Asset {
    /// Creates an asset with the given display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    /// Records the local path of the asset.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// A remote response paired with its request-correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked<T> {
    /// The response payload
    pub value: T,
    /// Request-correlation id reported by the remote
    pub request_id: Option<String>,
}

impl<T> Tracked<T> {
    /// Wraps a value without a request id.
    #[must_use]
    pub const fn untracked(value: T) -> Self {
        Self {
            value,
            request_id: None,
        }
    }

    /// Wraps a value with its request id.
    #[must_use]
    pub const fn new(value: T, request_id: Option<String>) -> Self {
        Self { value, request_id }
    }
}
