//! Conversions between octocrab models and the provider-agnostic types,
//! plus the few payloads octocrab has no model for.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use forgepub_release::{
    ApiError, ApiResult, CommitAuthor, CompareCommit, FileCommit, GitRef, Milestone,
    MilestoneState, Page, PageRequest, QuotaState, RemoteRelease, RepoFile,
};
use octocrab::models::repos::{Content, Object, Ref, Release};
use octocrab::models::RateLimit;
use serde::{Deserialize, Serialize};

/// Pagination parameters in GitHub's query form.
#[derive(Debug, Serialize)]
pub struct PageQuery {
    pub per_page: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl From<PageRequest> for PageQuery {
    fn from(request: PageRequest) -> Self {
        Self {
            per_page: request.per_page,
            page: request.page,
        }
    }
}

/// Milestone listing restricted to open milestones.
#[derive(Debug, Serialize)]
pub struct MilestoneQuery {
    pub state: &'static str,
    #[serde(flatten)]
    pub page: PageQuery,
}

impl From<PageRequest> for MilestoneQuery {
    fn from(request: PageRequest) -> Self {
        Self {
            state: "open",
            page: request.into(),
        }
    }
}

/// Builds a page whose cursor follows the one it was fetched with.
pub fn into_page<T>(items: Vec<T>, has_next: bool, request: PageRequest) -> Page<T> {
    let current = request.page.unwrap_or(1);
    Page {
        items,
        next_page: has_next.then(|| current.saturating_add(1)),
    }
}

pub fn quota_state(limit: &RateLimit) -> QuotaState {
    let core = &limit.resources.core;
    QuotaState {
        remaining: u32::try_from(core.remaining).unwrap_or(u32::MAX),
        reset_at: i64::try_from(core.reset)
            .ok()
            .and_then(|reset| DateTime::from_timestamp(reset, 0))
            .unwrap_or_else(Utc::now),
    }
}

pub fn remote_release(release: Release) -> RemoteRelease {
    RemoteRelease {
        id: release.id.0,
        tag_name: release.tag_name,
        name: release.name,
        body: release.body,
        draft: release.draft,
        prerelease: release.prerelease,
        target_commitish: Some(release.target_commitish),
    }
}

/// Decodes a file body, which GitHub wraps at 60 columns.
pub fn repo_file(content: Content) -> ApiResult<RepoFile> {
    let raw = content.content.unwrap_or_default();
    let body = match content.encoding.as_deref() {
        Some("base64") => {
            let packed: String = raw.split_whitespace().collect();
            STANDARD
                .decode(packed)
                .map_err(|err| ApiError::transport(format!("invalid base64 file content: {err}")))?
        }
        _ => raw.into_bytes(),
    };
    Ok(RepoFile {
        sha: content.sha,
        content: body,
    })
}

pub fn git_ref(reference: Ref) -> ApiResult<GitRef> {
    let sha = match reference.object {
        Object::Commit { sha, .. } | Object::Tag { sha, .. } => sha,
        _ => {
            return Err(ApiError::transport(format!(
                "{} points at an unsupported object",
                reference.ref_field
            )));
        }
    };
    Ok(GitRef {
        name: reference.ref_field,
        sha,
    })
}

#[derive(Debug, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    total_commits: u64,
    #[serde(default)]
    commits: Vec<ComparedCommit>,
}

#[derive(Debug, Deserialize)]
struct ComparedCommit {
    sha: String,
    commit: CommitDetail,
    /// `null` when the commit email is not linked to an account
    author: Option<Account>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    login: String,
}

impl Comparison {
    /// The compare endpoint pages its commit list without a `Link` header,
    /// so the cursor comes from the reported total.
    pub fn into_page(self, request: PageRequest) -> Page<CompareCommit> {
        let current = u64::from(request.page.unwrap_or(1));
        let per_page = u64::from(request.per_page);
        let has_next = per_page > 0 && current * per_page < self.total_commits;
        let commits = self
            .commits
            .into_iter()
            .map(|commit| CompareCommit {
                sha: commit.sha,
                message: commit.commit.message,
                author_login: commit.author.map(|a| a.login).unwrap_or_default(),
            })
            .collect();
        into_page(commits, has_next, request)
    }
}

/// Milestone fields sent on edit; the number travels in the path.
#[derive(Debug, Serialize)]
pub struct MilestoneEdit<'a> {
    pub title: &'a str,
    pub state: MilestoneState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_on: Option<&'a str>,
}

impl<'a> From<&'a Milestone> for MilestoneEdit<'a> {
    fn from(milestone: &'a Milestone) -> Self {
        Self {
            title: &milestone.title,
            state: milestone.state,
            description: milestone.description.as_deref(),
            due_on: milestone.due_on.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PutContents<'a> {
    pub message: &'a str,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
    pub committer: &'a CommitAuthor,
}

impl<'a> From<&'a FileCommit> for PutContents<'a> {
    fn from(commit: &'a FileCommit) -> Self {
        Self {
            message: &commit.message,
            content: STANDARD.encode(&commit.content),
            branch: &commit.branch,
            sha: commit.prior_sha.as_deref(),
            committer: &commit.committer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateReference<'a> {
    #[serde(rename = "ref")]
    pub name: &'a str,
    pub sha: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(encoding: &str, body: &str) -> Content {
        serde_json::from_value(json!({
            "type": "file",
            "encoding": encoding,
            "size": 11,
            "name": "README.md",
            "path": "README.md",
            "content": body,
            "sha": "abc",
            "url": "https://api.github.com/repos/o/r/contents/README.md",
            "git_url": "https://api.github.com/repos/o/r/git/blobs/abc",
            "html_url": "https://github.com/o/r/blob/main/README.md",
            "download_url": "https://raw.githubusercontent.com/o/r/main/README.md",
            "_links": {
                "self": "https://api.github.com/repos/o/r/contents/README.md",
                "git": "https://api.github.com/repos/o/r/git/blobs/abc",
                "html": "https://github.com/o/r/blob/main/README.md"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_rate_limit_reset_is_epoch_seconds() {
        let rate = json!({"limit": 5000, "used": 4958, "remaining": 42, "reset": 1_700_000_000});
        let limit: RateLimit = serde_json::from_value(json!({
            "resources": {"core": rate, "search": rate},
            "rate": rate
        }))
        .unwrap();
        let state = quota_state(&limit);
        assert_eq!(state.remaining, 42);
        assert_eq!(state.reset_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_page_cursor_follows_request() {
        let first = into_page(vec![1, 2], true, PageRequest::first(2));
        assert_eq!(first.next_cursor(), Some(2));

        let request = PageRequest {
            page: Some(4),
            per_page: 2,
        };
        assert_eq!(into_page(vec![1], true, request).next_cursor(), Some(5));
        assert_eq!(into_page(vec![1], false, request).next_cursor(), None);
    }

    #[test]
    fn test_milestone_query_flattens_page() {
        let query = MilestoneQuery::from(PageRequest::first(100));
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, json!({"state": "open", "per_page": 100}));
    }

    #[test]
    fn test_comparison_without_linked_author() {
        let raw = r#"{"total_commits":2,"commits":[
            {"sha":"a1","commit":{"message":"fix: one\n\nbody"},"author":{"login":"octocat"}},
            {"sha":"b2","commit":{"message":"chore: two"},"author":null}
        ]}"#;
        let page = serde_json::from_str::<Comparison>(raw)
            .unwrap()
            .into_page(PageRequest::first(100));
        assert_eq!(page.items[0].changelog_line(), "a1: fix: one (@octocat)");
        assert_eq!(page.items[1].author_login, "");
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn test_comparison_pages_by_total() {
        let raw = r#"{"total_commits":5,"commits":[
            {"sha":"a1","commit":{"message":"one"},"author":null},
            {"sha":"b2","commit":{"message":"two"},"author":null}
        ]}"#;
        let first = PageRequest::first(2);
        let page = serde_json::from_str::<Comparison>(raw).unwrap().into_page(first);
        assert_eq!(page.next_cursor(), Some(2));

        let third = PageRequest {
            page: Some(3),
            per_page: 2,
        };
        let page = serde_json::from_str::<Comparison>(raw).unwrap().into_page(third);
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn test_contents_decodes_wrapped_base64() {
        let file = repo_file(content("base64", "aGVsbG8g\nd29ybGQ=\n")).unwrap();
        assert_eq!(file.sha, "abc");
        assert_eq!(file.content, b"hello world");
    }

    #[test]
    fn test_contents_rejects_bad_base64() {
        assert!(repo_file(content("base64", "!!!")).is_err());
    }

    #[test]
    fn test_ref_to_tag_object() {
        let reference: Ref = serde_json::from_value(json!({
            "ref": "refs/tags/v1.0.0",
            "node_id": "MDM6UmVm",
            "url": "https://api.github.com/repos/o/r/git/refs/tags/v1.0.0",
            "object": {
                "type": "tag",
                "sha": "5ca1ab1e",
                "url": "https://api.github.com/repos/o/r/git/tags/5ca1ab1e"
            }
        }))
        .unwrap();
        let git_ref = git_ref(reference).unwrap();
        assert_eq!(git_ref.name, "refs/tags/v1.0.0");
        assert_eq!(git_ref.sha, "5ca1ab1e");
    }

    #[test]
    fn test_put_contents_encodes_and_omits_missing_sha() {
        let commit = FileCommit {
            path: "README.md".to_string(),
            content: b"hello world".to_vec(),
            message: "docs".to_string(),
            branch: "main".to_string(),
            committer: CommitAuthor::new("bot", "bot@example.com"),
            prior_sha: None,
        };
        let json = serde_json::to_value(PutContents::from(&commit)).unwrap();
        assert_eq!(json["content"], "aGVsbG8gd29ybGQ=");
        assert_eq!(json["committer"]["email"], "bot@example.com");
        assert!(json.get("sha").is_none());
    }

    #[test]
    fn test_milestone_edit_omits_number() {
        let milestone = Milestone {
            number: 7,
            title: "v1.2.0".to_string(),
            state: MilestoneState::Closed,
            description: None,
            due_on: None,
        };
        let json = serde_json::to_value(MilestoneEdit::from(&milestone)).unwrap();
        assert!(json.get("number").is_none());
        assert_eq!(json["state"], "closed");
    }
}
