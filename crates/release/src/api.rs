//! The remote repository service as seen by the publisher.
//!
//! This module defines the [`ForgeApi`] trait that provider crates
//! implement on top of their HTTP transport. Each method is exactly one
//! remote call; throttling, pagination, cancellation and error
//! classification are layered on top by [`crate::Publisher`].
//!
//! Provider crates implement `ForgeApi`:
//! - `forgepub-github` - GitHub REST API

use crate::error::ApiResult;
use crate::paginate::{Page, PageRequest};
use crate::quota::QuotaState;
use crate::types::{
    CompareCommit, FileCommit, GitRef, Milestone, NewPullRequest, NewRelease, PullRequest,
    ReleaseAsset, RemoteRelease, Repo, RepoFile, RepoInfo, Tracked,
};
use async_trait::async_trait;
use bytes::Bytes;

/// One method per remote call used by the publishing workflows.
///
/// Implementations report every non-success response as an
/// [`ApiError`](crate::ApiError) carrying the HTTP status, so callers can
/// tell "not found" and "unprocessable" apart from other failures.
#[async_trait]
pub trait ForgeApi: Send + Sync {
    /// Current API quota of the authenticated token.
    async fn rate_limit(&self) -> ApiResult<QuotaState>;

    /// Release notes generated by the remote for the range `previous_tag..tag`.
    async fn generate_release_notes(
        &self,
        repo: &Repo,
        previous_tag: &str,
        tag: &str,
    ) -> ApiResult<String>;

    /// One page of the commits between `base` and `head`.
    async fn compare_commits(
        &self,
        repo: &Repo,
        base: &str,
        head: &str,
        page: PageRequest,
    ) -> ApiResult<Page<CompareCommit>>;

    /// Repository metadata.
    async fn repository(&self, repo: &Repo) -> ApiResult<RepoInfo>;

    /// One page of the repository's open milestones.
    async fn list_milestones(&self, repo: &Repo, page: PageRequest) -> ApiResult<Page<Milestone>>;

    /// Replaces a milestone with the given object.
    async fn edit_milestone(&self, repo: &Repo, milestone: &Milestone) -> ApiResult<Milestone>;

    /// A file at `path` on `git_ref`.
    async fn get_contents(&self, repo: &Repo, path: &str, git_ref: &str) -> ApiResult<RepoFile>;

    /// Succeeds when `branch` exists.
    async fn get_branch(&self, repo: &Repo, branch: &str) -> ApiResult<()>;

    /// Resolves a ref such as `heads/main`.
    async fn get_ref(&self, repo: &Repo, git_ref: &str) -> ApiResult<GitRef>;

    /// Creates the fully qualified ref `git_ref` pointing at `sha`.
    async fn create_ref(&self, repo: &Repo, git_ref: &str, sha: &str) -> ApiResult<GitRef>;

    /// Creates or updates a file in a single commit.
    async fn put_file(&self, repo: &Repo, commit: &FileCommit) -> ApiResult<()>;

    /// Opens a pull request against `repo`.
    async fn create_pull_request(
        &self,
        repo: &Repo,
        pull: &NewPullRequest,
    ) -> ApiResult<PullRequest>;

    /// The release attached to `tag`.
    async fn release_by_tag(&self, repo: &Repo, tag: &str) -> ApiResult<RemoteRelease>;

    /// Creates a release.
    async fn create_release(
        &self,
        repo: &Repo,
        release: &NewRelease,
    ) -> ApiResult<Tracked<RemoteRelease>>;

    /// Replaces the fields of release `id`.
    async fn edit_release(
        &self,
        repo: &Repo,
        id: u64,
        release: &NewRelease,
    ) -> ApiResult<Tracked<RemoteRelease>>;

    /// One page of the repository's releases, drafts included.
    async fn list_releases(&self, repo: &Repo, page: PageRequest) -> ApiResult<Page<RemoteRelease>>;

    /// Deletes release `id`.
    async fn delete_release(&self, repo: &Repo, id: u64) -> ApiResult<()>;

    /// Uploads `data` as asset `name` of release `release_id`.
    async fn upload_release_asset(
        &self,
        repo: &Repo,
        release_id: u64,
        name: &str,
        data: Bytes,
    ) -> ApiResult<Tracked<ReleaseAsset>>;
}
