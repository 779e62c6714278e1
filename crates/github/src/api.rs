//! [`ForgeApi`] over the GitHub REST v3 endpoints.
//!
//! Calls go through octocrab's handlers where one exists and through its
//! typed `get`/`post`/`patch`/`put` routes otherwise. Create and edit of a
//! release use the low-level routes so GitHub's request id survives.

use crate::client::{GitHubClient, api_error};
use crate::wire::{
    Comparison, CreateReference, MilestoneEdit, MilestoneQuery, PageQuery, PutContents,
    git_ref, into_page, quota_state, remote_release, repo_file,
};
use async_trait::async_trait;
use bytes::Bytes;
use forgepub_release::{
    ApiError, ApiResult, CompareCommit, FileCommit, ForgeApi, GitRef, Milestone, NewPullRequest,
    NewRelease, Page, PageRequest, PullRequest, QuotaState, ReleaseAsset, RemoteRelease, Repo,
    RepoFile, RepoInfo, STATUS_NOT_FOUND, Tracked,
};
use octocrab::models::repos::Ref;
use tracing::debug;

fn route(repo: &Repo, rest: &str) -> String {
    format!("/repos/{}/{}{rest}", repo.owner, repo.name)
}

#[async_trait]
impl ForgeApi for GitHubClient {
    async fn rate_limit(&self) -> ApiResult<QuotaState> {
        let limit = self.octocrab().ratelimit().get().await.map_err(api_error)?;
        Ok(quota_state(&limit))
    }

    async fn generate_release_notes(
        &self,
        repo: &Repo,
        previous_tag: &str,
        tag: &str,
    ) -> ApiResult<String> {
        let notes = self
            .octocrab()
            .repos(&repo.owner, &repo.name)
            .releases()
            .generate_release_notes(tag)
            .previous_tag_name(previous_tag)
            .send()
            .await
            .map_err(api_error)?;
        Ok(notes.body)
    }

    async fn compare_commits(
        &self,
        repo: &Repo,
        base: &str,
        head: &str,
        page: PageRequest,
    ) -> ApiResult<Page<CompareCommit>> {
        let route = route(repo, &format!("/compare/{base}...{head}"));
        let comparison: Comparison = self
            .octocrab()
            .get(&route, Some(&PageQuery::from(page)))
            .await
            .map_err(api_error)?;
        Ok(comparison.into_page(page))
    }

    async fn repository(&self, repo: &Repo) -> ApiResult<RepoInfo> {
        let repository = self
            .octocrab()
            .repos(&repo.owner, &repo.name)
            .get()
            .await
            .map_err(api_error)?;
        Ok(RepoInfo {
            default_branch: repository.default_branch.unwrap_or_default(),
        })
    }

    async fn list_milestones(&self, repo: &Repo, page: PageRequest) -> ApiResult<Page<Milestone>> {
        let route = route(repo, "/milestones");
        let listing: octocrab::Page<Milestone> = self
            .octocrab()
            .get(&route, Some(&MilestoneQuery::from(page)))
            .await
            .map_err(api_error)?;
        let has_next = listing.next.is_some();
        Ok(into_page(listing.items, has_next, page))
    }

    async fn edit_milestone(&self, repo: &Repo, milestone: &Milestone) -> ApiResult<Milestone> {
        let route = route(repo, &format!("/milestones/{}", milestone.number));
        self.octocrab()
            .patch(&route, Some(&MilestoneEdit::from(milestone)))
            .await
            .map_err(api_error)
    }

    async fn get_contents(&self, repo: &Repo, path: &str, git_ref: &str) -> ApiResult<RepoFile> {
        let repos = self.octocrab().repos(&repo.owner, &repo.name);
        let mut request = repos.get_content().path(path);
        if !git_ref.is_empty() {
            request = request.r#ref(git_ref);
        }
        let contents = request.send().await.map_err(api_error)?;
        match contents.items.into_iter().next() {
            Some(content) => repo_file(content),
            None => Err(ApiError::status(STATUS_NOT_FOUND, format!("{path} has no content"))),
        }
    }

    async fn get_branch(&self, repo: &Repo, branch: &str) -> ApiResult<()> {
        let route = route(repo, &format!("/branches/{branch}"));
        self.octocrab()
            .get::<serde_json::Value, _, _>(&route, None::<&()>)
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn get_ref(&self, repo: &Repo, name: &str) -> ApiResult<GitRef> {
        let route = route(repo, &format!("/git/ref/{name}"));
        let reference: Ref = self
            .octocrab()
            .get(&route, None::<&()>)
            .await
            .map_err(api_error)?;
        git_ref(reference)
    }

    async fn create_ref(&self, repo: &Repo, name: &str, sha: &str) -> ApiResult<GitRef> {
        let route = route(repo, "/git/refs");
        let reference: Ref = self
            .octocrab()
            .post(&route, Some(&CreateReference { name, sha }))
            .await
            .map_err(api_error)?;
        git_ref(reference)
    }

    async fn put_file(&self, repo: &Repo, commit: &FileCommit) -> ApiResult<()> {
        let route = route(repo, &format!("/contents/{}", commit.path.trim_start_matches('/')));
        self.octocrab()
            .put::<serde_json::Value, _, _>(&route, Some(&PutContents::from(commit)))
            .await
            .map_err(api_error)?;
        debug!(path = %commit.path, branch = %commit.branch, "contents written");
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo: &Repo,
        pull: &NewPullRequest,
    ) -> ApiResult<PullRequest> {
        let route = route(repo, "/pulls");
        self.octocrab()
            .post(&route, Some(pull))
            .await
            .map_err(api_error)
    }

    async fn release_by_tag(&self, repo: &Repo, tag: &str) -> ApiResult<RemoteRelease> {
        let release = self
            .octocrab()
            .repos(&repo.owner, &repo.name)
            .releases()
            .get_by_tag(tag)
            .await
            .map_err(api_error)?;
        Ok(remote_release(release))
    }

    async fn create_release(
        &self,
        repo: &Repo,
        release: &NewRelease,
    ) -> ApiResult<Tracked<RemoteRelease>> {
        let route = route(repo, "/releases");
        let response = self.octocrab()._post(route.as_str(), Some(release)).await;
        self.tracked(response).await
    }

    async fn edit_release(
        &self,
        repo: &Repo,
        id: u64,
        release: &NewRelease,
    ) -> ApiResult<Tracked<RemoteRelease>> {
        let route = route(repo, &format!("/releases/{id}"));
        let response = self.octocrab()._patch(route.as_str(), Some(release)).await;
        self.tracked(response).await
    }

    async fn list_releases(&self, repo: &Repo, page: PageRequest) -> ApiResult<Page<RemoteRelease>> {
        let repo_handler = self.octocrab().repos(&repo.owner, &repo.name);
        let releases = repo_handler.releases();
        let mut request = releases.list().per_page(page.per_page);
        if let Some(number) = page.page {
            request = request.page(number);
        }
        let listing = request.send().await.map_err(api_error)?;
        let has_next = listing.next.is_some();
        let items = listing.items.into_iter().map(remote_release).collect();
        Ok(into_page(items, has_next, page))
    }

    async fn delete_release(&self, repo: &Repo, id: u64) -> ApiResult<()> {
        self.octocrab()
            .repos(&repo.owner, &repo.name)
            .releases()
            .delete(id)
            .await
            .map_err(api_error)
    }

    async fn upload_release_asset(
        &self,
        repo: &Repo,
        release_id: u64,
        name: &str,
        data: Bytes,
    ) -> ApiResult<Tracked<ReleaseAsset>> {
        self.upload(repo, release_id, name, data).await
    }
}
