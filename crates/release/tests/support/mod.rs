//! In-memory `ForgeApi` used by the publisher integration tests.
//!
//! The fake keeps a tiny model of a repository (branches, files, releases,
//! milestones, commits) and records every call by name so tests can assert
//! on ordering. Individual methods can be made to fail with a given
//! [`ApiError`] through [`FakeForge::fail`].

#![allow(dead_code, clippy::unwrap_used, missing_docs)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeDelta, Utc};
use forgepub_release::{
    ApiError, ApiResult, CompareCommit, FileCommit, ForgeApi, GitRef, Milestone, NewPullRequest,
    NewRelease, Page, PageRequest, PullRequest, QuotaState, ReleaseAsset, RemoteRelease, Repo,
    RepoFile, RepoInfo, Tracked,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Scripted quota answer; the reset time is computed when the fake is asked.
#[derive(Debug, Clone, Copy)]
pub struct QuotaAnswer {
    pub remaining: u32,
    pub reset_in: TimeDelta,
}

#[derive(Debug, Default)]
pub struct ForgeState {
    pub default_branch: String,
    /// Branch name to tip SHA
    pub branches: HashMap<String, String>,
    /// (branch, path) to (sha, content)
    pub files: HashMap<(String, String), (String, Vec<u8>)>,
    pub releases: Vec<RemoteRelease>,
    pub milestones: Vec<Milestone>,
    pub commits: Vec<CompareCommit>,
    pub pulls: Vec<(Repo, NewPullRequest)>,
    pub uploads: Vec<(u64, String, Bytes)>,
    pub commits_pushed: Vec<FileCommit>,
    pub edited_milestones: Vec<Milestone>,
    pub quota: VecDeque<QuotaAnswer>,
    pub quota_error: bool,
    pub failures: HashMap<&'static str, ApiError>,
    pub next_id: u64,
}

/// Shared handle, cloneable so tests keep access after handing it over.
#[derive(Debug, Clone)]
pub struct FakeForge {
    state: Arc<Mutex<ForgeState>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl Default for FakeForge {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeForge {
    pub fn new() -> Self {
        let mut state = ForgeState {
            default_branch: "main".to_string(),
            next_id: 1000,
            ..ForgeState::default()
        };
        state
            .branches
            .insert("main".to_string(), "tip-of-main".to_string());
        Self {
            state: Arc::new(Mutex::new(state)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Runs `f` against the model.
    pub fn with<R>(&self, f: impl FnOnce(&mut ForgeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    /// Makes every call to `method` fail with `error`.
    pub fn fail(&self, method: &'static str, error: ApiError) {
        self.with(|state| state.failures.insert(method, error));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than quota checks, in order.
    pub fn api_calls(&self) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter(|call| *call != "rate_limit")
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|call| **call == method).count()
    }

    pub fn release(&self, release: RemoteRelease) {
        self.with(|state| state.releases.push(release));
    }

    pub fn releases(&self) -> Vec<RemoteRelease> {
        self.with(|state| state.releases.clone())
    }

    fn enter(&self, method: &'static str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(method);
        match self.with(|state| state.failures.get(method).cloned()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub fn not_found() -> ApiError {
    ApiError::status(404, "Not Found")
}

pub fn remote_release(id: u64, tag: &str, name: &str, body: &str, draft: bool) -> RemoteRelease {
    RemoteRelease {
        id,
        tag_name: tag.to_string(),
        name: Some(name.to_string()),
        body: Some(body.to_string()),
        draft,
        prerelease: false,
        target_commitish: None,
    }
}

pub fn milestone(number: u64, title: &str) -> Milestone {
    Milestone {
        number,
        title: title.to_string(),
        state: forgepub_release::MilestoneState::Open,
        description: None,
        due_on: None,
    }
}

/// Slices `items` like a page-numbered listing starting at page 1.
fn paged<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let page = request.page.unwrap_or(1).max(1) as usize;
    let size = usize::from(request.per_page);
    let start = (page - 1) * size;
    let chunk: Vec<T> = items.iter().skip(start).take(size).cloned().collect();
    if start + size < items.len() {
        Page::with_next(chunk, u32::try_from(page + 1).unwrap())
    } else {
        Page::with_next(chunk, 0)
    }
}

fn to_remote(id: u64, release: &NewRelease) -> RemoteRelease {
    RemoteRelease {
        id,
        tag_name: release.tag_name.clone(),
        name: Some(release.name.clone()),
        body: Some(release.body.clone()),
        draft: release.draft,
        prerelease: release.prerelease,
        target_commitish: release.target_commitish.clone(),
    }
}

#[async_trait]
impl ForgeApi for FakeForge {
    async fn rate_limit(&self) -> ApiResult<QuotaState> {
        self.enter("rate_limit")?;
        self.with(|state| {
            if state.quota_error {
                return Err(ApiError::status(500, "rate limit endpoint down"));
            }
            let answer = state.quota.pop_front().unwrap_or(QuotaAnswer {
                remaining: 5000,
                reset_in: TimeDelta::hours(1),
            });
            Ok(QuotaState {
                remaining: answer.remaining,
                reset_at: Utc::now() + answer.reset_in,
            })
        })
    }

    async fn generate_release_notes(
        &self,
        _repo: &Repo,
        previous_tag: &str,
        tag: &str,
    ) -> ApiResult<String> {
        self.enter("generate_release_notes")?;
        Ok(format!("## What's Changed\n\n{previous_tag}...{tag}"))
    }

    async fn compare_commits(
        &self,
        _repo: &Repo,
        _base: &str,
        _head: &str,
        page: PageRequest,
    ) -> ApiResult<Page<CompareCommit>> {
        self.enter("compare_commits")?;
        Ok(self.with(|state| paged(&state.commits, page)))
    }

    async fn repository(&self, _repo: &Repo) -> ApiResult<RepoInfo> {
        self.enter("repository")?;
        Ok(RepoInfo {
            default_branch: self.with(|state| state.default_branch.clone()),
        })
    }

    async fn list_milestones(&self, _repo: &Repo, page: PageRequest) -> ApiResult<Page<Milestone>> {
        self.enter("list_milestones")?;
        Ok(self.with(|state| paged(&state.milestones, page)))
    }

    async fn edit_milestone(&self, _repo: &Repo, milestone: &Milestone) -> ApiResult<Milestone> {
        self.enter("edit_milestone")?;
        self.with(|state| {
            state.edited_milestones.push(milestone.clone());
            for existing in &mut state.milestones {
                if existing.number == milestone.number {
                    *existing = milestone.clone();
                }
            }
        });
        Ok(milestone.clone())
    }

    async fn get_contents(&self, _repo: &Repo, path: &str, git_ref: &str) -> ApiResult<RepoFile> {
        self.enter("get_contents")?;
        self.with(|state| {
            state
                .files
                .get(&(git_ref.to_string(), path.to_string()))
                .map(|(sha, content)| RepoFile {
                    sha: sha.clone(),
                    content: content.clone(),
                })
                .ok_or_else(not_found)
        })
    }

    async fn get_branch(&self, _repo: &Repo, branch: &str) -> ApiResult<()> {
        self.enter("get_branch")?;
        self.with(|state| {
            if state.branches.contains_key(branch) {
                Ok(())
            } else {
                Err(not_found())
            }
        })
    }

    async fn get_ref(&self, _repo: &Repo, git_ref: &str) -> ApiResult<GitRef> {
        self.enter("get_ref")?;
        let branch = git_ref.trim_start_matches("heads/");
        self.with(|state| {
            state
                .branches
                .get(branch)
                .map(|sha| GitRef {
                    name: format!("refs/{git_ref}"),
                    sha: sha.clone(),
                })
                .ok_or_else(not_found)
        })
    }

    async fn create_ref(&self, _repo: &Repo, git_ref: &str, sha: &str) -> ApiResult<GitRef> {
        self.enter("create_ref")?;
        let branch = git_ref.trim_start_matches("refs/heads/").to_string();
        self.with(|state| state.branches.insert(branch, sha.to_string()));
        Ok(GitRef {
            name: git_ref.to_string(),
            sha: sha.to_string(),
        })
    }

    async fn put_file(&self, _repo: &Repo, commit: &FileCommit) -> ApiResult<()> {
        self.enter("put_file")?;
        self.with(|state| {
            let key = (commit.branch.clone(), commit.path.clone());
            let current = state.files.get(&key).map(|(sha, _)| sha.clone());
            if current != commit.prior_sha {
                return Err(ApiError::status(409, "sha does not match"));
            }
            let sha = format!("sha-{}", state.commits_pushed.len() + 1);
            state.files.insert(key, (sha, commit.content.clone()));
            state.commits_pushed.push(commit.clone());
            Ok(())
        })
    }

    async fn create_pull_request(
        &self,
        repo: &Repo,
        pull: &NewPullRequest,
    ) -> ApiResult<PullRequest> {
        self.enter("create_pull_request")?;
        self.with(|state| {
            state.pulls.push((repo.clone(), pull.clone()));
            Ok(PullRequest {
                number: state.pulls.len() as u64,
                html_url: Some(format!("https://github.com/{repo}/pull/{}", state.pulls.len())),
            })
        })
    }

    async fn release_by_tag(&self, _repo: &Repo, tag: &str) -> ApiResult<RemoteRelease> {
        self.enter("release_by_tag")?;
        self.with(|state| {
            state
                .releases
                .iter()
                .find(|release| release.tag_name == tag)
                .cloned()
                .ok_or_else(not_found)
        })
    }

    async fn create_release(
        &self,
        _repo: &Repo,
        release: &NewRelease,
    ) -> ApiResult<Tracked<RemoteRelease>> {
        self.enter("create_release")?;
        self.with(|state| {
            state.next_id += 1;
            let created = to_remote(state.next_id, release);
            state.releases.push(created.clone());
            Ok(Tracked::new(created, Some("REQ:create".to_string())))
        })
    }

    async fn edit_release(
        &self,
        _repo: &Repo,
        id: u64,
        release: &NewRelease,
    ) -> ApiResult<Tracked<RemoteRelease>> {
        self.enter("edit_release")?;
        self.with(|state| {
            let existing = state
                .releases
                .iter_mut()
                .find(|existing| existing.id == id)
                .ok_or_else(not_found)?;
            *existing = to_remote(id, release);
            Ok(Tracked::new(existing.clone(), Some("REQ:edit".to_string())))
        })
    }

    async fn list_releases(&self, _repo: &Repo, page: PageRequest) -> ApiResult<Page<RemoteRelease>> {
        self.enter("list_releases")?;
        Ok(self.with(|state| paged(&state.releases, page)))
    }

    async fn delete_release(&self, _repo: &Repo, id: u64) -> ApiResult<()> {
        self.enter("delete_release")?;
        self.with(|state| {
            let before = state.releases.len();
            state.releases.retain(|release| release.id != id);
            if state.releases.len() == before {
                Err(not_found())
            } else {
                Ok(())
            }
        })
    }

    async fn upload_release_asset(
        &self,
        _repo: &Repo,
        release_id: u64,
        name: &str,
        data: Bytes,
    ) -> ApiResult<Tracked<ReleaseAsset>> {
        self.enter("upload_release_asset")?;
        self.with(|state| {
            state.uploads.push((release_id, name.to_string(), data));
            Ok(Tracked::new(
                ReleaseAsset {
                    id: state.uploads.len() as u64,
                    name: name.to_string(),
                    browser_download_url: None,
                },
                Some("REQ:upload".to_string()),
            ))
        })
    }
}
