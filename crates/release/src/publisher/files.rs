//! Branch-ensure and content-hash-conditioned file publishing.

use super::Publisher;
use crate::api::ForgeApi;
use crate::error::{Error, Result};
use crate::types::{CommitAuthor, FileCommit, Repo};
use tracing::{debug, info};

impl<A: ForgeApi> Publisher<A> {
    /// Creates or updates `path` in a single commit.
    ///
    /// The commit lands on the repository's configured branch, or on the
    /// default branch when none is set. A configured branch that does not
    /// exist yet is created from the default branch's current tip first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when any remote call fails. A missing file is
    /// not an error; it is created.
    pub async fn create_file(
        &self,
        committer: &CommitAuthor,
        repo: &Repo,
        content: &[u8],
        path: &str,
        message: &str,
    ) -> Result<()> {
        let default_branch = self.default_branch(repo).await?;
        let branch = repo.branch().unwrap_or(&default_branch).to_string();

        if branch != default_branch {
            self.ensure_branch(repo, &branch, &default_branch).await?;
        }

        let prior_sha = match self
            .guarded(self.api.get_contents(repo, path, &branch))
            .await?
        {
            Ok(file) => Some(file.sha),
            Err(err) if err.is_not_found() => {
                debug!(repo = %repo, path, branch = %branch, "file does not exist yet");
                None
            }
            Err(err) => {
                return Err(Error::api(
                    format!("could not get {path} from {repo}@{branch}"),
                    err,
                ));
            }
        };

        let updating = prior_sha.is_some();
        let commit = FileCommit {
            path: path.to_string(),
            content: content.to_vec(),
            message: message.to_string(),
            branch: branch.clone(),
            committer: committer.clone(),
            prior_sha,
        };

        self.guarded(self.api.put_file(repo, &commit))
            .await?
            .map_err(|err| Error::api(format!("could not update {path} on {repo}@{branch}"), err))?;

        info!(repo = %repo, path, branch = %branch, updated = updating, "pushed file");
        Ok(())
    }

    /// Makes sure `branch` exists, creating it from `default_branch`.
    async fn ensure_branch(&self, repo: &Repo, branch: &str, default_branch: &str) -> Result<()> {
        match self.guarded(self.api.get_branch(repo, branch)).await? {
            Ok(()) => return Ok(()),
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                return Err(Error::api(
                    format!("could not get branch {branch} of {repo}"),
                    err,
                ));
            }
        }

        let tip = self
            .guarded(self.api.get_ref(repo, &format!("heads/{default_branch}")))
            .await?
            .map_err(|err| {
                Error::api(
                    format!("could not get ref heads/{default_branch} of {repo}"),
                    err,
                )
            })?;

        self.guarded(
            self.api
                .create_ref(repo, &format!("refs/heads/{branch}"), &tip.sha),
        )
        .await?
        .map_err(|err| Error::api(format!("could not create branch {branch} on {repo}"), err))?;

        info!(repo = %repo, branch, from = default_branch, sha = %tip.sha, "created branch");
        Ok(())
    }
}
