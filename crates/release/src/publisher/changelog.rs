//! Release notes and changelog retrieval.

use super::Publisher;
use crate::api::ForgeApi;
use crate::error::{Error, Result};
use crate::paginate::{DEFAULT_PAGE_SIZE, Page, PageRequest, paginate};
use crate::types::{CompareCommit, Repo};
use futures::TryStreamExt;
use tracing::debug;

impl<A: ForgeApi> Publisher<A> {
    /// Release notes generated by the remote for `previous_tag..current_tag`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when the remote cannot generate the notes.
    pub async fn generate_release_notes(
        &self,
        repo: &Repo,
        previous_tag: &str,
        current_tag: &str,
    ) -> Result<String> {
        self.guarded(
            self.api
                .generate_release_notes(repo, previous_tag, current_tag),
        )
        .await?
        .map_err(|err| {
            Error::api(
                format!("could not generate release notes for {repo} {previous_tag}..{current_tag}"),
                err,
            )
        })
    }

    /// One formatted line per commit in `previous_tag..current_tag`, in
    /// the order the remote lists them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when any page fails to load.
    pub async fn changelog(
        &self,
        repo: &Repo,
        previous_tag: &str,
        current_tag: &str,
    ) -> Result<Vec<String>> {
        let lines: Vec<String> = paginate(DEFAULT_PAGE_SIZE, move |page| {
            self.compare_page(repo, previous_tag, current_tag, page)
        })
        .map_ok(|commit| commit.changelog_line())
        .try_collect()
        .await?;

        debug!(repo = %repo, commits = lines.len(), "collected changelog");
        Ok(lines)
    }

    async fn compare_page(
        &self,
        repo: &Repo,
        base: &str,
        head: &str,
        page: PageRequest,
    ) -> Result<Page<CompareCommit>> {
        self.guarded(self.api.compare_commits(repo, base, head, page))
            .await?
            .map_err(|err| Error::api(format!("could not compare {repo} {base}...{head}"), err))
    }
}
