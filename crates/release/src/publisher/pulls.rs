//! Pull request opening.

use super::Publisher;
use crate::api::ForgeApi;
use crate::error::{Error, Result};
use crate::types::{NewPullRequest, Repo};
use tracing::{debug, info, warn};

/// Attribution appended to every pull request body.
pub const PULL_REQUEST_FOOTER: &str = "###### Automated with forgepub";

/// Location of the pull request template inside a repository.
const PULL_REQUEST_TEMPLATE_PATH: &str = ".github/PULL_REQUEST_TEMPLATE.md";

fn first_non_empty<'a>(primary: &'a str, fallback: &'a str) -> &'a str {
    if primary.is_empty() { fallback } else { primary }
}

/// `owner:name:branch` using `primary`'s fields, falling back to
/// `fallback`'s where `primary` leaves one empty.
pub(crate) fn ref_string(primary: &Repo, fallback: &Repo) -> String {
    [
        first_non_empty(&primary.owner, &fallback.owner),
        first_non_empty(&primary.name, &fallback.name),
        first_non_empty(
            primary.branch().unwrap_or_default(),
            fallback.branch().unwrap_or_default(),
        ),
    ]
    .join(":")
}

impl<A: ForgeApi> Publisher<A> {
    /// The pull request template of `repo`, if it has one.
    ///
    /// Lookup failures are not errors; they mean there is no template.
    pub async fn pull_request_template(&self, repo: &Repo) -> Option<String> {
        let git_ref = repo.branch().unwrap_or_default();
        let result = match self
            .guarded(self.api.get_contents(repo, PULL_REQUEST_TEMPLATE_PATH, git_ref))
            .await
        {
            Ok(result) => result,
            Err(err) => {
                debug!(error = %err, "no pull request template found...");
                return None;
            }
        };

        match result {
            Ok(file) => match String::from_utf8(file.content) {
                Ok(template) => Some(template),
                Err(err) => {
                    debug!(error = %err, "pull request template is not valid UTF-8");
                    None
                }
            },
            Err(err) => {
                debug!(error = %err, "no pull request template found...");
                None
            }
        }
    }

    /// Opens a pull request from `head` into `base`.
    ///
    /// When `base` has no branch the repository's default branch is used.
    /// A validation failure from the remote (for example, the pull request
    /// already exists) is logged and treated as success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when the default branch lookup or the
    /// creation fails for any other reason.
    pub async fn open_pull_request(
        &self,
        base: &Repo,
        head: &Repo,
        title: &str,
        draft: bool,
    ) -> Result<()> {
        let mut base = base.clone();
        let base_branch = match base.branch() {
            Some(branch) => branch.to_string(),
            None => self.default_branch(&base).await?,
        };
        base.branch = Some(base_branch.clone());

        let template = self.pull_request_template(&base).await.unwrap_or_default();
        if !template.is_empty() {
            info!("got a pr template");
        }

        let base_ref = ref_string(&base, head);
        let head_ref = ref_string(head, &base);
        let target = Repo::new(
            first_non_empty(&base.owner, &head.owner),
            first_non_empty(&base.name, &head.name),
        );

        info!(base = %base_ref, head = %head_ref, draft, "opening pull request");

        let pull = NewPullRequest {
            title: title.to_string(),
            head: head_ref.clone(),
            base: base_branch,
            body: [template.as_str(), PULL_REQUEST_FOOTER].join("\n"),
            draft,
        };

        match self.guarded(self.api.create_pull_request(&target, &pull)).await? {
            Ok(created) => {
                info!(
                    base = %base_ref,
                    head = %head_ref,
                    url = created.html_url.as_deref().unwrap_or_default(),
                    "pull request created"
                );
                Ok(())
            }
            Err(err) if err.is_unprocessable() => {
                warn!(
                    base = %base_ref,
                    head = %head_ref,
                    error = %err,
                    "pull request validation failed"
                );
                Ok(())
            }
            Err(err) => Err(Error::api(
                format!("could not create pull request {head_ref} -> {base_ref}"),
                err,
            )),
        }
    }
}
