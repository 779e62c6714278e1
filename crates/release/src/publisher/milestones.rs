//! Milestone lookup and closing.

use super::Publisher;
use crate::api::ForgeApi;
use crate::error::{Error, Result};
use crate::paginate::{DEFAULT_PAGE_SIZE, Page, PageRequest, paginate};
use crate::types::{Milestone, MilestoneState, Repo};
use futures::TryStreamExt;
use tracing::info;

impl<A: ForgeApi> Publisher<A> {
    /// The first open milestone titled exactly `title`.
    ///
    /// The remote has no lookup by title, so milestones are scanned page by
    /// page until a match is found or the listing is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when a page fails to load.
    pub async fn milestone_by_title(&self, repo: &Repo, title: &str) -> Result<Option<Milestone>> {
        let mut milestones = paginate(DEFAULT_PAGE_SIZE, move |page| {
            self.milestone_page(repo, page)
        });

        while let Some(milestone) = milestones.try_next().await? {
            if milestone.title == title {
                return Ok(Some(milestone));
            }
        }
        Ok(None)
    }

    /// Closes the milestone titled `title`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMilestoneFound`] when no such milestone exists and
    /// [`Error::Api`] when a remote call fails.
    pub async fn close_milestone(&self, repo: &Repo, title: &str) -> Result<()> {
        let Some(mut milestone) = self.milestone_by_title(repo, title).await? else {
            return Err(Error::NoMilestoneFound {
                title: title.to_string(),
            });
        };

        milestone.state = MilestoneState::Closed;
        self.guarded(self.api.edit_milestone(repo, &milestone))
            .await?
            .map_err(|err| Error::api(format!("could not close milestone {title:?} of {repo}"), err))?;

        info!(repo = %repo, milestone = %title, number = milestone.number, "milestone closed");
        Ok(())
    }

    async fn milestone_page(&self, repo: &Repo, page: PageRequest) -> Result<Page<Milestone>> {
        self.guarded(self.api.list_milestones(repo, page))
            .await?
            .map_err(|err| Error::api(format!("could not list milestones of {repo}"), err))
    }
}
