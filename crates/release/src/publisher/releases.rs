//! Release upsert: optional draft cleanup, lookup by tag, then create or
//! merge and update.

use super::Publisher;
use crate::api::ForgeApi;
use crate::config::ReleaseContext;
use crate::error::{Error, Result};
use crate::notes::{merge_release_notes, truncate_release_body};
use crate::paginate::{Page, PageRequest, RELEASES_PAGE_SIZE, paginate};
use crate::types::{NewRelease, RemoteRelease, Repo};
use futures::TryStreamExt;
use tracing::{debug, info};

impl<A: ForgeApi> Publisher<A> {
    /// Creates the release for `ctx.tag`, or updates it if it already exists.
    ///
    /// On update the existing notes are combined with `body` according to
    /// the configured [`ReleaseNotesMode`](crate::ReleaseNotesMode). Every
    /// submitted body is shortened to fit the remote's limit.
    ///
    /// Returns the release identifier as a string, suitable for
    /// [`Publisher::upload_asset`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] when the title or commitish cannot be
    /// rendered and [`Error::Api`] when a remote call fails. A failed lookup
    /// other than "not found" is returned as is rather than attempting a
    /// create that could duplicate the release.
    pub async fn create_release(&self, ctx: &ReleaseContext, body: &str) -> Result<String> {
        let config = &ctx.config;
        let title = self.renderer.render(&config.name_template)?;

        if config.draft && config.replace_existing_draft {
            self.delete_existing_draft(ctx.repo(), &title).await?;
        }

        let target_commitish = if config.target_commitish.is_empty() {
            None
        } else {
            Some(self.renderer.render(&config.target_commitish)?).filter(|t| !t.is_empty())
        };

        let data = NewRelease {
            tag_name: ctx.tag.clone(),
            name: title,
            body: truncate_release_body(body).into_owned(),
            draft: config.draft,
            prerelease: ctx.prerelease,
            target_commitish,
            discussion_category_name: Some(config.discussion_category_name.clone())
                .filter(|category| !category.is_empty()),
        };

        let release = self.create_or_update_release(ctx, data).await?;
        Ok(release.id.to_string())
    }

    async fn create_or_update_release(
        &self,
        ctx: &ReleaseContext,
        mut data: NewRelease,
    ) -> Result<RemoteRelease> {
        let repo = ctx.repo();

        let existing = match self
            .guarded(self.api.release_by_tag(repo, &data.tag_name))
            .await?
        {
            Ok(existing) => existing,
            Err(err) if err.is_not_found() => {
                debug!(repo = %repo, tag = %data.tag_name, "no release for tag, creating one");
                let created = self
                    .guarded(self.api.create_release(repo, &data))
                    .await?
                    .map_err(|err| {
                        Error::api(format!("could not release {repo}@{}", data.tag_name), err)
                    })?;
                info!(
                    name = %data.name,
                    release_id = created.value.id,
                    request_id = created.request_id.as_deref().unwrap_or_default(),
                    "release created"
                );
                return Ok(created.value);
            }
            Err(err) => {
                return Err(Error::api(
                    format!("could not look up release {repo}@{}", data.tag_name),
                    err,
                ));
            }
        };

        let merged = merge_release_notes(
            existing.body.as_deref().unwrap_or_default(),
            &data.body,
            ctx.config.release_notes_mode,
        );
        data.body = truncate_release_body(&merged).into_owned();

        let updated = self
            .guarded(self.api.edit_release(repo, existing.id, &data))
            .await?
            .map_err(|err| {
                Error::api(
                    format!("could not update release {repo}@{} ({})", data.tag_name, existing.id),
                    err,
                )
            })?;
        info!(
            name = %data.name,
            release_id = updated.value.id,
            request_id = updated.request_id.as_deref().unwrap_or_default(),
            mode = %ctx.config.release_notes_mode,
            "release updated"
        );
        Ok(updated.value)
    }

    /// Deletes the first draft release titled `name`, if any.
    async fn delete_existing_draft(&self, repo: &Repo, name: &str) -> Result<()> {
        let draft = {
            let mut releases = paginate(RELEASES_PAGE_SIZE, move |page| {
                self.release_page(repo, page)
            });
            let mut found = None;
            while let Some(release) = releases.try_next().await? {
                if release.draft && release.name.as_deref() == Some(name) {
                    found = Some(release);
                    break;
                }
            }
            found
        };

        let Some(draft) = draft else {
            return Ok(());
        };

        match self.guarded(self.api.delete_release(repo, draft.id)).await? {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                debug!(repo = %repo, release_id = draft.id, "draft release already gone");
            }
            Err(err) => {
                return Err(Error::api(
                    format!("could not delete previous draft release {name:?} of {repo}"),
                    err,
                ));
            }
        }

        info!(
            commit = draft.target_commitish.as_deref().unwrap_or_default(),
            tag = %draft.tag_name,
            name,
            "deleted previous draft release"
        );
        Ok(())
    }

    async fn release_page(&self, repo: &Repo, page: PageRequest) -> Result<Page<RemoteRelease>> {
        self.guarded(self.api.list_releases(repo, page))
            .await?
            .map_err(|err| Error::api(format!("could not list releases of {repo}"), err))
    }
}
