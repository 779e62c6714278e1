//! Rate-limit aware, idempotent request orchestration.
//!
//! [`Publisher`] drives a [`ForgeApi`] implementation through the release
//! publishing workflows. Every remote call goes through the quota guard
//! first and races the publisher's cancellation token.
//!
//! # Example
//!
//! ```rust,ignore
//! use forgepub_release::{Publisher, ReleaseConfig, ReleaseContext, Repo};
//!
//! let publisher = Publisher::new(api);
//! let config = ReleaseConfig {
//!     github: Repo::new("forgepub", "forgepub"),
//!     name_template: "v1.2.0".to_string(),
//!     ..Default::default()
//! };
//! let ctx = ReleaseContext::new(config, "v1.2.0");
//! let release_id = publisher.create_release(&ctx, "## Changelog").await?;
//! ```

mod assets;
mod changelog;
mod files;
mod milestones;
mod pulls;
mod releases;

pub use pulls::PULL_REQUEST_FOOTER;

use crate::api::ForgeApi;
use crate::config::ForgeUrls;
use crate::error::{ApiResult, Error, Result};
use crate::quota::{QuotaGuard, QuotaPolicy};
use crate::template::{TemplateRenderer, Verbatim};
use crate::types::Repo;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Publishes releases, files, assets and pull requests to a remote service.
///
/// A publisher is immutable once built and holds no state between calls,
/// so one instance can serve concurrent tasks.
pub struct Publisher<A> {
    api: A,
    quota: QuotaGuard,
    cancel: CancellationToken,
    renderer: Arc<dyn TemplateRenderer>,
    urls: ForgeUrls,
}

impl<A: ForgeApi> Publisher<A> {
    /// Creates a publisher with the default quota policy and no templating.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            quota: QuotaGuard::default(),
            cancel: CancellationToken::new(),
            renderer: Arc::new(Verbatim),
            urls: ForgeUrls::default(),
        }
    }

    /// Sets the quota policy.
    #[must_use]
    pub fn with_quota_policy(mut self, policy: QuotaPolicy) -> Self {
        self.quota = QuotaGuard::new(policy);
        self
    }

    /// Sets the token that aborts in-flight calls and quota waits.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets the renderer used for release titles, commitishes and URLs.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Sets the service URLs.
    #[must_use]
    pub fn with_urls(mut self, urls: ForgeUrls) -> Self {
        self.urls = urls;
        self
    }

    /// The underlying API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Issues one remote call after the quota guard lets it through.
    ///
    /// The outer result carries cancellation; the inner one is the remote
    /// outcome, left unclassified for the caller.
    async fn guarded<T, F>(&self, call: F) -> Result<ApiResult<T>>
    where
        F: Future<Output = ApiResult<T>>,
    {
        self.quota.wait(&self.api, &self.cancel).await?;
        tokio::select! {
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = call => Ok(result),
        }
    }

    /// Name of the repository's default branch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] naming the repository when the lookup fails.
    pub async fn default_branch(&self, repo: &Repo) -> Result<String> {
        match self.guarded(self.api.repository(repo)).await? {
            Ok(info) => Ok(info.default_branch),
            Err(err) => {
                warn!(
                    repo = %repo,
                    status = ?err.status,
                    error = %err,
                    "error checking for default branch"
                );
                Err(Error::api(
                    format!("could not get default branch of {repo}"),
                    err,
                ))
            }
        }
    }

    /// Download URL template for release assets.
    ///
    /// The result still contains the `{{ .Tag }}` and `{{ .ArtifactName }}`
    /// placeholders for the caller's templating engine.
    ///
    /// # Errors
    ///
    /// Returns an error when the download URL cannot be rendered.
    pub fn release_url_template(&self, repo: &Repo) -> Result<String> {
        let download = self.renderer.render(&self.urls.download)?;
        Ok(format!(
            "{}/{}/{}/releases/download/{{{{ .Tag }}}}/{{{{ .ArtifactName }}}}",
            download.trim_end_matches('/'),
            repo.owner,
            repo.name
        ))
    }
}
