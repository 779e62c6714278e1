//! Rate-limit aware, idempotent release publishing for forgepub.
//!
//! This crate is the provider-agnostic core of forgepub's publishing step.
//! It synchronizes a local build's artifacts, changelog and metadata with a
//! remote repository's releases, pull requests, milestones and files, while
//! respecting the remote's API quota.
//!
//! # Features
//!
//! - **Quota Guard**: every remote call waits while the API quota is nearly exhausted
//! - **Lazy Pagination**: list endpoints stream items page by page and stop early on a match
//! - **Release Upsert**: look up by tag, then create or merge notes and update
//! - **File Publishing**: branch creation from the default tip and hash-conditioned commits
//! - **Asset Upload**: permanent and retriable failures are reported apart
//!
//! # Architecture
//!
//! - [`api`] - The [`ForgeApi`] trait implemented by provider crates
//! - [`publisher`] - The [`Publisher`] workflows built on top of it
//! - [`quota`] - Pre-call throttling
//! - [`paginate`] - Cursor pagination as a lazy stream
//! - [`notes`] - Release notes merging and truncation
//! - [`config`] - Release configuration types
//!
//! # Example
//!
//! ```rust,ignore
//! use forgepub_release::{Asset, Publisher, ReleaseConfig, ReleaseContext, Repo};
//!
//! let publisher = Publisher::new(api);
//! let ctx = ReleaseContext::new(config, "v1.2.0");
//! let release_id = publisher.create_release(&ctx, &notes).await?;
//!
//! let file = tokio::fs::File::open("dist/app.tar.gz").await?;
//! publisher
//!     .upload_asset(ctx.repo(), &release_id, &Asset::new("app.tar.gz"), file)
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod notes;
pub mod paginate;
pub mod publisher;
pub mod quota;
pub mod template;
pub mod types;

// Re-export main types
pub use api::ForgeApi;
pub use config::{DEFAULT_DOWNLOAD_URL, ForgeUrls, ReleaseConfig, ReleaseContext, ReleaseNotesMode};
pub use error::{ApiError, ApiResult, Error, Result, STATUS_NOT_FOUND, STATUS_UNPROCESSABLE};
pub use notes::{MAX_RELEASE_BODY_CHARS, merge_release_notes, truncate_release_body};
pub use paginate::{DEFAULT_PAGE_SIZE, Page, PageRequest, RELEASES_PAGE_SIZE, paginate};
pub use publisher::{PULL_REQUEST_FOOTER, Publisher};
pub use quota::{QuotaGuard, QuotaPolicy, QuotaState};
pub use template::{TemplateRenderer, Verbatim};
pub use types::{
    Asset, CommitAuthor, CompareCommit, FileCommit, GitRef, Milestone, MilestoneState,
    NewPullRequest, NewRelease, PullRequest, ReleaseAsset, RemoteRelease, Repo, RepoFile,
    RepoInfo, Tracked,
};
