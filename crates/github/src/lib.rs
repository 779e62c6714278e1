//! GitHub provider for forgepub.
//!
//! This crate implements [`forgepub_release::ForgeApi`] on top of the GitHub
//! REST API using `octocrab`, with a `reqwest` transport underneath:
//! - [`GitHubClientConfig`] holds the token, endpoints and transport settings
//! - [`GitHubClient`] is the immutable client built from it
//!
//! # Example
//!
//! ```rust,ignore
//! use forgepub_github::{GitHubClient, GitHubClientConfig};
//! use forgepub_release::{Publisher, Verbatim};
//!
//! let config = GitHubClientConfig::from_env()?.with_urls(&urls, &Verbatim)?;
//! let publisher = Publisher::new(GitHubClient::new(&config)?).with_urls(urls);
//! publisher.close_milestone(&repo, "v1.2.0").await?;
//! ```

#![warn(missing_docs)]

mod api;
pub mod client;
pub mod config;
mod transport;
mod wire;

pub use client::{GitHubClient, REQUEST_ID_HEADER};
pub use config::{DEFAULT_API_URL, DEFAULT_TIMEOUT, DEFAULT_UPLOAD_URL, GitHubClientConfig};
