//! Release publishing configuration types.
//!
//! Field names follow the camelCase convention used by the configuration
//! files these structs are deserialized from. Every struct falls back to
//! its `Default` for missing fields.

use crate::types::Repo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default base URL for release asset downloads.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://github.com";

/// How newly supplied release notes combine with notes already on the remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseNotesMode {
    /// Keep the existing notes; use the new ones only when none exist (default).
    #[default]
    KeepExisting,
    /// Existing notes followed by the new ones.
    Append,
    /// New notes followed by the existing ones.
    Prepend,
    /// Discard the existing notes.
    Replace,
}

impl fmt::Display for ReleaseNotesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepExisting => write!(f, "keep-existing"),
            Self::Append => write!(f, "append"),
            Self::Prepend => write!(f, "prepend"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Release configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Repository the release is published to.
    pub github: Repo,
    /// Template for the release title.
    #[serde(rename = "nameTemplate")]
    pub name_template: String,
    /// Whether to publish the release as a draft.
    pub draft: bool,
    /// Whether to delete an existing draft with the same title first.
    ///
    /// Only honored when `draft` is set.
    #[serde(rename = "replaceExistingDraft")]
    pub replace_existing_draft: bool,
    /// Discussion category for the release announcement, empty for none.
    #[serde(rename = "discussionCategoryName")]
    pub discussion_category_name: String,
    /// Template for the commitish the tag is created from, empty for the remote default.
    #[serde(rename = "targetCommitish")]
    pub target_commitish: String,
    /// How notes merge with an existing release.
    #[serde(rename = "releaseNotesMode")]
    pub release_notes_mode: ReleaseNotesMode,
}

/// Remote service URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeUrls {
    /// API base URL template, empty for the public service.
    pub api: String,
    /// Asset upload base URL template, used together with `api`.
    pub upload: String,
    /// Download base URL template for release assets.
    pub download: String,
    /// Whether to skip TLS certificate verification.
    #[serde(rename = "skipTlsVerify")]
    pub skip_tls_verify: bool,
}

impl Default for ForgeUrls {
    fn default() -> Self {
        Self {
            api: String::new(),
            upload: String::new(),
            download: DEFAULT_DOWNLOAD_URL.to_string(),
            skip_tls_verify: false,
        }
    }
}

impl ForgeUrls {
    /// Whether a custom API endpoint is configured.
    #[must_use]
    pub fn has_api_override(&self) -> bool {
        !self.api.trim().is_empty()
    }
}

/// Per-run release inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseContext {
    /// Release configuration
    pub config: ReleaseConfig,
    /// Tag being released
    pub tag: String,
    /// Whether the release is a prerelease
    pub prerelease: bool,
}

impl ReleaseContext {
    /// Creates a release context for the given tag.
    #[must_use]
    pub fn new(config: ReleaseConfig, tag: impl Into<String>) -> Self {
        Self {
            config,
            tag: tag.into(),
            prerelease: false,
        }
    }

    /// Sets the prerelease flag.
    #[must_use]
    pub const fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    /// The repository the release is published to.
    #[must_use]
    pub const fn repo(&self) -> &Repo {
        &self.config.github
    }
}
