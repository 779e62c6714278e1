//! GitHub client configuration.
//!
//! All transport settings are fixed here, before the client is built, so a
//! [`crate::GitHubClient`] never changes after construction.

use forgepub_release::{Error, ForgeUrls, Result, TemplateRenderer};
use reqwest::Url;
use secrecy::SecretString;
use std::time::Duration;

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com/";

/// Base URL for release asset uploads on the public service.
pub const DEFAULT_UPLOAD_URL: &str = "https://uploads.github.com/";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variables checked for a token, in order.
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Settings for [`crate::GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    /// Token sent as a bearer credential
    pub token: SecretString,
    /// API base URL, always ending in `/`
    pub api_url: String,
    /// Upload base URL, always ending in `/`
    pub upload_url: String,
    /// Accept invalid TLS certificates
    pub skip_tls_verify: bool,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY`
    pub proxy_from_env: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl GitHubClientConfig {
    /// Creates a configuration for the public service.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            api_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            skip_tls_verify: false,
            proxy_from_env: true,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("forgepub/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Creates a configuration from `GITHUB_TOKEN`, falling back to `GH_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when neither variable holds a token.
    pub fn from_env() -> Result<Self> {
        TOKEN_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|token| !token.trim().is_empty())
            .map(Self::new)
            .ok_or_else(|| {
                Error::config(
                    "no GitHub token found",
                    "Set GITHUB_TOKEN or GH_TOKEN to a token with repo scope",
                )
            })
    }

    /// Applies configured service URLs.
    ///
    /// When `urls.api` is set, both it and `urls.upload` are rendered and
    /// replace the public endpoints. The TLS setting is always taken over.
    ///
    /// # Errors
    ///
    /// Returns an error when a URL cannot be rendered or is not absolute.
    pub fn with_urls(mut self, urls: &ForgeUrls, renderer: &dyn TemplateRenderer) -> Result<Self> {
        self.skip_tls_verify = urls.skip_tls_verify;
        if !urls.has_api_override() {
            return Ok(self);
        }

        self.api_url = base_url(&renderer.render(&urls.api)?, "api")?;
        self.upload_url = base_url(&renderer.render(&urls.upload)?, "upload")?;
        Ok(self)
    }

    /// Sets the TLS verification toggle.
    #[must_use]
    pub const fn with_skip_tls_verify(mut self, skip: bool) -> Self {
        self.skip_tls_verify = skip;
        self
    }

    /// Sets whether proxies are read from the environment.
    #[must_use]
    pub const fn with_proxy_from_env(mut self, enabled: bool) -> Self {
        self.proxy_from_env = enabled;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Validates `raw` as an absolute URL and normalizes it to end in `/`.
pub(crate) fn base_url(raw: &str, which: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| {
        Error::config(
            format!("invalid GitHub {which} URL {trimmed:?}: {err}"),
            "Use an absolute URL such as https://github.example.com/api/v3/",
        )
    })?;
    if url.cannot_be_a_base() {
        return Err(Error::config(
            format!("GitHub {which} URL {trimmed:?} cannot be used as a base"),
            "Use an http or https URL",
        ));
    }

    let mut normalized = url.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}
