//! GitHub client built on [`octocrab`].

use crate::config::GitHubClientConfig;
use crate::transport::{Transport, error_message, http_client};
use bytes::Bytes;
use forgepub_release::{ApiError, ApiResult, Error, ReleaseAsset, Repo, Result, Tracked};
use http_body_util::combinators::BoxBody;
use octocrab::{AuthState, Octocrab, OctocrabBuilder};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

/// Header carrying GitHub's request-correlation id.
pub const REQUEST_ID_HEADER: &str = "x-github-request-id";

/// Response type of octocrab's low-level request methods.
pub(crate) type RawResponse = http::Response<BoxBody<Bytes, octocrab::Error>>;

/// Immutable GitHub REST client.
///
/// Implements [`forgepub_release::ForgeApi`]; wrap it in a
/// [`forgepub_release::Publisher`] to run the publishing workflows.
#[derive(Clone)]
pub struct GitHubClient {
    crab: Octocrab,
    http: Client,
    api_url: Url,
    upload_url: Url,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url.as_str())
            .field("upload_url", &self.upload_url.as_str())
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Builds a client from `config`.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a URL or the token is unusable or the
    /// HTTP client cannot be built.
    pub fn new(config: &GitHubClientConfig) -> Result<Self> {
        let api_url = parse_base(&config.api_url, "api")?;
        let upload_url = parse_base(&config.upload_url, "upload")?;
        let http = http_client(config)?;

        let crab = OctocrabBuilder::new_empty()
            .with_service(Transport::new(http.clone(), api_url.clone()))
            .with_auth(AuthState::None)
            .build()
            .map_err(|err| {
                Error::config(
                    format!("could not build GitHub client: {err}"),
                    "Check the GitHub API settings",
                )
            })?;

        debug!(api = %api_url, upload = %upload_url, "created GitHub client");
        Ok(Self {
            crab,
            http,
            api_url,
            upload_url,
        })
    }

    /// Convenience constructor reading the token from the environment.
    ///
    /// # Errors
    ///
    /// See [`GitHubClientConfig::from_env`] and [`GitHubClient::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(&GitHubClientConfig::from_env()?)
    }

    /// The API base URL.
    #[must_use]
    pub const fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// The upload base URL.
    #[must_use]
    pub const fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    /// The underlying octocrab instance.
    #[must_use]
    pub const fn octocrab(&self) -> &Octocrab {
        &self.crab
    }

    /// Finishes a low-level octocrab call, keeping GitHub's request id.
    pub(crate) async fn tracked<T: DeserializeOwned>(
        &self,
        response: octocrab::Result<RawResponse>,
    ) -> ApiResult<Tracked<T>> {
        let response = response.map_err(api_error)?;
        let request_id = request_id(response.headers());
        let response = octocrab::map_github_error(response)
            .await
            .map_err(|err| api_error(err).with_request_id(request_id.clone()))?;
        let body = self.crab.body_to_string(response).await.map_err(api_error)?;
        let value = serde_json::from_str(&body).map_err(|err| {
            ApiError::transport(format!("could not decode GitHub response: {err}"))
                .with_request_id(request_id.clone())
        })?;
        Ok(Tracked::new(value, request_id))
    }

    /// Uploads `data` as a release asset on the upload host.
    ///
    /// octocrab only sends JSON bodies, so the raw payload goes out on the
    /// shared HTTP client.
    pub(crate) async fn upload(
        &self,
        repo: &Repo,
        release_id: u64,
        name: &str,
        data: Bytes,
    ) -> ApiResult<Tracked<ReleaseAsset>> {
        let mut url = self
            .upload_url
            .join(&format!(
                "repos/{}/{}/releases/{release_id}/assets",
                repo.owner, repo.name
            ))
            .map_err(|err| ApiError::transport(format!("invalid upload URL: {err}")))?;
        url.query_pairs_mut().append_pair("name", name);
        debug!(name, release_id, size = data.len(), "uploading release asset");

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(|err| ApiError::transport(err.to_string()))?;

        let status = response.status();
        let request_id = request_id(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::transport(err.to_string()).with_request_id(request_id.clone()))?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            });
            return Err(ApiError::status(status.as_u16(), message).with_request_id(request_id));
        }

        let asset = serde_json::from_slice(&body).map_err(|err| {
            ApiError::transport(format!("could not decode uploaded asset: {err}"))
                .with_request_id(request_id.clone())
        })?;
        Ok(Tracked::new(asset, request_id))
    }
}

/// Maps an octocrab failure onto the provider-agnostic error.
pub(crate) fn api_error(err: octocrab::Error) -> ApiError {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            ApiError::status(source.status_code.as_u16(), source.message)
        }
        other => ApiError::transport(other.to_string()),
    }
}

/// Request id reported by GitHub, if any.
pub(crate) fn request_id(headers: &http::HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn parse_base(raw: &str, which: &str) -> Result<Url> {
    Url::parse(raw).map_err(|err| {
        Error::config(
            format!("invalid GitHub {which} URL {raw:?}: {err}"),
            "Use an absolute URL such as https://api.github.com/",
        )
    })
}
