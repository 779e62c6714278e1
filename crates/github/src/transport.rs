//! reqwest-backed transport underneath [`octocrab`].
//!
//! octocrab issues requests with paths relative to the API root. The
//! transport resolves them against the configured base URL and sends them
//! through a `reqwest` client, which owns the settings octocrab's own
//! connector has no knob for: certificate verification, proxies from the
//! environment and the request timeout.

use crate::config::GitHubClientConfig;
use bytes::Bytes;
use forgepub_release::{Error, Result};
use futures::future::BoxFuture;
use http::StatusCode;
use http_body::Body;
use http_body_util::{BodyExt, Full};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Url};
use secrecy::ExposeSecret;
use std::task::{Context, Poll};
use tower::Service;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// Builds the HTTP client shared by API calls and asset uploads.
pub(crate) fn http_client(config: &GitHubClientConfig) -> Result<Client> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.expose_secret()))
        .map_err(|_| {
            Error::config(
                "GitHub token contains invalid characters",
                "Check the token for stray whitespace or newlines",
            )
        })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
    headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

    let mut builder = Client::builder()
        .default_headers(headers)
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.skip_tls_verify);
    if !config.proxy_from_env {
        builder = builder.no_proxy();
    }
    builder.build().map_err(|err| {
        Error::config(
            format!("could not build HTTP client: {err}"),
            "Check the TLS and proxy settings",
        )
    })
}

/// Service handed to octocrab in place of its default connector.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: Client,
    base: Url,
}

impl Transport {
    pub(crate) const fn new(http: Client, base: Url) -> Self {
        Self { http, base }
    }
}

impl<B> Service<http::Request<B>> for Transport
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send,
{
    type Response = http::Response<Full<Bytes>>;
    type Error = BoxError;
    type Future = BoxFuture<'static, std::result::Result<Self::Response, BoxError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), BoxError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        let http = self.http.clone();
        let base = self.base.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(err) => return Err(err.into()),
            };

            let mut headers = parts.headers;
            // The configured user agent wins over octocrab's.
            headers.remove(USER_AGENT);

            let mut outgoing = reqwest::Request::new(parts.method, resolve(&base, &parts.uri)?);
            *outgoing.headers_mut() = headers;
            if !body.is_empty() {
                *outgoing.body_mut() = Some(body.into());
            }

            let response = http.execute(outgoing).await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;

            let mut incoming = http::Response::new(Full::new(with_error_message(status, body)));
            *incoming.status_mut() = status;
            *incoming.headers_mut() = headers;
            Ok(incoming)
        })
    }
}

/// Absolute URIs pass through; relative ones are joined onto `base`.
fn resolve(base: &Url, uri: &http::Uri) -> std::result::Result<Url, BoxError> {
    if uri.authority().is_some() {
        return Url::parse(&uri.to_string()).map_err(BoxError::from);
    }
    let path = uri.path_and_query().map_or("", |p| p.as_str());
    base.join(path.trim_start_matches('/'))
        .map_err(BoxError::from)
}

/// The `message` field of a GitHub error body.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Replaces an error body without a `message` by one carrying the status
/// reason, so proxies answering with HTML still map to a status error.
fn with_error_message(status: StatusCode, body: Bytes) -> Bytes {
    if status.is_success() || error_message(&body).is_some() {
        return body;
    }
    let message = status.canonical_reason().unwrap_or("unexpected response");
    Bytes::from(serde_json::json!({ "message": message }).to_string())
}
