//! Single-shot release asset upload.

use super::Publisher;
use crate::api::ForgeApi;
use crate::error::{Error, Result};
use crate::types::{Asset, Repo};
use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

impl<A: ForgeApi> Publisher<A> {
    /// Uploads `file` as `asset` to the release identified by `release_id`.
    ///
    /// No retry happens here. Failures other than a validation rejection
    /// come back as [`Error::Retriable`] so the caller's retry policy can
    /// attempt the whole upload again.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidReleaseId`] when `release_id` is not numeric
    /// - [`Error::Artifact`] when `file` cannot be read
    /// - [`Error::Api`] when the remote rejects the asset as unprocessable
    /// - [`Error::Retriable`] for any other remote failure
    pub async fn upload_asset(
        &self,
        repo: &Repo,
        release_id: &str,
        asset: &Asset,
        mut file: tokio::fs::File,
    ) -> Result<()> {
        let id: u64 = release_id.parse().map_err(|_| Error::InvalidReleaseId {
            id: release_id.to_string(),
        })?;

        let mut data = Vec::new();
        file.read_to_end(&mut data).await.map_err(|err| {
            Error::artifact(format!("could not read {}: {err}", asset.name), asset.path.clone())
        })?;

        let result = self
            .guarded(
                self.api
                    .upload_release_asset(repo, id, &asset.name, Bytes::from(data)),
            )
            .await?;

        match result {
            Ok(uploaded) => {
                info!(
                    name = %asset.name,
                    release_id = id,
                    request_id = uploaded.request_id.as_deref().unwrap_or_default(),
                    "uploaded asset"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    name = %asset.name,
                    release_id = id,
                    request_id = err.request_id.as_deref().unwrap_or_default(),
                    error = %err,
                    "upload failed"
                );
                if err.is_unprocessable() {
                    Err(Error::api(
                        format!("could not upload {} to release {id}", asset.name),
                        err,
                    ))
                } else {
                    Err(Error::Retriable { source: err })
                }
            }
        }
    }
}
