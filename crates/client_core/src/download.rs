//! Client-side download of rendered blobs through short-lived object URLs.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DownloadError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    /// Wraps a URL minted by a sink implementation.
    pub fn from_raw(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minting and revoking URLs is synchronous so `ObjectUrlGuard` can revoke from `Drop`.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    fn create_object_url(&self, blob: Vec<u8>) -> ObjectUrl;
    /// Starts the save flow for the blob behind `url`.
    async fn activate(&self, url: &ObjectUrl, filename: &str) -> Result<(), DownloadError>;
    fn revoke_object_url(&self, url: &ObjectUrl);
}

/// Object URL that is revoked when dropped, whether or not activation succeeded.
pub struct ObjectUrlGuard<'a> {
    sink: &'a dyn DownloadSink,
    url: ObjectUrl,
}

impl<'a> ObjectUrlGuard<'a> {
    pub fn create(sink: &'a dyn DownloadSink, blob: Vec<u8>) -> Self {
        let url = sink.create_object_url(blob);
        Self { sink, url }
    }

    pub fn url(&self) -> &ObjectUrl {
        &self.url
    }
}

impl Drop for ObjectUrlGuard<'_> {
    fn drop(&mut self) {
        self.sink.revoke_object_url(&self.url);
    }
}

/// Hands the blob to `sink` under `filename`, releasing the object URL afterwards.
pub async fn download_blob(
    sink: &dyn DownloadSink,
    blob: Vec<u8>,
    filename: &str,
) -> Result<(), DownloadError> {
    let url = ObjectUrlGuard::create(sink, blob);
    sink.activate(url.url(), filename).await?;
    Ok(())
}

/// Saves activated downloads into a directory on disk.
pub struct DirectoryDownloads {
    dir: PathBuf,
    blobs: Mutex<HashMap<ObjectUrl, Vec<u8>>>,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Object URLs created and not yet revoked.
    pub fn live_urls(&self) -> usize {
        self.blobs().len()
    }

    fn blobs(&self) -> MutexGuard<'_, HashMap<ObjectUrl, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DownloadSink for DirectoryDownloads {
    fn create_object_url(&self, blob: Vec<u8>) -> ObjectUrl {
        let url = ObjectUrl(format!("blob:pictopoem/{}", Uuid::new_v4()));
        self.blobs().insert(url.clone(), blob);
        debug!(%url, "created object url");
        url
    }

    async fn activate(&self, url: &ObjectUrl, filename: &str) -> Result<(), DownloadError> {
        // Copied out so the registry lock is not held across the write.
        let blob = self
            .blobs()
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::UnknownUrl(url.to_string()))?;

        let path = self.path_for(filename);
        let write_err = |source| DownloadError::Write {
            path: path.display().to_string(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(write_err)?;
        tokio::fs::write(&path, &blob).await.map_err(write_err)?;

        info!(path = %path.display(), size_bytes = blob.len(), "saved download");
        Ok(())
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        if self.blobs().remove(url).is_some() {
            debug!(%url, "revoked object url");
        }
    }
}
