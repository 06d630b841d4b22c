//! Blob storage client for agent document uploads.
//!
//! Talks to an S3/MinIO-compatible endpoint over plain HTTP: the container
//! is a path under the configured endpoint and each blob is a PUT below it.
//! Uploaded blobs are never deleted by this service; overwritten or
//! abandoned document references leave their blobs behind.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::BlobStorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Container error: {0}")]
    Container(String),
}

/// Object storage capability used by the request handlers.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Idempotently creates the storage container if absent.
    async fn ensure_container(&self) -> Result<(), StorageError>;

    /// Uploads `data` under `name`, tagging it with `content_type`.
    /// Returns the publicly resolvable URL of the blob.
    async fn upload(
        &self,
        name: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError>;
}

pub struct HttpBlobClient {
    config: BlobStorageConfig,
    http_client: Client,
    base_url: String,
}

impl HttpBlobClient {
    pub fn new(config: BlobStorageConfig) -> Result<Self> {
        info!("Initializing blob client for container: {}", config.container);

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = format!(
            "{}/{}",
            config.endpoint.trim_end_matches('/'),
            config.container
        );

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    fn blob_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

#[async_trait]
impl BlobStore for HttpBlobClient {
    async fn ensure_container(&self) -> Result<(), StorageError> {
        debug!("Ensuring container exists: {}", self.config.container);

        let response = self
            .http_client
            .put(&self.base_url)
            .send()
            .await
            .map_err(|e| StorageError::Container(e.to_string()))?;

        // An already-existing container reports a conflict; both count as ready.
        if response.status().is_success() || response.status() == StatusCode::CONFLICT {
            info!("Container \"{}\" is ready", self.config.container);
            Ok(())
        } else {
            Err(StorageError::Container(format!(
                "unexpected status {}",
                response.status()
            )))
        }
    }

    async fn upload(
        &self,
        name: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let limit_bytes = self.config.max_file_size_mb * 1024 * 1024;
        if data.len() as u64 > limit_bytes {
            return Err(StorageError::Upload(format!(
                "file size {} bytes exceeds limit of {} MB",
                data.len(),
                self.config.max_file_size_mb
            )));
        }

        let url = self.blob_url(name);
        debug!("Uploading blob: {} ({} bytes)", name, data.len());

        let response = self
            .http_client
            .put(&url)
            .header(
                reqwest::header::CONTENT_TYPE,
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::Upload(format!(
                "storage responded with {}",
                response.status()
            )));
        }

        info!("Blob uploaded: {}", name);
        Ok(url)
    }
}

/// Blob name for a document upload. The random suffix keeps concurrent
/// uploads and re-uploads of the same slot from colliding.
pub fn unique_blob_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}
