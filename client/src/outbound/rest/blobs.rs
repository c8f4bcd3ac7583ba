//! Reqwest-backed blob store adapter.
//!
//! Objects live behind a single `blobs` endpoint addressed by a `path`
//! query parameter. Served URLs reuse that endpoint, so claiming a URL is a
//! pure parse against the base URL rather than a network call.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode, Url, header};

use super::client::{RestBackend, status_message};
use crate::domain::ports::{BlobPath, BlobReference, BlobStore, BlobStoreError};

/// Blob store backed by the hosted storage endpoint.
pub struct RestBlobStore {
    backend: Arc<RestBackend>,
}

impl RestBlobStore {
    /// Build a store over the shared transport handle.
    pub fn new(backend: Arc<RestBackend>) -> Self {
        Self { backend }
    }

    fn blob_endpoint(&self, path: &str) -> Result<Url, BlobStoreError> {
        let mut url = self
            .backend
            .endpoint("blobs")
            .map_err(|error| BlobStoreError::rejected(error.to_string()))?;
        url.query_pairs_mut().append_pair("path", path);
        Ok(url)
    }
}

#[async_trait]
impl BlobStore for RestBlobStore {
    async fn upload(&self, path: &BlobPath, bytes: &[u8]) -> Result<BlobReference, BlobStoreError> {
        let url = self.blob_endpoint(path.as_str())?;
        let response = self
            .backend
            .request(Method::PUT, url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(map_transport_error)?;
        read_ok(response).await?;
        Ok(BlobReference::new(path.as_str()))
    }

    async fn resolve_url(&self, reference: &BlobReference) -> Result<Url, BlobStoreError> {
        self.blob_endpoint(reference.as_str())
    }

    async fn delete(&self, reference: &BlobReference) -> Result<(), BlobStoreError> {
        let url = self.blob_endpoint(reference.as_str())?;
        let response = self
            .backend
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(map_transport_error)?;
        read_ok(response).await
    }

    fn reference_for_url(&self, url: &Url) -> Option<BlobReference> {
        claimed_reference(self.backend.base_url(), url)
    }
}

async fn read_ok(response: Response) -> Result<(), BlobStoreError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    Ok(())
}

fn map_transport_error(error: reqwest::Error) -> BlobStoreError {
    BlobStoreError::unreachable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> BlobStoreError {
    BlobStoreError::rejected(status_message(status, body))
}

/// The stored path behind a URL, when the URL addresses this store's blob
/// endpoint on the same origin.
fn claimed_reference(base: &Url, url: &Url) -> Option<BlobReference> {
    if url.scheme() != base.scheme()
        || url.host_str() != base.host_str()
        || url.port_or_known_default() != base.port_or_known_default()
    {
        return None;
    }
    let blobs = base.join("blobs").ok()?;
    if url.path() != blobs.path() {
        return None;
    }
    let path = url
        .query_pairs()
        .find_map(|(key, value)| (key == "path").then(|| value.into_owned()))?;
    if path.is_empty() {
        return None;
    }
    Some(BlobReference::new(path))
}
