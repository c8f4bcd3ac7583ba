//! Port for the injected blob storage backend.
//!
//! Blobs are write-once image objects addressed by an owner-scoped path.
//! The store also answers whether a URL denotes one of its own objects,
//! which is how image ownership (and therefore deletion behavior) is
//! decided.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::AccountId;

/// Owner-scoped storage path for an uploaded recipe image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath(String);

impl BlobPath {
    /// Path for a recipe image picked with the given file name.
    ///
    /// Uploads by the same owner with the same file name share a path and
    /// overwrite each other, matching the storage backend's last-write-wins
    /// object semantics.
    pub fn for_recipe_image(owner_id: &AccountId, file_name: &str) -> Self {
        Self(format!("recipes/{owner_id}/{file_name}"))
    }

    /// Path string handed to the backend.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a stored blob, assigned by the backend on upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobReference(String);

impl BlobReference {
    /// Wrap a backend-assigned reference value.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Reference string handed back to the backend.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BlobReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by blob store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobStoreError {
    /// The request never reached the backend.
    #[error("blob backend unreachable: {message}")]
    Unreachable {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// The backend processed the request and refused it.
    #[error("blob backend rejected the request: {message}")]
    Rejected {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl BlobStoreError {
    /// Construct a [`BlobStoreError::Unreachable`] error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Construct a [`BlobStoreError::Rejected`] error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Port for image blob uploads, URL resolution, and deletion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at the path, overwriting any previous object.
    async fn upload(&self, path: &BlobPath, bytes: &[u8]) -> Result<BlobReference, BlobStoreError>;

    /// Publicly servable URL for a stored blob.
    async fn resolve_url(&self, reference: &BlobReference) -> Result<Url, BlobStoreError>;

    /// Remove a stored blob.
    async fn delete(&self, reference: &BlobReference) -> Result<(), BlobStoreError>;

    /// The reference behind a URL, when the URL denotes an object this
    /// store owns; `None` for external URLs.
    fn reference_for_url(&self, url: &Url) -> Option<BlobReference>;
}

/// Fixture implementation for tests that never touch blob storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBlobStore;

#[async_trait]
impl BlobStore for FixtureBlobStore {
    async fn upload(
        &self,
        path: &BlobPath,
        _bytes: &[u8],
    ) -> Result<BlobReference, BlobStoreError> {
        Ok(BlobReference::new(path.as_str()))
    }

    async fn resolve_url(&self, reference: &BlobReference) -> Result<Url, BlobStoreError> {
        Url::parse(&format!("https://blobs.invalid/{reference}"))
            .map_err(|err| BlobStoreError::rejected(err.to_string()))
    }

    async fn delete(&self, _reference: &BlobReference) -> Result<(), BlobStoreError> {
        Ok(())
    }

    fn reference_for_url(&self, _url: &Url) -> Option<BlobReference> {
        None
    }
}
