//! In-memory blob storage backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use url::Url;

use crate::domain::ports::{BlobPath, BlobReference, BlobStore, BlobStoreError};

const BLOB_HOST: &str = "blobs.invalid";

struct BlobData {
    // Keyed by storage path; references are the path itself.
    objects: HashMap<String, Vec<u8>>,
    deleted: Vec<BlobReference>,
    fail_uploads: bool,
    fail_deletes: bool,
}

impl BlobData {
    fn new() -> Self {
        Self {
            objects: HashMap::new(),
            deleted: Vec::new(),
            fail_uploads: false,
            fail_deletes: false,
        }
    }
}

/// Blob backend holding objects in a process-local map.
///
/// Served URLs take the form `https://blobs.invalid/{path}`, so the store
/// recognises its own objects by host alone. Failure knobs let tests steer
/// uploads and deletions onto the error paths.
pub struct MemoryBlobStore {
    data: Mutex<BlobData>,
}

impl MemoryBlobStore {
    /// Create an empty blob store with both failure knobs off.
    pub fn new() -> Self {
        Self {
            data: Mutex::new(BlobData::new()),
        }
    }

    /// Make subsequent uploads fail as if the backend were unreachable.
    pub async fn set_fail_uploads(&self, fail: bool) {
        self.data.lock().await.fail_uploads = fail;
    }

    /// Make subsequent deletions fail as if the backend refused them.
    pub async fn set_fail_deletes(&self, fail: bool) {
        self.data.lock().await.fail_deletes = fail;
    }

    /// References deleted so far, in deletion order.
    pub async fn deleted_references(&self) -> Vec<BlobReference> {
        self.data.lock().await.deleted.clone()
    }

    /// Whether an object is currently stored at the path.
    pub async fn contains_object(&self, path: &BlobPath) -> bool {
        self.data.lock().await.objects.contains_key(path.as_str())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &BlobPath, bytes: &[u8]) -> Result<BlobReference, BlobStoreError> {
        let mut data = self.data.lock().await;
        if data.fail_uploads {
            return Err(BlobStoreError::unreachable("simulated transport failure"));
        }
        data.objects.insert(path.as_str().to_owned(), bytes.to_vec());
        Ok(BlobReference::new(path.as_str()))
    }

    async fn resolve_url(&self, reference: &BlobReference) -> Result<Url, BlobStoreError> {
        let data = self.data.lock().await;
        if !data.objects.contains_key(reference.as_str()) {
            return Err(BlobStoreError::rejected(format!(
                "no such object: {reference}"
            )));
        }
        Url::parse(&format!("https://{BLOB_HOST}/{reference}"))
            .map_err(|err| BlobStoreError::rejected(err.to_string()))
    }

    async fn delete(&self, reference: &BlobReference) -> Result<(), BlobStoreError> {
        let mut data = self.data.lock().await;
        if data.fail_deletes {
            return Err(BlobStoreError::rejected("simulated delete refusal"));
        }
        if data.objects.remove(reference.as_str()).is_none() {
            return Err(BlobStoreError::rejected(format!(
                "no such object: {reference}"
            )));
        }
        data.deleted.push(reference.clone());
        Ok(())
    }

    fn reference_for_url(&self, url: &Url) -> Option<BlobReference> {
        if url.host_str() != Some(BLOB_HOST) {
            return None;
        }
        let path = url.path().trim_start_matches('/');
        if path.is_empty() {
            return None;
        }
        Some(BlobReference::new(path))
    }
}
