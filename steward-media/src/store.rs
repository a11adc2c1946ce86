use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::{MediaId, MediaResult};

/// Storage primitive behind `MediaUploader`: an upload primitive returning
/// an immutable identifier. Treated as an external collaborator — the
/// submission core only depends on this trait, never on a concrete
/// backend, so tests can run against `InMemoryContentStore` and production
/// wires in whatever object store it likes.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a blob, returning its stable content-addressed identifier.
    async fn put(&self, bytes: Bytes, content_type: Option<&str>) -> MediaResult<PutResult>;

    /// Check whether a previously-uploaded blob is still present.
    async fn exists(&self, id: &MediaId) -> MediaResult<bool>;

    /// Delete a blob (used when a draft is discarded before enqueue).
    async fn delete(&self, id: &MediaId) -> MediaResult<()>;
}

#[derive(Debug, Clone)]
pub struct PutResult {
    pub id: MediaId,
    pub size_bytes: u64,
}

/// An in-process store for tests and local development. Ids are random
/// rather than content-hashed — content-hashing is a nice-to-have, not
/// part of the correctness argument, so swapping in a real hash-addressed
/// store is a drop-in replacement since nothing else inspects the id's
/// shape.
#[derive(Default)]
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<MediaId, Bytes>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, bytes: Bytes, _content_type: Option<&str>) -> MediaResult<PutResult> {
        let id = MediaId::new();
        let size_bytes = bytes.len() as u64;
        self.blobs.write().insert(id.clone(), bytes);
        Ok(PutResult { id, size_bytes })
    }

    async fn exists(&self, id: &MediaId) -> MediaResult<bool> {
        Ok(self.blobs.read().contains_key(id))
    }

    async fn delete(&self, id: &MediaId) -> MediaResult<()> {
        self.blobs.write().remove(id);
        Ok(())
    }
}
