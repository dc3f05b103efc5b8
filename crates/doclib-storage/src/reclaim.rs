//! Background blob reclamation.

use std::sync::Arc;

use tracing::{debug, warn};

use doclib_core::traits::storage::BlobStore;

/// Deletes blobs whose owning rows are gone (rejected or canceled
/// requests, force-deleted versions).
///
/// Reclamation is tolerant: the database rows have already been removed
/// when this runs, so a failed delete only logs a warning and the blob
/// is retried by the next sweep over the same paths.
#[derive(Debug, Clone)]
pub struct BlobReclaimer {
    store: Arc<dyn BlobStore>,
}

impl BlobReclaimer {
    /// Create a new reclaimer over the given blob store.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Delete the given blob paths, continuing past failures. Returns
    /// the number of blobs actually deleted.
    pub async fn reclaim(&self, paths: &[String]) -> usize {
        let mut deleted = 0;
        for path in paths {
            match self.store.delete(path).await {
                Ok(()) => {
                    deleted += 1;
                    debug!(path = %path, "Reclaimed blob");
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to reclaim blob");
                }
            }
        }
        deleted
    }

    /// Spawn reclamation in the background. Used where the caller must
    /// not wait on storage, e.g. request rejection.
    pub fn reclaim_detached(&self, paths: Vec<String>) {
        if paths.is_empty() {
            return;
        }
        let reclaimer = self.clone();
        tokio::spawn(async move {
            reclaimer.reclaim(&paths).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalBlobStore;
    use bytes::Bytes;
    use doclib_core::config::StorageConfig;

    #[tokio::test]
    async fn test_reclaim_deletes_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            root_path: dir.path().to_str().unwrap().to_string(),
            ..StorageConfig::default()
        };
        let store = Arc::new(LocalBlobStore::new(&config).await.unwrap());
        let blob = store.put(Bytes::from("doomed")).await.unwrap();

        let reclaimer = BlobReclaimer::new(store.clone());
        let deleted = reclaimer
            .reclaim(&[blob.path.clone(), "aa/bb/missing.bin".to_string()])
            .await;

        // A missing path deletes cleanly, so both count.
        assert_eq!(deleted, 2);
        assert!(!store.exists(&blob.path).await.unwrap());
    }
}
