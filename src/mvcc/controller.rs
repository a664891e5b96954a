use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tracing::info;
use crate::core::error::{Error, Result};
use crate::core::types::{DocId, StoredDocument};
use crate::index::index_writer::BuildOutput;
use crate::index::inverted::InvertedIndex;
use crate::index::store::DocumentStore;
use crate::schema::schema::Schema;

/// One immutable, fully built version of the index
#[derive(Debug, Serialize, Deserialize)]
pub struct Generation {
    pub version: u64,
    pub committed_at: DateTime<Utc>,
    pub schema: Schema,
    pub index: InvertedIndex,
    pub store: DocumentStore,
}

impl Generation {
    pub fn new(version: u64, schema: Schema, output: BuildOutput) -> Self {
        Generation {
            version,
            committed_at: Utc::now(),
            schema,
            index: output.index,
            store: output.store,
        }
    }

    pub fn doc_count(&self) -> usize {
        self.store.len()
    }

    pub fn document(&self, doc_id: DocId) -> Option<&StoredDocument> {
        self.store.get(doc_id)
    }
}

/// Publishes generations atomically: readers clone the current `Arc` and keep
/// it for as long as they need, a commit only swaps the pointer
pub struct GenerationController {
    current: RwLock<Option<Arc<Generation>>>,
    next_version: AtomicU64,
    writer: Mutex<()>,
}

impl GenerationController {
    pub fn new() -> Self {
        GenerationController {
            current: RwLock::new(None),
            next_version: AtomicU64::new(1),
            writer: Mutex::new(()),
        }
    }

    /// Serializes builds; hold the guard from build start until commit
    pub fn begin_write(&self) -> MutexGuard<'_, ()> {
        self.writer.lock()
    }

    pub fn next_version(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Replace the current generation; the previous one is released once
    /// its last reader drops it
    pub fn commit(&self, generation: Generation) -> Arc<Generation> {
        // Versions restored from disk must not be reissued
        self.next_version.fetch_max(generation.version + 1, Ordering::SeqCst);

        let generation = Arc::new(generation);
        let previous = self.current.write().replace(generation.clone());

        info!(
            version = generation.version,
            documents = generation.doc_count(),
            replaced = previous.as_ref().map(|g| g.version),
            "generation committed"
        );

        generation
    }

    pub fn current(&self) -> Option<Arc<Generation>> {
        self.current.read().clone()
    }

    pub fn require_current(&self) -> Result<Arc<Generation>> {
        self.current().ok_or_else(Error::index_not_ready)
    }

    /// Drop the published generation; readers holding it are unaffected
    pub fn clear(&self) -> Option<Arc<Generation>> {
        self.current.write().take()
    }
}

impl Default for GenerationController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::index::index_writer::BuildReport;

    fn empty_generation(version: u64) -> Generation {
        let mut index = InvertedIndex::new();
        index.finish(0).unwrap();
        Generation::new(
            version,
            Schema::new().analyzed_field("name"),
            BuildOutput { index, store: DocumentStore::new(), report: BuildReport::default() },
        )
    }

    #[test]
    fn test_not_ready_before_commit() {
        let controller = GenerationController::new();
        assert_eq!(controller.require_current().unwrap_err().kind(), ErrorKind::IndexNotReady);
    }

    #[test]
    fn test_readers_keep_old_generation() {
        let controller = GenerationController::new();
        let v1 = controller.next_version();
        controller.commit(empty_generation(v1));

        let reader = controller.require_current().unwrap();
        let v2 = controller.next_version();
        controller.commit(empty_generation(v2));

        assert_eq!(reader.version, v1);
        assert_eq!(controller.require_current().unwrap().version, v2);
        assert!(v2 > v1);
    }

    #[test]
    fn test_restored_version_is_not_reissued() {
        let controller = GenerationController::new();
        controller.commit(empty_generation(7));
        assert_eq!(controller.next_version(), 8);
    }

    #[test]
    fn test_clear() {
        let controller = GenerationController::new();
        controller.commit(empty_generation(1));
        assert!(controller.clear().is_some());
        assert!(controller.current().is_none());
    }
}
