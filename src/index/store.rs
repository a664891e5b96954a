use serde::{Serialize, Deserialize};
use crate::core::types::{DocId, StoredDocument};

/// docId → stored field values; doc ids are dense so a Vec suffices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStore {
    documents: Vec<StoredDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        DocumentStore { documents: Vec::new() }
    }

    /// Appends the next document; its id must equal the current length
    pub fn push(&mut self, document: StoredDocument) {
        debug_assert_eq!(document.id.0 as usize, self.documents.len());
        self.documents.push(document);
    }

    pub fn get(&self, doc_id: DocId) -> Option<&StoredDocument> {
        self.documents.get(doc_id.0 as usize)
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        (doc_id.0 as usize) < self.documents.len()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredDocument> {
        self.documents.iter()
    }
}
