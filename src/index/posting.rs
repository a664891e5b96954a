use serde::{Serialize, Deserialize};
use crate::core::types::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_freq: u32,       // Term frequency in this field of the document
}

/// Posting list for a term
/// Note: Sorted by doc_id, one entry per document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    pub fn add_posting(&mut self, posting: Posting) {
        // Builders add in doc order, so this is nearly always a push
        if self.postings.last().map_or(true, |last| last.doc_id < posting.doc_id) {
            self.postings.push(posting);
            return;
        }

        match self.postings.binary_search_by_key(&posting.doc_id, |p| p.doc_id) {
            Ok(pos) => {
                self.postings[pos] = posting;
            }
            Err(pos) => {
                self.postings.insert(pos, posting);
            }
        }
    }

    pub fn get(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|pos| &self.postings[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Posting> {
        self.postings.iter()
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn total_freq(&self) -> u64 {
        self.postings.iter().map(|p| p.term_freq as u64).sum()
    }

    /// Intersect two posting lists (linear merge), keeping self's postings
    pub fn intersect(&self, other: &PostingList) -> Vec<Posting> {
        let mut result = Vec::new();
        let mut i = 0;
        let mut j = 0;

        while i < self.postings.len() && j < other.postings.len() {
            let doc_id1 = self.postings[i].doc_id;
            let doc_id2 = other.postings[j].doc_id;

            if doc_id1 == doc_id2 {
                result.push(self.postings[i]);
                i += 1;
                j += 1;
            } else if doc_id1 < doc_id2 {
                i += 1;
            } else {
                j += 1;
            }
        }

        result
    }
}
