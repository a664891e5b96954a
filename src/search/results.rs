use std::collections::BinaryHeap;
use std::cmp::Ordering;
use std::fmt;
use serde::{Serialize, Deserialize};
use crate::core::types::{DocId, StoredDocument};

/// Search results container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<ScoredDocument>,
    pub total_hits: usize,
    pub max_score: f32,
    pub took_ms: u64,
}

impl SearchResults {
    pub fn empty() -> Self {
        SearchResults {
            hits: Vec::new(),
            total_hits: 0,
            max_score: 0.0,
            took_ms: 0,
        }
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.hits.iter().map(|h| h.doc_id).collect()
    }
}

/// Document with relevance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub score: f32,
    pub document: Option<StoredDocument>,  // Stored fields, for rendering
}

impl ScoredDocument {
    pub fn new(doc_id: DocId, score: f32) -> Self {
        ScoredDocument {
            doc_id,
            score,
            document: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.document.as_ref().and_then(|d| d.get_field(name))
    }

    /// Result order: higher score first, lower doc id on ties
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other.score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Heap entry ordered so that the worst-ranked hit is the greatest
struct Ranked(ScoredDocument);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Score explanation for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreExplanation {
    pub value: f32,
    pub description: String,
    pub details: Vec<ScoreExplanation>,
}

impl ScoreExplanation {
    pub fn new(value: f32, description: String, details: Vec<ScoreExplanation>) -> Self {
        ScoreExplanation { value, description, details }
    }

    fn write_indented(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{:.4} = {}", "", self.value, self.description, indent = depth * 2)?;
        for detail in &self.details {
            detail.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ScoreExplanation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Top-K collector keeping the best `k` hits by (score desc, doc id asc)
pub struct TopKCollector {
    heap: BinaryHeap<Ranked>,
    pub k: usize,
    pub total_collected: usize,  // Track total documents processed
    pub max_score: f32,
}

impl TopKCollector {
    pub fn new(k: usize) -> Self {
        TopKCollector {
            heap: BinaryHeap::with_capacity(k.min(1024) + 1),
            k,
            total_collected: 0,
            max_score: 0.0,
        }
    }

    pub fn collect(&mut self, scored_doc: ScoredDocument) {
        if self.total_collected == 0 || scored_doc.score > self.max_score {
            self.max_score = scored_doc.score;
        }
        self.total_collected += 1;

        if self.k == 0 {
            return;
        }

        if self.heap.len() < self.k {
            self.heap.push(Ranked(scored_doc));
            return;
        }

        let beats_worst = self.heap
            .peek()
            .is_some_and(|worst| scored_doc.rank_cmp(&worst.0) == Ordering::Less);

        if beats_worst {
            self.heap.pop();
            self.heap.push(Ranked(scored_doc));
        }
    }

    /// Best hit first
    pub fn get_results(self) -> Vec<ScoredDocument> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|ranked| ranked.0)
            .collect()
    }
}
