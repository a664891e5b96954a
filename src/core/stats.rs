use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::mvcc::controller::Generation;

/// Index statistics of one committed generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub generation: u64,
    pub committed_at: DateTime<Utc>,
    pub doc_count: usize,
    pub term_count: usize,                   // Distinct (field, term) pairs
    pub fields: BTreeMap<String, FieldStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub doc_count: u32,     // Documents with at least one term in the field
    pub term_count: usize,
    pub avg_tokens: f32,
}

impl IndexStats {
    pub fn from_generation(generation: &Generation) -> Self {
        let fields = generation
            .index
            .fields
            .iter()
            .map(|(name, field)| {
                (
                    name.clone(),
                    FieldStats {
                        doc_count: field.doc_count,
                        term_count: field.term_count(),
                        avg_tokens: field.avg_tokens(),
                    },
                )
            })
            .collect();

        IndexStats {
            generation: generation.version,
            committed_at: generation.committed_at,
            doc_count: generation.doc_count(),
            term_count: generation.index.term_count(),
            fields,
        }
    }
}
