use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::debug;
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::index::posting::{Posting, PostingList};
use crate::scoring::scorer::{DocStats, TermInfo};
use crate::search::fuzzy::FuzzyAutomaton;
use crate::search::prefix::PrefixIndex;
use crate::search::wildcard::WildcardPattern;

/// Term representation: (field, normalized token)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Term {
    pub field: String,
    pub text: String,
}

impl Term {
    pub fn new(field: &str, text: &str) -> Self {
        Term {
            field: field.to_string(),
            text: text.to_string(),
        }
    }
}

/// Postings and length statistics of one field
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FieldIndex {
    pub terms: BTreeMap<String, PostingList>,
    pub doc_lengths: Vec<u32>,   // Indexed by doc id, 0 when the field is absent
    pub doc_count: u32,          // Documents with at least one term in this field
    pub total_tokens: u64,
    #[serde(skip)]
    pub prefix_index: PrefixIndex,
}

impl FieldIndex {
    pub fn avg_tokens(&self) -> f32 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.total_tokens as f32 / self.doc_count as f32
        }
    }

    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(doc_id.0 as usize).copied().unwrap_or(0)
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    fn add_document(&mut self, doc_id: DocId, terms: &[(String, u32)], token_count: u32) {
        if terms.is_empty() {
            return;
        }

        for (text, term_freq) in terms {
            self.terms
                .entry(text.clone())
                .or_insert_with(PostingList::new)
                .add_posting(Posting { doc_id, term_freq: *term_freq });
        }

        let slot = doc_id.0 as usize;
        if self.doc_lengths.len() <= slot {
            self.doc_lengths.resize(slot + 1, 0);
        }
        self.doc_lengths[slot] = token_count;
        self.doc_count += 1;
        self.total_tokens += token_count as u64;
    }

    fn build_prefix_index(&mut self) -> Result<()> {
        let terms = self.terms
            .iter()
            .map(|(text, postings)| (text.as_str(), postings.doc_freq()));
        self.prefix_index = PrefixIndex::build(terms)?;
        Ok(())
    }
}

/// Inverted index structure: field → term → postings
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub fields: BTreeMap<String, FieldIndex>,
    pub doc_count: usize,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex {
            fields: BTreeMap::new(),
            doc_count: 0,
        }
    }

    /// Record the distinct terms of one field value of one document
    pub fn add_field(&mut self, field: &str, doc_id: DocId, terms: &[(String, u32)], token_count: u32) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .add_document(doc_id, terms, token_count);
    }

    /// Seal the index: pad length tables and build the per-field term FSTs
    pub fn finish(&mut self, doc_count: usize) -> Result<()> {
        self.doc_count = doc_count;
        for (name, field) in self.fields.iter_mut() {
            field.doc_lengths.resize(doc_count, 0);
            field.build_prefix_index()?;
            debug!(field = %name, terms = field.term_count(), "field dictionary built");
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldIndex> {
        self.fields.get(name)
    }

    pub fn search_term(&self, term: &Term) -> Option<&PostingList> {
        self.fields
            .get(&term.field)
            .and_then(|field| field.terms.get(&term.text))
    }

    pub fn term_info(&self, term: &Term) -> Option<TermInfo> {
        self.search_term(term)
            .map(|postings| TermInfo::new(postings.doc_freq(), self.doc_count))
    }

    pub fn doc_stats(&self, field: &str, doc_id: DocId) -> DocStats {
        let (doc_length, avg_doc_length) = self.fields
            .get(field)
            .map(|f| (f.doc_length(doc_id), f.avg_tokens()))
            .unwrap_or((0, 0.0));

        DocStats {
            doc_length,
            avg_doc_length,
            total_docs: self.doc_count,
        }
    }

    /// Number of distinct terms across all fields
    pub fn term_count(&self) -> usize {
        self.fields.values().map(|f| f.term_count()).sum()
    }

    /// Get an iterator over all terms in the index
    pub fn terms(&self) -> impl Iterator<Item = Term> + '_ {
        self.fields.iter().flat_map(|(name, field)| {
            field.terms.keys().map(move |text| Term::new(name, text))
        })
    }

    /// Terms of `field` satisfying the glob, in dictionary order
    pub fn wildcard_search(&self, field: &str, pattern: &WildcardPattern) -> Vec<String> {
        let Some(field_index) = self.fields.get(field) else {
            return Vec::new();
        };

        if !pattern.has_wildcards() {
            return field_index.terms
                .contains_key(pattern.literal_prefix())
                .then(|| pattern.literal_prefix().to_string())
                .into_iter()
                .collect();
        }

        // A literal prefix narrows the candidates to one FST range
        let candidates = if pattern.literal_prefix().is_empty() {
            field_index.prefix_index.all_terms()
        } else {
            field_index.prefix_index.search_prefix(pattern.literal_prefix())
        };

        candidates
            .into_iter()
            .filter(|term| pattern.matches(term))
            .collect()
    }

    /// Terms of `field` within the automaton's edit distance, in dictionary order
    pub fn fuzzy_search(&self, field: &str, automaton: &FuzzyAutomaton, prefix_length: u8) -> Vec<(String, u8)> {
        let Some(field_index) = self.fields.get(field) else {
            return Vec::new();
        };

        let prefix: String = automaton.term().chars().take(prefix_length as usize).collect();
        let candidates = if prefix.is_empty() {
            field_index.prefix_index.all_terms()
        } else {
            field_index.prefix_index.search_prefix(&prefix)
        };

        candidates
            .into_iter()
            .filter_map(|term| automaton.distance(&term).map(|d| (term, d)))
            .collect()
    }

    /// Rebuild derived structures after deserialization
    pub fn rebuild(&mut self) -> Result<()> {
        for field in self.fields.values_mut() {
            field.build_prefix_index()?;
        }
        Ok(())
    }
}
