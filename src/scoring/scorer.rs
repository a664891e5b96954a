use crate::core::config::Similarity;
use crate::index::posting::Posting;

/// Scorer trait
pub trait Scorer: Send + Sync {
    fn score(&self, posting: &Posting, term_info: &TermInfo, doc_stats: &DocStats) -> f32;

    fn name(&self) -> &str;
}

/// Collection statistics of one term
#[derive(Debug, Clone, Copy)]
pub struct TermInfo {
    pub doc_freq: u32,        // Number of documents containing term
    pub idf: f32,
}

impl TermInfo {
    pub fn new(doc_freq: u32, total_docs: usize) -> Self {
        TermInfo {
            doc_freq,
            idf: idf(total_docs, doc_freq),
        }
    }
}

/// Document statistics for scoring
#[derive(Debug, Clone, Copy)]
pub struct DocStats {
    pub doc_length: u32,      // Tokens in this field of the document
    pub avg_doc_length: f32,  // Average tokens of the field over documents having it
    pub total_docs: usize,    // Total number of documents
}

/// idf(t) = ln(1 + N / (1 + df))
pub fn idf(total_docs: usize, doc_freq: u32) -> f32 {
    (1.0 + total_docs as f32 / (1.0 + doc_freq as f32)).ln()
}

/// TF-IDF Scorer: raw term frequency times idf
pub struct TfIdfScorer;

impl Scorer for TfIdfScorer {
    fn score(&self, posting: &Posting, term_info: &TermInfo, _doc_stats: &DocStats) -> f32 {
        posting.term_freq as f32 * term_info.idf
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}

/// BM25 Scorer
pub struct BM25Scorer {
    pub k1: f32,  // Term frequency saturation (default: 1.2)
    pub b: f32,   // Length normalization strength (default: 0.75)
}

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer {
            k1: 1.2,
            b: 0.75,
        }
    }
}

impl Scorer for BM25Scorer {
    fn score(&self, posting: &Posting, term_info: &TermInfo, doc_stats: &DocStats) -> f32 {
        let tf = posting.term_freq as f32;
        let doc_len = doc_stats.doc_length as f32;
        let avg_doc_len = if doc_stats.avg_doc_length > 0.0 {
            doc_stats.avg_doc_length
        } else {
            1.0
        };

        let numerator = term_info.idf * tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * (doc_len / avg_doc_len));

        numerator / denominator
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

pub fn scorer_for(similarity: Similarity) -> Box<dyn Scorer> {
    match similarity {
        Similarity::TfIdf => Box::new(TfIdfScorer),
        Similarity::Bm25 { k1, b } => Box::new(BM25Scorer { k1, b }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DocId;

    fn stats(doc_length: u32) -> DocStats {
        DocStats { doc_length, avg_doc_length: 4.0, total_docs: 10 }
    }

    #[test]
    fn test_idf_positive_and_decreasing() {
        assert!(idf(1, 1) > 0.0);
        assert!(idf(10, 1) > idf(10, 5));
        assert!((idf(3, 0) - 4.0f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn test_tfidf_is_linear_in_tf() {
        let info = TermInfo::new(2, 10);
        let one = TfIdfScorer.score(&Posting { doc_id: DocId(0), term_freq: 1 }, &info, &stats(4));
        let three = TfIdfScorer.score(&Posting { doc_id: DocId(0), term_freq: 3 }, &info, &stats(4));
        assert!((three - 3.0 * one).abs() < 1e-5);
    }

    #[test]
    fn test_bm25_prefers_shorter_fields() {
        let scorer = BM25Scorer::default();
        let info = TermInfo::new(2, 10);
        let posting = Posting { doc_id: DocId(0), term_freq: 1 };
        assert!(scorer.score(&posting, &info, &stats(2)) > scorer.score(&posting, &info, &stats(8)));
    }
}
