use std::collections::HashMap;
use std::time::Instant;
use roaring::RoaringBitmap;
use crate::core::types::DocId;
use crate::index::inverted::{InvertedIndex, Term};
use crate::query::planner::LogicalPlan;
use crate::scoring::scorer::Scorer;
use crate::search::results::{ScoreExplanation, ScoredDocument, SearchResults, TopKCollector};

/// Documents matched by one plan node with their accumulated scores
#[derive(Debug, Default)]
pub struct Matches {
    pub docs: RoaringBitmap,
    scores: HashMap<u32, f32>,
}

impl Matches {
    fn add(&mut self, doc: u32, score: f32) {
        self.docs.insert(doc);
        *self.scores.entry(doc).or_insert(0.0) += score;
    }

    pub fn score(&self, doc: u32) -> f32 {
        self.scores.get(&doc).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.docs.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn scale(mut self, factor: f32) -> Self {
        for score in self.scores.values_mut() {
            *score *= factor;
        }
        self
    }
}

/// Evaluates logical plans against one index generation
pub struct QueryExecutor<'a> {
    pub index: &'a InvertedIndex,
    pub scorer: &'a dyn Scorer,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(index: &'a InvertedIndex, scorer: &'a dyn Scorer) -> Self {
        QueryExecutor { index, scorer }
    }

    /// Full evaluation, then the best `limit` hits by (score desc, doc id asc)
    pub fn search(&self, plan: &LogicalPlan, limit: usize) -> SearchResults {
        let start = Instant::now();
        let matches = self.execute(plan);

        let mut collector = TopKCollector::new(limit);
        for doc in matches.docs.iter() {
            collector.collect(ScoredDocument::new(DocId(doc), matches.score(doc)));
        }

        let total_hits = collector.total_collected;
        let max_score = collector.max_score;

        SearchResults {
            hits: collector.get_results(),
            total_hits,
            max_score,
            took_ms: start.elapsed().as_millis() as u64,
        }
    }

    pub fn execute(&self, plan: &LogicalPlan) -> Matches {
        match plan {
            LogicalPlan::Empty => Matches::default(),
            LogicalPlan::TermSet { field, terms, require_all } => {
                self.execute_terms(field, terms, *require_all)
            }
            LogicalPlan::Bool { must, should, must_not } => {
                self.execute_bool(must, should, must_not)
            }
            LogicalPlan::Boost { input, boost } => self.execute(input).scale(*boost),
        }
    }

    fn execute_term(&self, field: &str, text: &str) -> Matches {
        let mut matches = Matches::default();
        let term = Term::new(field, text);

        if let (Some(posting_list), Some(term_info)) = (self.index.search_term(&term), self.index.term_info(&term)) {
            for posting in posting_list.iter() {
                let doc_stats = self.index.doc_stats(field, posting.doc_id);
                let score = self.scorer.score(posting, &term_info, &doc_stats);
                matches.add(posting.doc_id.0, score);
            }
        }

        matches
    }

    fn execute_terms(&self, field: &str, terms: &[String], require_all: bool) -> Matches {
        let per_term: Vec<Matches> = terms
            .iter()
            .map(|text| self.execute_term(field, text))
            .collect();

        let candidates = if require_all {
            intersect_all(&per_term)
        } else {
            union_all(&per_term)
        };

        sum_scores(candidates, &per_term)
    }

    fn execute_bool(&self, must: &[LogicalPlan], should: &[LogicalPlan], must_not: &[LogicalPlan]) -> Matches {
        let must: Vec<Matches> = must.iter().map(|p| self.execute(p)).collect();
        let should: Vec<Matches> = should.iter().map(|p| self.execute(p)).collect();

        // Without MUST clauses at least one SHOULD clause has to match
        let mut candidates = if !must.is_empty() {
            intersect_all(&must)
        } else {
            union_all(&should)
        };

        for plan in must_not {
            candidates -= &self.execute(plan).docs;
        }

        let mut contributing = must;
        contributing.extend(should);
        sum_scores(candidates, &contributing)
    }

    /// Score breakdown of one document, None when the plan does not match it
    pub fn explain(&self, plan: &LogicalPlan, doc_id: DocId) -> Option<ScoreExplanation> {
        match plan {
            LogicalPlan::Empty => None,
            LogicalPlan::TermSet { field, terms, require_all } => {
                let mut details = Vec::new();
                for text in terms {
                    match self.explain_term(field, text, doc_id) {
                        Some(detail) => details.push(detail),
                        None if *require_all => return None,
                        None => {}
                    }
                }
                if details.is_empty() {
                    return None;
                }
                let value = details.iter().map(|d| d.value).sum();
                Some(ScoreExplanation::new(value, format!("sum of {} terms", field), details))
            }
            LogicalPlan::Bool { must, should, must_not } => {
                if must_not.iter().any(|p| self.explain(p, doc_id).is_some()) {
                    return None;
                }

                let mut details = Vec::new();
                for plan in must {
                    details.push(self.explain(plan, doc_id)?);
                }
                let should_matches: Vec<ScoreExplanation> = should
                    .iter()
                    .filter_map(|p| self.explain(p, doc_id))
                    .collect();
                if must.is_empty() && should_matches.is_empty() {
                    return None;
                }
                details.extend(should_matches);

                let value = details.iter().map(|d| d.value).sum();
                Some(ScoreExplanation::new(value, "sum of matching clauses".to_string(), details))
            }
            LogicalPlan::Boost { input, boost } => {
                let inner = self.explain(input, doc_id)?;
                Some(ScoreExplanation::new(
                    inner.value * boost,
                    format!("boost {}", boost),
                    vec![inner],
                ))
            }
        }
    }

    fn explain_term(&self, field: &str, text: &str, doc_id: DocId) -> Option<ScoreExplanation> {
        let term = Term::new(field, text);
        let posting = self.index.search_term(&term)?.get(doc_id)?;
        let term_info = self.index.term_info(&term)?;
        let doc_stats = self.index.doc_stats(field, doc_id);
        let score = self.scorer.score(posting, &term_info, &doc_stats);

        Some(ScoreExplanation::new(
            score,
            format!(
                "weight({}:{}) [{}] tf={}, df={}, idf={:.4}, field_length={}",
                field,
                text,
                self.scorer.name(),
                posting.term_freq,
                term_info.doc_freq,
                term_info.idf,
                doc_stats.doc_length
            ),
            Vec::new(),
        ))
    }
}

fn union_all(parts: &[Matches]) -> RoaringBitmap {
    let mut docs = RoaringBitmap::new();
    for part in parts {
        docs |= &part.docs;
    }
    docs
}

fn intersect_all(parts: &[Matches]) -> RoaringBitmap {
    let mut iter = parts.iter();
    let Some(first) = iter.next() else {
        return RoaringBitmap::new();
    };
    let mut docs = first.docs.clone();
    for part in iter {
        docs &= &part.docs;
    }
    docs
}

fn sum_scores(candidates: RoaringBitmap, parts: &[Matches]) -> Matches {
    let mut result = Matches::default();
    for doc in candidates.iter() {
        let score = parts.iter().map(|part| part.score(doc)).sum();
        result.add(doc, score);
    }
    result
}
