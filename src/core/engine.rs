use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::IndexStats;
use crate::core::types::{DocId, IntoRecord, StoredDocument};
use crate::index::index_writer::{BuildReport, IndexBuilder};
use crate::mvcc::controller::{Generation, GenerationController};
use crate::query::ast::Query;
use crate::query::parser::QueryParser;
use crate::query::planner::{LogicalPlan, PlannerOptions, QueryPlanner};
use crate::query::validator::{QueryValidator, ValidationConfig};
use crate::schema::schema::Schema;
use crate::scoring::scorer::{scorer_for, Scorer};
use crate::search::executor::QueryExecutor;
use crate::search::results::{ScoreExplanation, SearchResults};
use crate::storage::file_lock::WriterLock;
use crate::storage::layout::StorageLayout;
use crate::storage::snapshot;

/// Search engine host: owns configuration, analysis and the published generation.
///
/// Builds are serialized and replace the whole index atomically. Searches run
/// against whichever generation was current when they started.
pub struct SearchEngine {
    config: Config,
    schema: Arc<Schema>,
    analyzer: Arc<Analyzer>,
    query_parser: QueryParser,
    validator: QueryValidator,
    planner_options: PlannerOptions,
    scorer: Box<dyn Scorer>,
    controller: GenerationController,
    storage: Option<StorageLayout>,
    writer_lock: Mutex<Option<WriterLock>>,
    closed: AtomicBool,
}

impl SearchEngine {
    /// Validate the schema and, with a storage path, lock it and reload the
    /// newest persisted generation
    pub fn open(schema: Schema, config: Config) -> Result<Self> {
        schema.validate()?;

        let schema = Arc::new(schema);
        let analyzer = Arc::new(Analyzer::from_config(&config.analyzer));
        let controller = GenerationController::new();

        let (storage, writer_lock) = match &config.storage_path {
            Some(path) => {
                let layout = StorageLayout::new(path.clone())?;
                let lock = WriterLock::acquire(&layout)?;

                if let Some(generation) = snapshot::load_latest(&layout)? {
                    if generation.schema != *schema {
                        warn!(
                            version = generation.version,
                            "persisted generation was built with a different schema"
                        );
                    }
                    controller.commit(generation);
                }
                (Some(layout), Some(lock))
            }
            None => (None, None),
        };

        info!(
            fields = schema.fields.len(),
            persistent = storage.is_some(),
            restored = controller.current().map(|g| g.version),
            "search engine opened"
        );

        Ok(SearchEngine {
            query_parser: QueryParser::from_config(schema.clone(), &config),
            validator: QueryValidator::new(ValidationConfig::from(&config)),
            planner_options: PlannerOptions::from(&config),
            scorer: scorer_for(config.similarity),
            schema,
            analyzer,
            controller,
            storage,
            writer_lock: Mutex::new(writer_lock),
            closed: AtomicBool::new(false),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn query_parser(&self) -> &QueryParser {
        &self.query_parser
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::new(ErrorKind::InvalidState, "search engine is closed".to_string()));
        }
        Ok(())
    }

    /// Build a complete new generation from `records` and publish it.
    /// On error the previously published generation stays current.
    pub fn build<I>(&self, records: I) -> Result<BuildReport>
    where
        I: IntoIterator,
        I::Item: IntoRecord + Send,
    {
        self.ensure_open()?;
        let _guard = self.controller.begin_write();
        // close() may have finished between the first check and the guard
        self.ensure_open()?;
        let start = Instant::now();

        let builder = IndexBuilder::new(self.schema.clone(), self.analyzer.clone(), &self.config);
        let output = builder.build(records)?;
        let report = output.report.clone();

        // A close() requested while records were analyzed wins over this build
        self.ensure_open()?;

        let generation = Generation::new(self.controller.next_version(), (*self.schema).clone(), output);
        if let Some(storage) = &self.storage {
            snapshot::save(storage, &generation)?;
        }

        let committed = self.controller.commit(generation);

        if let Some(storage) = &self.storage {
            if let Err(e) = snapshot::prune(storage, committed.version) {
                warn!(error = %e, "failed to prune old generations");
            }
        }

        info!(
            version = committed.version,
            indexed = report.indexed,
            skipped = report.skipped.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "build finished"
        );
        Ok(report)
    }

    /// Pin the current generation for a sequence of reads
    pub fn searcher(&self) -> Result<Searcher<'_>> {
        let generation = self.controller.require_current()?;
        Ok(Searcher { engine: self, generation })
    }

    pub fn search(&self, query: &Query, limit: usize) -> Result<SearchResults> {
        self.searcher()?.search(query, limit)
    }

    /// Parse a user query string over the default fields, then search
    pub fn search_str(&self, text: &str, limit: usize) -> Result<SearchResults> {
        self.searcher()?.search_str(text, limit)
    }

    /// Like `search_str`, with fuzzy matches of longer words on the fuzzy field
    pub fn smart_search(&self, text: &str, limit: usize) -> Result<SearchResults> {
        let query = self.query_parser.smart(text)?;
        self.search(&query, limit)
    }

    pub fn explain(&self, query: &Query, doc_id: DocId) -> Result<Option<ScoreExplanation>> {
        self.searcher()?.explain(query, doc_id)
    }

    pub fn document(&self, doc_id: DocId) -> Result<Option<StoredDocument>> {
        Ok(self.searcher()?.document(doc_id).cloned())
    }

    pub fn stats(&self) -> Result<IndexStats> {
        Ok(self.searcher()?.stats())
    }

    /// Unpublish the index and release the writer lock. Searchers already
    /// holding a generation keep working; new searches fail as not ready.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let _guard = self.controller.begin_write();
        let previous = self.controller.clear();
        self.writer_lock.lock().take();

        info!(version = previous.map(|g| g.version), "search engine closed");
    }
}

/// Read view over one generation; stays valid across later builds
pub struct Searcher<'e> {
    engine: &'e SearchEngine,
    generation: Arc<Generation>,
}

impl<'e> Searcher<'e> {
    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    pub fn version(&self) -> u64 {
        self.generation.version
    }

    /// Validate and resolve a query against this generation's dictionary
    pub fn plan(&self, query: &Query) -> Result<LogicalPlan> {
        self.engine.validator.validate(query)?;

        let planner = QueryPlanner::new(
            &self.generation.index,
            &self.generation.schema,
            &self.engine.analyzer,
            &self.engine.planner_options,
        );
        let plan = planner.plan(query)?;

        debug!(version = self.generation.version, terms = plan.term_count(), "query planned");
        Ok(plan)
    }

    pub fn search(&self, query: &Query, limit: usize) -> Result<SearchResults> {
        let start = Instant::now();
        let plan = self.plan(query)?;

        let executor = QueryExecutor::new(&self.generation.index, self.engine.scorer.as_ref());
        let mut results = executor.search(&plan, limit);

        for hit in &mut results.hits {
            hit.document = self.generation.document(hit.doc_id).cloned();
        }
        results.took_ms = start.elapsed().as_millis() as u64;

        debug!(
            version = self.generation.version,
            total_hits = results.total_hits,
            returned = results.hits.len(),
            "search finished"
        );
        Ok(results)
    }

    pub fn search_str(&self, text: &str, limit: usize) -> Result<SearchResults> {
        let query = self.engine.query_parser.parse(text)?;
        self.search(&query, limit)
    }

    pub fn explain(&self, query: &Query, doc_id: DocId) -> Result<Option<ScoreExplanation>> {
        let plan = self.plan(query)?;
        let executor = QueryExecutor::new(&self.generation.index, self.engine.scorer.as_ref());
        Ok(executor.explain(&plan, doc_id))
    }

    pub fn document(&self, doc_id: DocId) -> Option<&StoredDocument> {
        self.generation.document(doc_id)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats::from_generation(&self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Record;

    fn engine() -> SearchEngine {
        let schema = Schema::new().analyzed_field("name").exact_field("area");
        SearchEngine::open(schema, Config::default()).unwrap()
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("name", "Iguanodon").with("area", "Europe"),
            Record::new().with("name", "Giant Rex").with("area", "North America"),
        ]
    }

    #[test]
    fn test_not_ready_before_first_build() {
        let engine = engine();
        let err = engine.search(&Query::term("area", "Europe"), 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexNotReady);
        assert_eq!(engine.stats().unwrap_err().kind(), ErrorKind::IndexNotReady);
    }

    #[test]
    fn test_build_then_search_attaches_documents() {
        let engine = engine();
        let report = engine.build(records()).unwrap();
        assert_eq!(report.indexed, 2);

        let results = engine.search(&Query::parsed("name", "rex"), 10).unwrap();
        assert_eq!(results.doc_ids(), vec![DocId(1)]);
        assert_eq!(results.hits[0].field("area"), Some("North America"));
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let schema = Schema::new().analyzed_field("name").exact_field("name");
        assert!(SearchEngine::open(schema, Config::default()).is_err());
    }

    #[test]
    fn test_searcher_survives_rebuild() {
        let engine = engine();
        engine.build(records()).unwrap();
        let searcher = engine.searcher().unwrap();

        engine.build(vec![Record::new().with("name", "Stegosaurus")]).unwrap();

        assert_eq!(searcher.generation().doc_count(), 2);
        assert_eq!(engine.searcher().unwrap().generation().doc_count(), 1);
        assert!(engine.searcher().unwrap().version() > searcher.version());
    }

    #[test]
    fn test_close_unpublishes() {
        let engine = engine();
        engine.build(records()).unwrap();
        let searcher = engine.searcher().unwrap();

        engine.close();
        assert_eq!(engine.search_str("rex", 10).unwrap_err().kind(), ErrorKind::IndexNotReady);
        assert_eq!(engine.build(records()).unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(searcher.search_str("rex", 10).unwrap().total_hits, 1);
    }

    #[test]
    fn test_explain_through_engine() {
        let engine = engine();
        engine.build(records()).unwrap();
        let explanation = engine.explain(&Query::term("area", "Europe"), DocId(0)).unwrap().unwrap();
        assert!(explanation.value > 0.0);
        assert!(engine.explain(&Query::term("area", "Europe"), DocId(1)).unwrap().is_none());
    }
}
