pub mod core;
pub mod storage;
pub mod analysis;
pub mod schema;
pub mod index;
pub mod scoring;
pub mod search;
pub mod query;
pub mod mvcc;

pub use crate::core::config::Config;
pub use crate::core::engine::{SearchEngine, Searcher};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{DocId, Record, StoredDocument};
pub use crate::query::ast::{BoolQuery, Occur, Query};
pub use crate::schema::schema::{FieldPolicy, Schema};
pub use crate::search::results::{ScoredDocument, SearchResults};

/*
┌──────────────────────────────────────────────────────────────────────────────────┐
│                            FOSSILDEX STRUCT ARCHITECTURE                         │
└──────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── CORE LAYER ──────────────────────────────────┐
│                                                                                  │
│  ┌────────────────────────────────────────────────────────────────────────────┐  │
│  │                           struct SearchEngine                              │  │
│  │  config: Config                    // Policies, limits, storage path       │  │
│  │  schema: Arc<Schema>               // Field → Exact | Analyzed             │  │
│  │  analyzer: Arc<Analyzer>           // Shared by builder and planner        │  │
│  │  query_parser: QueryParser         // User strings → Query                 │  │
│  │  validator: QueryValidator         // Depth, clauses, wildcard, fuzzy      │  │
│  │  scorer: Box<dyn Scorer>           // TF-IDF or BM25                       │  │
│  │  controller: GenerationController  // Atomic Arc<Generation> swap          │  │
│  │  storage: Option<StorageLayout>    // Persisted generations                │  │
│  │  writer_lock: Mutex<Option<WriterLock>>                                    │  │
│  └────────────────────────────────────────────────────────────────────────────┘  │
│                                                                                  │
│  ┌──────────────────┐  ┌───────────────────────┐  ┌───────────────────────────┐  │
│  │ struct Record    │  │ struct StoredDocument │  │ struct IndexStats         │  │
│  │ • fields: Vec<   │  │ • id: DocId           │  │ • generation, doc_count   │  │
│  │   (name, value)> │  │ • fields: Vec<(..)>   │  │ • term_count, fields      │  │
│  └──────────────────┘  └───────────────────────┘  └───────────────────────────┘  │
└──────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────── INDEXING LAYER ────────────────────────────────┐
│                                                                                  │
│  IndexBuilder ──(rayon analysis, ordered doc ids)──► BuildOutput                 │
│                                                      • index: InvertedIndex      │
│  InvertedIndex                                       • store: DocumentStore      │
│  • fields: BTreeMap<String, FieldIndex>              • report: BuildReport       │
│                                                                                  │
│  FieldIndex                                                                      │
│  • terms: BTreeMap<String, PostingList>  // Posting { doc_id, term_freq }        │
│  • doc_lengths, doc_count, total_tokens  // Scoring statistics                   │
│  • prefix_index: PrefixIndex             // fst::Map for wildcard / fuzzy        │
└──────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────── QUERY LAYER ──────────────────────────────────┐
│                                                                                  │
│  &str ──QueryParser──► Query ──QueryValidator──► Query                           │
│                                                                                  │
│  enum Query                        QueryPlanner ──► enum LogicalPlan             │
│  • Term / Parsed                   • analyze text    • Empty                     │
│  • Wildcard / Fuzzy                • expand terms    • TermSet                   │
│  • Bool (Must/Should/MustNot)      • cap expansions  • Bool                      │
│  • MultiField / Boost                                • Boost                     │
│                                                                                  │
│  QueryExecutor: RoaringBitmap matches + Scorer ──► TopKCollector ──► Results     │
└──────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────── STORAGE LAYER ──────────────────────────────────┐
│                                                                                  │
│  base_dir/                                                                       │
│  ├── .lock                    // WriterLock (flock)                              │
│  └── generations/                                                                │
│      └── gen_00000007.fdx     // header (magic, version, crc32) + lz4(bincode)   │
└──────────────────────────────────────────────────────────────────────────────────┘
*/
