use std::collections::BTreeMap;
use std::sync::Arc;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use tracing::{info, warn};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::{Config, IngestionPolicy, UnknownFieldPolicy};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, IntoRecord, Record, StoredDocument};
use crate::index::inverted::InvertedIndex;
use crate::index::store::DocumentStore;
use crate::schema::schema::{FieldPolicy, Schema};

/// A record that did not make it into the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub position: usize,   // Position in the input sequence
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub indexed: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Everything one build pass produces
#[derive(Debug)]
pub struct BuildOutput {
    pub index: InvertedIndex,
    pub store: DocumentStore,
    pub report: BuildReport,
}

/// Terms of one field value, ready for the inverted index
struct AnalyzedField {
    name: String,
    terms: Vec<(String, u32)>,   // Distinct terms with their frequency
    token_count: u32,
}

struct AnalyzedRecord {
    stored: Vec<(String, String)>,
    fields: Vec<AnalyzedField>,
}

/// Builds one complete generation from a record sequence
pub struct IndexBuilder {
    pub schema: Arc<Schema>,
    pub analyzer: Arc<Analyzer>,
    pub ingestion_policy: IngestionPolicy,
    pub unknown_fields: UnknownFieldPolicy,
    pub threads: Option<usize>,
}

impl IndexBuilder {
    pub fn new(schema: Arc<Schema>, analyzer: Arc<Analyzer>, config: &Config) -> Self {
        IndexBuilder {
            schema,
            analyzer,
            ingestion_policy: config.ingestion_policy,
            unknown_fields: config.unknown_fields,
            threads: config.build_threads,
        }
    }

    /// Analyze records in parallel, then assign doc ids in input order
    pub fn build<I>(&self, records: I) -> Result<BuildOutput>
    where
        I: IntoIterator,
        I::Item: IntoRecord + Send,
    {
        self.schema.validate()?;

        let raw: Vec<I::Item> = records.into_iter().collect();
        let total = raw.len();

        let analyze_all = || -> Vec<Result<AnalyzedRecord>> {
            raw.into_par_iter()
                .map(|item| item.into_record().and_then(|record| self.analyze_record(record)))
                .collect()
        };

        let analyzed = match self.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| Error::new(ErrorKind::Internal, format!("thread pool: {}", e)))?;
                pool.install(analyze_all)
            }
            None => analyze_all(),
        };

        let mut index = InvertedIndex::new();
        let mut store = DocumentStore::new();
        let mut report = BuildReport::default();

        for (position, result) in analyzed.into_iter().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) => match self.ingestion_policy {
                    IngestionPolicy::Skip => {
                        warn!(record = position, error = %err, "skipping malformed record");
                        report.skipped.push(SkippedRecord {
                            position,
                            reason: err.context,
                        });
                        continue;
                    }
                    IngestionPolicy::Abort => {
                        return Err(Error::ingestion(format!("record #{}: {}", position, err.context)));
                    }
                },
            };

            if store.len() >= u32::MAX as usize {
                return Err(Error::new(ErrorKind::InvalidInput, "too many documents".to_string()));
            }
            let doc_id = DocId(store.len() as u32);

            for field in &record.fields {
                index.add_field(&field.name, doc_id, &field.terms, field.token_count);
            }
            store.push(StoredDocument {
                id: doc_id,
                fields: record.stored,
            });
            report.indexed += 1;
        }

        index.finish(store.len())?;

        info!(
            records = total,
            indexed = report.indexed,
            skipped = report.skipped.len(),
            terms = index.term_count(),
            "index build finished"
        );

        Ok(BuildOutput { index, store, report })
    }

    fn analyze_record(&self, record: Record) -> Result<AnalyzedRecord> {
        let mut stored = Vec::new();
        let mut fields = Vec::new();

        for (name, value) in record.fields {
            let Some(policy) = self.schema.policy(&name) else {
                match self.unknown_fields {
                    UnknownFieldPolicy::Ignore => continue,
                    UnknownFieldPolicy::Reject => {
                        return Err(Error::ingestion(format!("field '{}' is not in the schema", name)));
                    }
                }
            };

            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            let analyzed = match policy {
                FieldPolicy::Exact => AnalyzedField {
                    name: name.clone(),
                    terms: vec![(value.to_string(), 1)],
                    token_count: 1,
                },
                FieldPolicy::Analyzed => {
                    let tokens = self.analyzer.tokenize(value);
                    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
                    for token in &tokens {
                        *counts.entry(token.clone()).or_insert(0) += 1;
                    }
                    AnalyzedField {
                        name: name.clone(),
                        terms: counts.into_iter().collect(),
                        token_count: tokens.len() as u32,
                    }
                }
            };

            fields.push(analyzed);
            stored.push((name, value.to_string()));
        }

        Ok(AnalyzedRecord { stored, fields })
    }
}
