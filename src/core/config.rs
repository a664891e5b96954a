use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use crate::core::error::Result;

/// What the builder does with a record it cannot ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestionPolicy {
    Skip,   // Log the record and keep building
    Abort,  // Fail the whole build
}

/// What the builder does with record fields missing from the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownFieldPolicy {
    Ignore,
    Reject,
}

/// How the tokens of one analyzed clause combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Similarity {
    /// tf * idf, no length normalization
    TfIdf,
    /// Saturating tf with per-field length normalization
    Bm25 { k1: f32, b: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub stop_words: Vec<String>,
    pub max_token_length: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            stop_words: Vec::new(),
            max_token_length: 255,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Ingestion
    pub ingestion_policy: IngestionPolicy,
    pub unknown_fields: UnknownFieldPolicy,
    pub build_threads: Option<usize>,
    pub analyzer: AnalyzerConfig,

    // Query evaluation
    pub default_operator: BooleanOperator,
    pub allow_leading_wildcard: bool,
    pub max_expansions: usize,          // Terms a wildcard/fuzzy node may expand to
    pub max_edit_distance: u8,
    pub fuzzy_prefix_length: u8,
    pub require_non_empty_query: bool,
    pub similarity: Similarity,
    pub max_query_depth: usize,
    pub max_bool_clauses: usize,

    // Query string parsing; empty means every analyzed field at boost 1.0
    pub default_fields: Vec<(String, f32)>,
    pub fuzzy_field: Option<String>,

    // Persistence; None keeps generations in memory only
    pub storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ingestion_policy: IngestionPolicy::Skip,
            unknown_fields: UnknownFieldPolicy::Ignore,
            build_threads: None,
            analyzer: AnalyzerConfig::default(),

            default_operator: BooleanOperator::Or,
            allow_leading_wildcard: true,
            max_expansions: 1024,
            max_edit_distance: 2,
            fuzzy_prefix_length: 0,
            require_non_empty_query: false,
            similarity: Similarity::TfIdf,
            max_query_depth: 16,
            max_bool_clauses: 1024,

            default_fields: Vec::new(),
            fuzzy_field: None,

            storage_path: None,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(
            r#"{ "ingestion_policy": "Abort", "similarity": { "Bm25": { "k1": 1.2, "b": 0.75 } } }"#,
        )
        .unwrap();

        assert_eq!(config.ingestion_policy, IngestionPolicy::Abort);
        assert_eq!(config.similarity, Similarity::Bm25 { k1: 1.2, b: 0.75 });
        assert_eq!(config.default_operator, BooleanOperator::Or);
        assert!(config.allow_leading_wildcard);
        assert_eq!(config.max_edit_distance, 2);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = Config::from_json("{ not json").unwrap_err();
        assert_eq!(err.kind(), crate::core::error::ErrorKind::Parse);
    }
}
