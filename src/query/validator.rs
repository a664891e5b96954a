use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::query::ast::Query;
use crate::search::wildcard::WildcardPattern;

/// Query validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub max_bool_clauses: usize,
    pub max_query_depth: usize,
    pub max_edit_distance: u8,
    pub allow_leading_wildcard: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig::from(&Config::default())
    }
}

impl From<&Config> for ValidationConfig {
    fn from(config: &Config) -> Self {
        ValidationConfig {
            max_bool_clauses: config.max_bool_clauses,
            max_query_depth: config.max_query_depth,
            max_edit_distance: config.max_edit_distance,
            allow_leading_wildcard: config.allow_leading_wildcard,
        }
    }
}

/// Structural checks run before planning; failures are syntax errors
pub struct QueryValidator {
    config: ValidationConfig,
}

impl QueryValidator {
    pub fn new(config: ValidationConfig) -> Self {
        QueryValidator { config }
    }

    /// Validate query structure and constraints
    pub fn validate(&self, query: &Query) -> Result<()> {
        let depth = query.depth();
        if depth > self.config.max_query_depth {
            return Err(Error::query_syntax(format!(
                "query depth {} exceeds maximum {}",
                depth, self.config.max_query_depth
            )));
        }
        self.validate_node(query)
    }

    fn validate_node(&self, query: &Query) -> Result<()> {
        match query {
            Query::Bool(bool_query) => {
                if bool_query.clauses.len() > self.config.max_bool_clauses {
                    return Err(Error::query_syntax(format!(
                        "boolean query has {} clauses, max is {}",
                        bool_query.clauses.len(),
                        self.config.max_bool_clauses
                    )));
                }
                for clause in &bool_query.clauses {
                    self.validate_node(&clause.query)?;
                }
            }
            Query::Wildcard(wildcard) => {
                let pattern = WildcardPattern::new(&wildcard.pattern)?;
                if pattern.has_leading_wildcard() && !self.config.allow_leading_wildcard {
                    return Err(Error::query_syntax(format!(
                        "leading wildcard in '{}' is not allowed",
                        wildcard.pattern
                    )));
                }
            }
            Query::Fuzzy(fuzzy) => {
                if fuzzy.max_edits > self.config.max_edit_distance {
                    return Err(Error::query_syntax(format!(
                        "edit distance {} exceeds maximum {}",
                        fuzzy.max_edits, self.config.max_edit_distance
                    )));
                }
            }
            Query::MultiField(multi) => {
                if multi.fields.is_empty() {
                    return Err(Error::query_syntax("multi-field query without fields"));
                }
                for field in &multi.fields {
                    check_boost(field.boost)?;
                }
            }
            Query::Boost(boost_query) => {
                check_boost(boost_query.boost)?;
                self.validate_node(&boost_query.query)?;
            }
            Query::Term(_) | Query::Parsed(_) => {}
        }
        Ok(())
    }
}

fn check_boost(boost: f32) -> Result<()> {
    if boost.is_finite() && boost >= 0.0 {
        Ok(())
    } else {
        Err(Error::query_syntax(format!("invalid boost {}", boost)))
    }
}
