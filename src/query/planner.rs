use tracing::debug;
use crate::analysis::analyzer::Analyzer;
use crate::core::config::{BooleanOperator, Config};
use crate::core::error::{Error, Result};
use crate::index::inverted::InvertedIndex;
use crate::query::ast::{FuzzyQuery, MultiFieldQuery, Occur, ParsedQuery, Query, WildcardQuery};
use crate::schema::schema::{FieldPolicy, Schema};
use crate::search::fuzzy::FuzzyAutomaton;
use crate::search::wildcard::WildcardPattern;

/// Logical execution plan: every leaf is resolved to concrete dictionary terms
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    /// Matches nothing
    Empty,
    /// Scored postings of `terms` in `field`; `require_all` intersects them
    TermSet { field: String, terms: Vec<String>, require_all: bool },
    Bool { must: Vec<LogicalPlan>, should: Vec<LogicalPlan>, must_not: Vec<LogicalPlan> },
    Boost { input: Box<LogicalPlan>, boost: f32 },
}

impl LogicalPlan {
    /// Number of dictionary terms the plan touches
    pub fn term_count(&self) -> usize {
        match self {
            LogicalPlan::Empty => 0,
            LogicalPlan::TermSet { terms, .. } => terms.len(),
            LogicalPlan::Bool { must, should, must_not } => must
                .iter()
                .chain(should)
                .chain(must_not)
                .map(|p| p.term_count())
                .sum(),
            LogicalPlan::Boost { input, .. } => input.term_count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannerOptions {
    pub default_operator: BooleanOperator,
    pub allow_leading_wildcard: bool,
    pub max_expansions: usize,
    pub max_edit_distance: u8,
    pub fuzzy_prefix_length: u8,
    pub require_non_empty_query: bool,
}

impl From<&Config> for PlannerOptions {
    fn from(config: &Config) -> Self {
        PlannerOptions {
            default_operator: config.default_operator,
            allow_leading_wildcard: config.allow_leading_wildcard,
            max_expansions: config.max_expansions,
            max_edit_distance: config.max_edit_distance,
            fuzzy_prefix_length: config.fuzzy_prefix_length,
            require_non_empty_query: config.require_non_empty_query,
        }
    }
}

/// Query planner: resolves a query tree against one generation's dictionary
pub struct QueryPlanner<'a> {
    pub index: &'a InvertedIndex,
    pub schema: &'a Schema,
    pub analyzer: &'a Analyzer,
    pub options: &'a PlannerOptions,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(
        index: &'a InvertedIndex,
        schema: &'a Schema,
        analyzer: &'a Analyzer,
        options: &'a PlannerOptions,
    ) -> Self {
        QueryPlanner { index, schema, analyzer, options }
    }

    /// Create execution plan from query
    pub fn plan(&self, query: &Query) -> Result<LogicalPlan> {
        let plan = match query {
            Query::Term(term_query) => {
                if term_query.value.is_empty() {
                    LogicalPlan::Empty
                } else {
                    LogicalPlan::TermSet {
                        field: term_query.field.clone(),
                        terms: vec![term_query.value.clone()],
                        require_all: false,
                    }
                }
            }
            Query::Parsed(parsed) => self.plan_parsed(parsed)?,
            Query::Wildcard(wildcard) => self.plan_wildcard(wildcard)?,
            Query::Fuzzy(fuzzy) => self.plan_fuzzy(fuzzy)?,
            Query::MultiField(multi) => self.plan_multi_field(multi)?,
            Query::Boost(boost_query) => LogicalPlan::Boost {
                input: Box::new(self.plan(&boost_query.query)?),
                boost: boost_query.boost,
            },
            Query::Bool(bool_query) => {
                let mut must = Vec::new();
                let mut should = Vec::new();
                let mut must_not = Vec::new();

                for clause in &bool_query.clauses {
                    let plan = self.plan(&clause.query)?;
                    match clause.occur {
                        Occur::Must => must.push(plan),
                        Occur::Should => should.push(plan),
                        Occur::MustNot => must_not.push(plan),
                    }
                }

                LogicalPlan::Bool { must, should, must_not }
            }
        };

        Ok(plan)
    }

    fn is_exact(&self, field: &str) -> bool {
        self.schema.policy(field) == Some(FieldPolicy::Exact)
    }

    fn plan_parsed(&self, parsed: &ParsedQuery) -> Result<LogicalPlan> {
        let text = parsed.text.trim();
        if text.is_empty() {
            return Ok(LogicalPlan::Empty);
        }

        // Exact fields hold one verbatim term per value
        if self.is_exact(&parsed.field) {
            return Ok(LogicalPlan::TermSet {
                field: parsed.field.clone(),
                terms: vec![text.to_string()],
                require_all: false,
            });
        }

        let mut terms: Vec<String> = Vec::new();
        for token in self.analyzer.tokenize(text) {
            if !terms.contains(&token) {
                terms.push(token);
            }
        }

        if terms.is_empty() {
            if self.options.require_non_empty_query {
                return Err(Error::query_syntax(format!(
                    "'{}' yields no searchable terms for field '{}'",
                    text, parsed.field
                )));
            }
            return Ok(LogicalPlan::Empty);
        }

        Ok(LogicalPlan::TermSet {
            field: parsed.field.clone(),
            terms,
            require_all: self.options.default_operator == BooleanOperator::And,
        })
    }

    fn plan_wildcard(&self, wildcard: &WildcardQuery) -> Result<LogicalPlan> {
        if wildcard.pattern.is_empty() {
            return Ok(LogicalPlan::Empty);
        }

        let pattern = if self.is_exact(&wildcard.field) {
            WildcardPattern::new(&wildcard.pattern)?
        } else {
            WildcardPattern::new(&wildcard.pattern.to_lowercase())?
        };

        if pattern.has_leading_wildcard() && !self.options.allow_leading_wildcard {
            return Err(Error::query_syntax(format!(
                "leading wildcard in '{}' is not allowed",
                wildcard.pattern
            )));
        }

        let mut terms = self.index.wildcard_search(&wildcard.field, &pattern);
        self.cap_expansions(&mut terms, &wildcard.field);

        Ok(Self::term_set(&wildcard.field, terms))
    }

    fn plan_fuzzy(&self, fuzzy: &FuzzyQuery) -> Result<LogicalPlan> {
        if fuzzy.value.is_empty() {
            return Ok(LogicalPlan::Empty);
        }
        if fuzzy.max_edits > self.options.max_edit_distance {
            return Err(Error::query_syntax(format!(
                "edit distance {} exceeds maximum {}",
                fuzzy.max_edits, self.options.max_edit_distance
            )));
        }

        let value = if self.is_exact(&fuzzy.field) {
            fuzzy.value.clone()
        } else {
            fuzzy.value.to_lowercase()
        };

        let automaton = FuzzyAutomaton::new(&value, fuzzy.max_edits);
        let mut matches = self.index.fuzzy_search(&fuzzy.field, &automaton, self.options.fuzzy_prefix_length);

        // Closest terms survive the expansion cap
        matches.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        let mut terms: Vec<String> = matches.into_iter().map(|(term, _)| term).collect();
        self.cap_expansions(&mut terms, &fuzzy.field);

        Ok(Self::term_set(&fuzzy.field, terms))
    }

    fn plan_multi_field(&self, multi: &MultiFieldQuery) -> Result<LogicalPlan> {
        if multi.text.trim().is_empty() {
            return Ok(LogicalPlan::Empty);
        }

        let mut should = Vec::with_capacity(multi.fields.len());
        for field in &multi.fields {
            let parsed = ParsedQuery {
                field: field.field.clone(),
                text: multi.text.clone(),
            };
            should.push(LogicalPlan::Boost {
                input: Box::new(self.plan_parsed(&parsed)?),
                boost: field.boost,
            });
        }

        Ok(LogicalPlan::Bool {
            must: Vec::new(),
            should,
            must_not: Vec::new(),
        })
    }

    fn cap_expansions(&self, terms: &mut Vec<String>, field: &str) {
        if terms.len() > self.options.max_expansions {
            debug!(
                field,
                matched = terms.len(),
                kept = self.options.max_expansions,
                "term expansion truncated"
            );
            terms.truncate(self.options.max_expansions);
        }
    }

    fn term_set(field: &str, terms: Vec<String>) -> LogicalPlan {
        if terms.is_empty() {
            LogicalPlan::Empty
        } else {
            LogicalPlan::TermSet {
                field: field.to_string(),
                terms,
                require_all: false,
            }
        }
    }
}
