use serde::{Serialize, Deserialize};

/// Main query enum representing all query node types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Query {
    Term(TermQuery),             // Verbatim term, for exact fields
    Parsed(ParsedQuery),         // Analyzed text, for analyzed fields
    Wildcard(WildcardQuery),     // Glob over one field's dictionary
    Fuzzy(FuzzyQuery),           // Bounded edit distance over one field's dictionary
    Bool(BoolQuery),             // Boolean combinations
    MultiField(MultiFieldQuery), // Parsed text over several boosted fields
    Boost(BoostQuery),           // Scales the score of its inner query
}

/// Single verbatim term query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermQuery {
    pub field: String,
    pub value: String,
}

/// Free text run through the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub field: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildcardQuery {
    pub field: String,
    pub pattern: String, // Pattern with wildcards (* and ?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyQuery {
    pub field: String,
    pub value: String,
    pub max_edits: u8,      // Damerau-Levenshtein distance
}

/// Boolean clause requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolClause {
    pub query: Query,
    pub occur: Occur,
}

/// Boolean query; clause order is preserved
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoolQuery {
    pub clauses: Vec<BoolClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBoost {
    pub field: String,
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiFieldQuery {
    pub fields: Vec<FieldBoost>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostQuery {
    pub query: Box<Query>,
    pub boost: f32,
}

impl Query {
    pub fn term(field: &str, value: &str) -> Self {
        Query::Term(TermQuery {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    pub fn parsed(field: &str, text: &str) -> Self {
        Query::Parsed(ParsedQuery {
            field: field.to_string(),
            text: text.to_string(),
        })
    }

    pub fn wildcard(field: &str, pattern: &str) -> Self {
        Query::Wildcard(WildcardQuery {
            field: field.to_string(),
            pattern: pattern.to_string(),
        })
    }

    pub fn fuzzy(field: &str, value: &str, max_edits: u8) -> Self {
        Query::Fuzzy(FuzzyQuery {
            field: field.to_string(),
            value: value.to_string(),
            max_edits,
        })
    }

    pub fn multi_field(fields: &[(&str, f32)], text: &str) -> Self {
        Query::MultiField(MultiFieldQuery {
            fields: fields
                .iter()
                .map(|(field, boost)| FieldBoost { field: field.to_string(), boost: *boost })
                .collect(),
            text: text.to_string(),
        })
    }

    pub fn boost(self, boost: f32) -> Self {
        Query::Boost(BoostQuery {
            query: Box::new(self),
            boost,
        })
    }

    /// Nesting depth, leaves count as 1
    pub fn depth(&self) -> usize {
        match self {
            Query::Bool(bool_query) => {
                1 + bool_query.clauses.iter().map(|c| c.query.depth()).max().unwrap_or(0)
            }
            Query::Boost(boost_query) => 1 + boost_query.query.depth(),
            _ => 1,
        }
    }
}

impl BoolQuery {
    pub fn new() -> Self {
        BoolQuery {
            clauses: Vec::new(),
        }
    }

    pub fn add(mut self, query: Query, occur: Occur) -> Self {
        self.clauses.push(BoolClause { query, occur });
        self
    }

    pub fn with_must(self, query: Query) -> Self {
        self.add(query, Occur::Must)
    }

    pub fn with_should(self, query: Query) -> Self {
        self.add(query, Occur::Should)
    }

    pub fn with_must_not(self, query: Query) -> Self {
        self.add(query, Occur::MustNot)
    }

    pub fn build(self) -> Query {
        Query::Bool(self)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self, occur: Occur) -> impl Iterator<Item = &Query> {
        self.clauses
            .iter()
            .filter(move |c| c.occur == occur)
            .map(|c| &c.query)
    }
}
