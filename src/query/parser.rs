use std::sync::Arc;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{map, opt, value},
    sequence::{delimited, terminated},
};
use crate::core::config::{BooleanOperator, Config};
use crate::core::error::{Error, Result};
use crate::query::ast::{BoolQuery, FieldBoost, MultiFieldQuery, Occur, Query};
use crate::schema::schema::{FieldPolicy, Schema};

/// Lexical unit of a query string
#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Plus,
    Minus,
    And,
    Or,
    Not,
    Clause(Clause),
}

/// `field:value~N`, every part but the value optional
#[derive(Debug, Clone, PartialEq)]
struct Clause {
    field: Option<String>,
    text: String,
    quoted: bool,
    fuzzy: Option<Option<u8>>, // `~` alone keeps the default distance
}

impl Clause {
    fn has_wildcards(&self) -> bool {
        !self.quoted && self.text.contains(['*', '?'])
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ':' | '~')
}

fn quoted_text(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c: char| c != '"'), char('"')).parse(input)
}

fn field_name(input: &str) -> IResult<&str, &str> {
    terminated(take_while1(is_word_char), char(':')).parse(input)
}

fn fuzzy_suffix(input: &str) -> IResult<&str, Option<u8>> {
    map((char('~'), opt(digit1)), |(_, digits): (char, Option<&str>)| {
        // Out-of-range distances are rejected later by validation
        digits.map(|d| d.parse::<u8>().unwrap_or(u8::MAX))
    })
    .parse(input)
}

fn clause(input: &str) -> IResult<&str, Clause> {
    let (input, field) = opt(field_name).parse(input)?;
    let (input, (text, quoted)) = alt((
        map(quoted_text, |s: &str| (s, true)),
        map(take_while1(is_word_char), |s: &str| (s, false)),
    ))
    .parse(input)?;
    let (input, fuzzy) = opt(fuzzy_suffix).parse(input)?;

    Ok((
        input,
        Clause {
            field: field.map(str::to_string),
            text: text.to_string(),
            quoted,
            fuzzy,
        },
    ))
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::Plus, char('+')),
        value(Token::Minus, char('-')),
        map(clause, |clause| {
            if clause.field.is_none() && !clause.quoted && clause.fuzzy.is_none() {
                match clause.text.as_str() {
                    "AND" | "&&" => return Token::And,
                    "OR" | "||" => return Token::Or,
                    "NOT" => return Token::Not,
                    _ => {}
                }
            }
            Token::Clause(clause)
        }),
    ))
    .parse(input)
}

fn lex(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let offset = input.len() - rest.len();
        let (next, token) = token(rest).map_err(|_| {
            Error::query_syntax(format!("unexpected input at offset {}: '{}'", offset, rest))
        })?;

        // A clause has to end at whitespace, a closing paren or the end of input
        if matches!(token, Token::Clause(_)) && next.starts_with(|c: char| !c.is_whitespace() && c != ')') {
            return Err(Error::query_syntax(format!(
                "malformed term '{}' at offset {}",
                &rest[..rest.len() - next.len()],
                offset
            )));
        }

        tokens.push(token);
        rest = next.trim_start();
    }

    Ok(tokens)
}

/// Turns user query strings into query trees over a set of boosted default fields.
///
/// Supported syntax:
/// - `giant lizard` bare words, searched in every default field
/// - `area:Europe` clause scoped to one field
/// - `tri*`, `?ex` wildcards; `rex~`, `rex~1` fuzzy terms
/// - `+must`, `-excluded`, `AND`, `OR`, `NOT`, `( ... )` grouping
/// - `"quoted text"` keeps spaces and disables wildcards
pub struct QueryParser {
    schema: Arc<Schema>,
    pub default_fields: Vec<FieldBoost>,
    pub default_operator: BooleanOperator,
    pub fuzzy_field: Option<String>,
    pub fuzzy_distance: u8,
    pub max_depth: usize,
}

impl QueryParser {
    pub fn new(schema: Arc<Schema>, default_fields: &[(&str, f32)]) -> Self {
        QueryParser {
            schema,
            default_fields: default_fields
                .iter()
                .map(|(field, boost)| FieldBoost { field: field.to_string(), boost: *boost })
                .collect(),
            default_operator: BooleanOperator::Or,
            fuzzy_field: None,
            fuzzy_distance: 2,
            max_depth: 16,
        }
    }

    /// Default fields come from the config, or every analyzed field at boost 1
    pub fn from_config(schema: Arc<Schema>, config: &Config) -> Self {
        let default_fields: Vec<FieldBoost> = if config.default_fields.is_empty() {
            schema
                .analyzed_fields()
                .map(|field| FieldBoost { field: field.to_string(), boost: 1.0 })
                .collect()
        } else {
            config
                .default_fields
                .iter()
                .map(|(field, boost)| FieldBoost { field: field.clone(), boost: *boost })
                .collect()
        };

        QueryParser {
            schema,
            default_fields,
            default_operator: config.default_operator,
            fuzzy_field: config.fuzzy_field.clone(),
            fuzzy_distance: config.max_edit_distance,
            max_depth: config.max_query_depth,
        }
    }

    pub fn with_operator(mut self, operator: BooleanOperator) -> Self {
        self.default_operator = operator;
        self
    }

    pub fn with_fuzzy_field(mut self, field: &str, distance: u8) -> Self {
        self.fuzzy_field = Some(field.to_string());
        self.fuzzy_distance = distance;
        self
    }

    pub fn parse(&self, input: &str) -> Result<Query> {
        let tokens = lex(input)?;
        let mut state = ParseState { parser: self, tokens: &tokens, pos: 0 };
        let query = state.parse_group(0)?;

        if state.pos < tokens.len() {
            return Err(Error::query_syntax("unbalanced ')'"));
        }
        Ok(query)
    }

    /// Parse, then OR in a fuzzy match on the fuzzy field for every
    /// positive bare word longer than three characters
    pub fn smart(&self, input: &str) -> Result<Query> {
        let parsed = self.parse(input)?;
        let Some(fuzzy_field) = &self.fuzzy_field else {
            return Ok(parsed);
        };

        let tokens = lex(input)?;
        let mut fuzzy_terms: Vec<String> = Vec::new();
        // One entry per open group: whether it sits under a negation
        let mut groups: Vec<bool> = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            let negated = groups.last().copied().unwrap_or(false)
                || (i > 0 && matches!(tokens[i - 1], Token::Minus | Token::Not));
            let clause = match token {
                Token::LParen => {
                    groups.push(negated);
                    continue;
                }
                Token::RParen => {
                    groups.pop();
                    continue;
                }
                Token::Clause(clause) => clause,
                _ => continue,
            };
            if negated || clause.field.is_some() || clause.fuzzy.is_some() || clause.has_wildcards() {
                continue;
            }
            for word in clause.text.split_whitespace() {
                let word = word.to_lowercase();
                if word.chars().count() > 3 && !fuzzy_terms.contains(&word) {
                    fuzzy_terms.push(word);
                }
            }
        }

        if fuzzy_terms.is_empty() {
            return Ok(parsed);
        }

        let mut bool_query = BoolQuery::new().with_should(parsed);
        for word in &fuzzy_terms {
            bool_query = bool_query.with_should(Query::fuzzy(fuzzy_field, word, self.fuzzy_distance));
        }
        Ok(bool_query.build())
    }

    fn is_analyzed(&self, field: &str) -> bool {
        self.schema.policy(field) != Some(FieldPolicy::Exact)
    }

    fn clause_query(&self, clause: &Clause) -> Result<Query> {
        if let Some(field) = &clause.field {
            return Ok(self.field_query(field, clause));
        }

        if self.default_fields.is_empty() {
            return Err(Error::query_syntax(format!(
                "'{}' has no field and no default fields are configured",
                clause.text
            )));
        }

        if clause.fuzzy.is_none() && !clause.has_wildcards() {
            return Ok(Query::MultiField(MultiFieldQuery {
                fields: self.default_fields.clone(),
                text: clause.text.clone(),
            }));
        }

        let mut per_field: Vec<Query> = self
            .default_fields
            .iter()
            .map(|fb| {
                let query = self.field_query(&fb.field, clause);
                if fb.boost == 1.0 { query } else { query.boost(fb.boost) }
            })
            .collect();

        if per_field.len() == 1 {
            return Ok(per_field.remove(0));
        }
        Ok(per_field
            .into_iter()
            .fold(BoolQuery::new(), |acc, q| acc.with_should(q))
            .build())
    }

    fn field_query(&self, field: &str, clause: &Clause) -> Query {
        let analyzed = self.is_analyzed(field);
        let normalize = |text: &str| if analyzed { text.to_lowercase() } else { text.to_string() };

        if let Some(distance) = clause.fuzzy {
            return Query::fuzzy(field, &normalize(&clause.text), distance.unwrap_or(self.fuzzy_distance));
        }
        if clause.has_wildcards() {
            return Query::wildcard(field, &normalize(&clause.text));
        }
        if analyzed {
            Query::parsed(field, &clause.text)
        } else {
            Query::term(field, clause.text.trim())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Conjunction {
    And,
    Or,
}

struct Item {
    query: Query,
    occur: Occur,
    explicit: bool, // occur fixed by a +, - or NOT prefix
}

struct ParseState<'a> {
    parser: &'a QueryParser,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> ParseState<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    /// Clauses up to the matching `)` or the end of input
    fn parse_group(&mut self, depth: usize) -> Result<Query> {
        if depth >= self.parser.max_depth {
            return Err(Error::query_syntax(format!(
                "parentheses nested deeper than {}",
                self.parser.max_depth
            )));
        }

        let mut items: Vec<Item> = Vec::new();
        let mut conjunction: Option<Conjunction> = None;

        loop {
            match self.peek() {
                None | Some(Token::RParen) => break,
                Some(Token::And) | Some(Token::Or) => {
                    if items.is_empty() || conjunction.is_some() {
                        return Err(Error::query_syntax("operator without a left operand"));
                    }
                    conjunction = Some(if self.advance() == Some(&Token::And) {
                        Conjunction::And
                    } else {
                        Conjunction::Or
                    });
                    continue;
                }
                _ => {}
            }

            let modifier = match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    Some(Occur::Must)
                }
                Some(Token::Minus) | Some(Token::Not) => {
                    self.advance();
                    Some(Occur::MustNot)
                }
                _ => None,
            };

            let query = match self.advance() {
                Some(Token::Clause(clause)) => self.parser.clause_query(clause)?,
                Some(Token::LParen) => {
                    let inner = self.parse_group(depth + 1)?;
                    if self.advance() != Some(&Token::RParen) {
                        return Err(Error::query_syntax("unbalanced '('"));
                    }
                    inner
                }
                _ => return Err(Error::query_syntax("operator without a right operand")),
            };

            // An explicit conjunction also rewrites the implicit occur of the left operand
            if let (Some(conj), Some(previous)) = (conjunction, items.last_mut()) {
                if !previous.explicit {
                    previous.occur = match conj {
                        Conjunction::And => Occur::Must,
                        Conjunction::Or => Occur::Should,
                    };
                }
            }

            let occur = match (modifier, conjunction) {
                (Some(occur), _) => occur,
                (None, Some(Conjunction::And)) => Occur::Must,
                (None, Some(Conjunction::Or)) => Occur::Should,
                (None, None) => match self.parser.default_operator {
                    BooleanOperator::And => Occur::Must,
                    BooleanOperator::Or => Occur::Should,
                },
            };

            items.push(Item { query, occur, explicit: modifier.is_some() });
            conjunction = None;
        }

        if conjunction.is_some() {
            return Err(Error::query_syntax("operator without a right operand"));
        }

        if items.len() == 1 && items[0].occur != Occur::MustNot {
            if let Some(item) = items.pop() {
                return Ok(item.query);
            }
        }

        Ok(items
            .into_iter()
            .fold(BoolQuery::new(), |acc, item| acc.add(item.query, item.occur))
            .build())
    }
}
